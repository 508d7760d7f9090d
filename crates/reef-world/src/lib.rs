//! World simulation engine.
//!
//! This crate implements the bounded grid where fish live, hunt, breed, and die.
//! The [`Field`] owns both the occupancy grid and every organism record; all
//! behaviour is expressed as functions that take the field by `&mut` together
//! with the acting organism's id and an injected [`reef_core::RandomSource`].

pub mod field;
pub mod organism;
pub mod animal;
pub mod species;
pub mod behavior;
pub mod simulation;

pub use field::{Census, Field};
pub use organism::{DeathCause, Organism};
pub use species::{Species, SpeciesTraits};
pub use behavior::act;
pub use simulation::{RunSummary, Simulation, StepReport};
