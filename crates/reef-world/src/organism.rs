//! Organism life cycle: age, food level, and the one-way Alive -> Dead transition.

use crate::field::Field;
use crate::species::Species;
use reef_core::{Location, OrganismId, RandomSource, Sex};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathCause {
    OldAge,
    Starvation,
    Predation,
    Overcrowding,
}

/// An organism in the simulation
#[derive(Debug, Clone)]
pub struct Organism {
    pub(crate) id: OrganismId,
    pub(crate) species: Species,
    pub(crate) location: Location,
    pub(crate) alive: bool,
    pub(crate) age: u32,
    pub(crate) food_level: i32,
    pub(crate) sex: Sex,
    pub(crate) time_until_impregnation: i32,
    pub(crate) cause_of_death: Option<DeathCause>,
}

impl Organism {
    /// A newborn: alive, age zero, female, with the species' starting food level.
    ///
    /// The organism has no cell until it is handed to [`Field::place`].
    pub fn new(species: Species) -> Self {
        Self {
            id: OrganismId::new(),
            species,
            location: Location::new(0, 0),
            alive: true,
            age: 0,
            food_level: species.traits().initial_food_level,
            sex: Sex::Female,
            time_until_impregnation: 0,
            cause_of_death: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_food_level(mut self, food_level: i32) -> Self {
        self.food_level = food_level;
        self
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn food_level(&self) -> i32 {
        self.food_level
    }

    pub fn cause_of_death(&self) -> Option<DeathCause> {
        self.cause_of_death
    }

    /// Food a predator gains by eating this organism
    pub fn food_value(&self) -> i32 {
        self.species.traits().food_value
    }

    pub fn increment_food_level(&mut self, value: i32) {
        self.food_level += value;
    }

    /// Flip to dead. Returns false if already dead.
    pub(crate) fn mark_dead(&mut self, cause: DeathCause) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.cause_of_death = Some(cause);
        true
    }
}

/// Old-age death chance for an organism of `age`.
///
/// Zero up to and including `decay_age`, then grows linearly by `decay_rate`
/// per step and saturates at 1.0.
pub fn decay_probability(age: u32, decay_age: u32, decay_rate: f64) -> f64 {
    if age <= decay_age {
        return 0.0;
    }
    ((age - decay_age) as f64 * decay_rate).min(1.0)
}

/// Age an organism by one step; past `decay_age` it may die of old age.
///
/// A random double is only drawn once the organism is past `decay_age`.
/// Returns whether the organism is still alive.
pub fn increment_age(
    field: &mut Field,
    id: OrganismId,
    decay_age: u32,
    decay_rate: f64,
    rng: &mut dyn RandomSource,
) -> bool {
    let organism = field.expect_organism_mut(id);
    organism.age += 1;

    let p = decay_probability(organism.age, decay_age, decay_rate);
    if p > 0.0 && rng.next_double() < p {
        trace!(organism_id = %id, age = organism.age, "Died of old age");
        field.set_dead(id, DeathCause::OldAge);
        return false;
    }
    true
}

/// [`increment_age`] with the organism's own species constants
pub fn age_and_maybe_die(field: &mut Field, id: OrganismId, rng: &mut dyn RandomSource) -> bool {
    let traits = field.expect_organism(id).species().traits();
    increment_age(field, id, traits.decay_age, traits.decay_rate, rng)
}

/// Burn one unit of food; starve when nothing is left.
///
/// Returns whether the organism is still alive.
pub fn increment_hunger(field: &mut Field, id: OrganismId) -> bool {
    let organism = field.expect_organism_mut(id);
    organism.food_level -= 1;
    if organism.food_level <= 0 {
        trace!(organism_id = %id, "Starved");
        field.set_dead(id, DeathCause::Starvation);
        return false;
    }
    true
}

/// The upkeep every organism pays at the start of its step.
///
/// Ages it, then burns a unit of food if its species forages. Returns whether
/// the organism is still alive.
pub fn live_one_step(field: &mut Field, id: OrganismId, rng: &mut dyn RandomSource) -> bool {
    if !age_and_maybe_die(field, id, rng) {
        return false;
    }
    if field.expect_organism(id).species().traits().forages() {
        return increment_hunger(field, id);
    }
    true
}
