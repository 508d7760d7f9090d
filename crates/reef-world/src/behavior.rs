//! Per-species step strategies.
//!
//! [`act`] is the only entry point a driver needs: it matches on the
//! organism's [`Species`] and runs that species' ordering of aging, feeding,
//! mating and movement. Everything else here is a building block.

use crate::animal::{find_food, found_mate, is_mate, try_breed};
use crate::field::Field;
use crate::organism::{live_one_step, DeathCause, Organism};
use crate::species::Species;
use reef_core::{Location, OrganismId, RandomSource};
use tracing::trace;

/// Create a newborn of `species` at `location` and register it in the field.
///
/// Newborns start female and become male when the sex roll lands at or below
/// the species' male-to-female ratio.
pub fn spawn(
    field: &mut Field,
    species: Species,
    location: Location,
    rng: &mut dyn RandomSource,
) -> OrganismId {
    let mut organism = Organism::new(species);
    if rng.next_double() <= species.traits().male_to_female_ratio {
        organism.change_gender();
    }
    field.place(organism, location)
}

/// Run one step for a live organism.
///
/// Offspring are placed in the field immediately and their ids pushed onto
/// `newborns`; the driver decides when they get to act.
///
/// Panics if the organism is unknown or already dead.
pub fn act(
    field: &mut Field,
    id: OrganismId,
    rng: &mut dyn RandomSource,
    newborns: &mut Vec<OrganismId>,
) {
    let organism = field.expect_organism(id);
    assert!(organism.is_alive(), "dead organism {} asked to act", id);

    match organism.species() {
        Species::SmallFish => act_small_fish(field, id, rng, newborns),
        Species::Shark | Species::Grouper => act_predator(field, id, rng, newborns),
    }
}

/// Small fish: age, breed with every adjacent mate, then swim or suffocate.
fn act_small_fish(
    field: &mut Field,
    id: OrganismId,
    rng: &mut dyn RandomSource,
    newborns: &mut Vec<OrganismId>,
) {
    if !live_one_step(field, id, rng) {
        return;
    }

    breed_with_every_mate(field, id, rng, newborns);

    let location = field.expect_organism(id).location();
    let destination = field.free_adjacent_location(location);
    move_or_die(field, id, destination);
}

/// Sharks and groupers: age, starve, maybe change sex, breed once, then hunt or move.
fn act_predator(
    field: &mut Field,
    id: OrganismId,
    rng: &mut dyn RandomSource,
    newborns: &mut Vec<OrganismId>,
) {
    if !live_one_step(field, id, rng) {
        return;
    }

    maybe_change_sex(field, id);

    if found_mate(field, id) {
        let litter_size = litter_size(field, id, rng);
        give_birth(field, id, litter_size, rng, newborns);
    }

    let destination = match find_food(field, id) {
        Some(prey_cell) => Some(prey_cell),
        None => {
            let location = field.expect_organism(id).location();
            field.free_adjacent_location(location)
        }
    };
    move_or_die(field, id, destination);
}

/// Scan the neighbourhood once and attempt a birth for every mate found.
///
/// Unlike [`found_mate`] this does not stop at the first match: a fish flanked
/// by two mates rolls for two litters in the same step. Cells are re-read as
/// the scan advances, so a newborn dropped into a not-yet-visited cell counts
/// as a mate if it has the opposite sex.
///
/// Returns the number of offspring produced.
pub fn breed_with_every_mate(
    field: &mut Field,
    id: OrganismId,
    rng: &mut dyn RandomSource,
    newborns: &mut Vec<OrganismId>,
) -> usize {
    let location = field.expect_organism(id).location();
    let mut born = 0;

    for candidate in field.adjacent_locations(location) {
        let mate_here = match field.get_object_at(candidate) {
            Some(other) => is_mate(field.expect_organism(id), other),
            None => false,
        };
        if mate_here {
            let litter_size = litter_size(field, id, rng);
            born += give_birth(field, id, litter_size, rng, newborns);
        }
    }
    born
}

/// Roll for a litter with the species constants; 0 means no birth this time
pub fn litter_size(field: &mut Field, id: OrganismId, rng: &mut dyn RandomSource) -> u32 {
    try_breed(field, id, rng)
}

/// Place up to `litter_size` offspring, one per free adjacent cell.
///
/// Returns how many were actually born.
pub fn give_birth(
    field: &mut Field,
    id: OrganismId,
    litter_size: u32,
    rng: &mut dyn RandomSource,
    newborns: &mut Vec<OrganismId>,
) -> usize {
    if litter_size == 0 {
        return 0;
    }

    let (location, species) = {
        let parent = field.expect_organism(id);
        (parent.location(), parent.species())
    };

    let free = field.free_adjacent_locations(location);
    let mut born = 0;
    for cell in free.into_iter().take(litter_size as usize) {
        let young = spawn(field, species, cell, rng);
        newborns.push(young);
        born += 1;
    }

    trace!(organism_id = %id, species = %species, requested = litter_size, born, "Gave birth");
    born
}

/// Protogynous species turn male once old enough
fn maybe_change_sex(field: &mut Field, id: OrganismId) {
    let organism = field.expect_organism_mut(id);
    if let Some(change_age) = organism.species().traits().sex_change_age {
        if organism.is_female() && organism.age() >= change_age {
            organism.change_gender();
            trace!(organism_id = %id, age = organism.age(), "Changed sex");
        }
    }
}

/// Move to `destination`, or die of overcrowding if there is nowhere to go
fn move_or_die(field: &mut Field, id: OrganismId, destination: Option<Location>) {
    match destination {
        Some(to) => field.relocate(id, to),
        None => {
            trace!(organism_id = %id, "Died of overcrowding");
            field.set_dead(id, DeathCause::Overcrowding);
        }
    }
}
