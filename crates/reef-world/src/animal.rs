//! Behaviour shared by every animal: sex, breeding cooldown, foraging, mate detection.

use crate::field::Field;
use crate::organism::{DeathCause, Organism};
use reef_core::{Location, OrganismId, RandomSource, Sex};
use tracing::trace;

impl Organism {
    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_time_until_impregnation(mut self, steps: i32) -> Self {
        self.time_until_impregnation = steps;
        self
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn is_female(&self) -> bool {
        self.sex.is_female()
    }

    pub fn time_until_impregnation(&self) -> i32 {
        self.time_until_impregnation
    }

    pub fn change_gender(&mut self) {
        self.sex = self.sex.opposite();
    }

    /// Old enough and past the cooldown
    pub fn can_breed(&self, breeding_age: u32) -> bool {
        self.age >= breeding_age && self.time_until_impregnation <= 0
    }

    /// Roll for a litter.
    ///
    /// The cooldown ticks down on every call, successful or not. A successful
    /// roll yields a litter in `1..=max_litter_size` and restarts the cooldown
    /// at `pregnancy_period`; anything else yields 0.
    pub fn impregnate(
        &mut self,
        breeding_age: u32,
        max_litter_size: u32,
        pregnancy_period: i32,
        probability: f64,
        rng: &mut dyn RandomSource,
    ) -> u32 {
        self.time_until_impregnation = self.time_until_impregnation.saturating_sub(1);

        if self.can_breed(breeding_age) && rng.next_double() <= probability {
            let litter_size = rng.next_int(max_litter_size) + 1;
            self.time_until_impregnation = pregnancy_period;
            return litter_size;
        }
        0
    }
}

/// [`Organism::impregnate`] with the organism's own species constants
pub fn try_breed(field: &mut Field, id: OrganismId, rng: &mut dyn RandomSource) -> u32 {
    let organism = field.expect_organism_mut(id);
    let traits = organism.species().traits();
    organism.impregnate(
        traits.breeding_age,
        traits.max_litter_size,
        traits.pregnancy_period,
        traits.impregnation_probability,
        rng,
    )
}

/// Eat the first live neighbour whose species is on the diet.
///
/// The prey dies on the spot and the hunter gains its food value. Returns the
/// prey's former cell, or `None` if nothing edible is adjacent.
pub fn find_food(field: &mut Field, id: OrganismId) -> Option<Location> {
    let (location, traits) = {
        let hunter = field.expect_organism(id);
        (hunter.location(), hunter.species().traits())
    };

    for candidate in field.adjacent_locations(location) {
        let Some(prey) = field.get_object_at(candidate) else {
            continue;
        };
        if traits.diet_contains(prey.species().name()) && prey.is_alive() {
            let prey_id = prey.id();
            let value = prey.food_value();

            field.set_dead(prey_id, DeathCause::Predation);
            field.expect_organism_mut(id).increment_food_level(value);
            trace!(organism_id = %id, prey_id = %prey_id, at = %candidate, "Ate prey");
            return Some(candidate);
        }
    }
    None
}

/// Whether a live neighbour of the same species and opposite sex exists
pub fn found_mate(field: &Field, id: OrganismId) -> bool {
    let animal = field.expect_organism(id);

    field
        .adjacent_locations(animal.location())
        .into_iter()
        .filter_map(|loc| field.get_object_at(loc))
        .any(|other| is_mate(animal, other))
}

pub(crate) fn is_mate(animal: &Organism, other: &Organism) -> bool {
    other.species() == animal.species()
        && other.is_alive()
        && other.sex() == animal.sex().opposite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use proptest::prelude::*;
    use reef_core::ScriptedRandom;

    const BREEDING_AGE: u32 = 5;
    const MAX_LITTER: u32 = 4;
    const PREGNANCY: i32 = 1;
    const PROBABILITY: f64 = 0.12;

    fn fish(sex: Sex) -> Organism {
        Organism::new(Species::SmallFish).with_sex(sex)
    }

    fn impregnate(animal: &mut Organism, rng: &mut ScriptedRandom) -> u32 {
        animal.impregnate(BREEDING_AGE, MAX_LITTER, PREGNANCY, PROBABILITY, rng)
    }

    #[test]
    fn test_change_gender() {
        let mut animal = fish(Sex::Female);
        animal.change_gender();
        assert_eq!(animal.sex(), Sex::Male);
        animal.change_gender();
        assert!(animal.is_female());
    }

    #[test]
    fn test_can_breed_gate() {
        assert!(!fish(Sex::Female).with_age(4).can_breed(BREEDING_AGE));
        assert!(fish(Sex::Female).with_age(5).can_breed(BREEDING_AGE));
        assert!(!fish(Sex::Female)
            .with_age(5)
            .with_time_until_impregnation(1)
            .can_breed(BREEDING_AGE));
        assert!(fish(Sex::Female)
            .with_age(9)
            .with_time_until_impregnation(-3)
            .can_breed(BREEDING_AGE));
    }

    #[test]
    fn test_litter_size_scenario() {
        let mut animal = fish(Sex::Female).with_age(5);
        let mut rng = ScriptedRandom::new().with_doubles([0.05]).with_ints([2]);

        let litter = impregnate(&mut animal, &mut rng);

        assert_eq!(litter, 3);
        assert_eq!(animal.time_until_impregnation(), 1);
    }

    #[test]
    fn test_impregnate_failed_roll_still_ticks_cooldown() {
        let mut animal = fish(Sex::Female).with_age(5);
        let mut rng = ScriptedRandom::new().with_doubles([0.5]);

        assert_eq!(impregnate(&mut animal, &mut rng), 0);
        assert_eq!(animal.time_until_impregnation(), -1);
    }

    #[test]
    fn test_impregnate_too_young_draws_nothing() {
        let mut animal = fish(Sex::Female).with_age(2);
        let mut rng = ScriptedRandom::new().with_doubles([0.0]).with_ints([0]);

        assert_eq!(impregnate(&mut animal, &mut rng), 0);
        assert_eq!(rng.remaining(), (1, 1));
    }

    #[test]
    fn test_cooldown_of_one_clears_on_the_same_call() {
        let mut animal = fish(Sex::Male).with_age(6).with_time_until_impregnation(1);
        let mut rng = ScriptedRandom::new().with_doubles([0.1]).with_ints([0]);

        assert_eq!(impregnate(&mut animal, &mut rng), 1);
    }

    #[test]
    fn test_find_food_eats_first_prey_only() {
        let mut field = Field::new(3, 3);
        let shark = field.place(Organism::new(Species::Shark), Location::new(1, 1));
        let prey = field.place(fish(Sex::Female), Location::new(2, 2));
        let before = field.organism(shark).unwrap().food_level();

        assert_eq!(find_food(&mut field, shark), Some(Location::new(2, 2)));

        let prey_record = field.organism(prey).unwrap();
        assert!(!prey_record.is_alive());
        assert_eq!(prey_record.cause_of_death(), Some(DeathCause::Predation));
        assert!(field.is_free(Location::new(2, 2)));
        assert_eq!(field.organism(shark).unwrap().food_level(), before + 7);

        assert_eq!(find_food(&mut field, shark), None);
    }

    #[test]
    fn test_find_food_respects_scan_order_and_diet() {
        let mut field = Field::new(3, 3);
        let grouper = field.place(Organism::new(Species::Grouper), Location::new(1, 1));
        // Not on the grouper's diet
        field.place(Organism::new(Species::Shark), Location::new(0, 0));
        let second = field.place(fish(Sex::Male), Location::new(2, 0));
        let first = field.place(fish(Sex::Male), Location::new(0, 2));

        assert_eq!(find_food(&mut field, grouper), Some(Location::new(0, 2)));
        assert!(!field.organism(first).unwrap().is_alive());
        assert!(field.organism(second).unwrap().is_alive());
    }

    #[test]
    fn test_found_mate() {
        let mut field = Field::new(3, 3);
        let female = field.place(fish(Sex::Female), Location::new(1, 1));
        assert!(!found_mate(&field, female));

        // Same sex does not count
        field.place(fish(Sex::Female), Location::new(0, 0));
        assert!(!found_mate(&field, female));

        // Opposite sex of another species does not count
        field.place(Organism::new(Species::Grouper).with_sex(Sex::Male), Location::new(0, 1));
        assert!(!found_mate(&field, female));

        let male = field.place(fish(Sex::Male), Location::new(2, 2));
        assert!(found_mate(&field, female));

        field.set_dead(male, DeathCause::Predation);
        assert!(!found_mate(&field, female));
    }

    #[test]
    fn test_try_breed_uses_species_constants() {
        let mut field = Field::new(3, 3);
        let id = field.place(fish(Sex::Female).with_age(5), Location::new(1, 1));
        let mut rng = ScriptedRandom::new().with_doubles([0.12]).with_ints([3]);

        assert_eq!(try_breed(&mut field, id, &mut rng), 4);
        assert_eq!(field.organism(id).unwrap().time_until_impregnation(), 1);
    }

    proptest! {
        #[test]
        fn proptest_impregnate_invariants(
            age in 0u32..20,
            cooldown in -5i32..5,
            roll in 0.0f64..1.0,
            litter_roll in 0u32..4,
        ) {
            let mut animal = fish(Sex::Female)
                .with_age(age)
                .with_time_until_impregnation(cooldown);
            let eligible = animal
                .clone()
                .with_time_until_impregnation(cooldown - 1)
                .can_breed(BREEDING_AGE);

            let mut rng = ScriptedRandom::new().with_doubles([roll]).with_ints([litter_roll]);
            let litter = impregnate(&mut animal, &mut rng);

            if !eligible {
                prop_assert_eq!(litter, 0);
            }
            if litter > 0 {
                prop_assert!((1..=MAX_LITTER).contains(&litter));
                prop_assert_eq!(animal.time_until_impregnation(), PREGNANCY);
            } else {
                prop_assert_eq!(animal.time_until_impregnation(), cooldown - 1);
            }
        }
    }
}
