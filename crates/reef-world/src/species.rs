//! Species table.
//!
//! Every behavioural constant lives in a [`SpeciesTraits`] record keyed by the
//! [`Species`] tag. The tag doubles as the identity token for same-species
//! checks, so two organisms are mates-in-principle iff their tags are equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Shark,
    Grouper,
    SmallFish,
}

/// Fixed per-species constants
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTraits {
    /// Age at which breeding becomes possible
    pub breeding_age: u32,
    /// Age after which old-age death becomes possible
    pub decay_age: u32,
    /// Growth of the old-age death probability per step past `decay_age`
    pub decay_rate: f64,
    /// Chance that an eligible animal with a mate breeds
    pub impregnation_probability: f64,
    /// Cooldown steps after a successful breeding event
    pub pregnancy_period: i32,
    pub max_litter_size: u32,
    /// Newborns draw a double and become male when it is at or below this value
    pub male_to_female_ratio: f64,
    /// Species this one may eat
    pub diet: &'static [Species],
    /// Food gained by a predator that eats this species
    pub food_value: i32,
    pub initial_food_level: i32,
    /// Females switch to male at this age (protogynous species only)
    pub sex_change_age: Option<u32>,
}

impl SpeciesTraits {
    /// Whether `name` is on the menu. Unknown species names are a bug in the caller.
    pub fn diet_contains(&self, name: &str) -> bool {
        let species = Species::from_name(name)
            .unwrap_or_else(|| panic!("diet lookup against unknown species {:?}", name));
        self.diet.contains(&species)
    }

    /// Foraging species get hungry every step; the rest never starve
    pub fn forages(&self) -> bool {
        !self.diet.is_empty()
    }
}

static SHARK: SpeciesTraits = SpeciesTraits {
    breeding_age: 12,
    decay_age: 80,
    decay_rate: 0.05,
    impregnation_probability: 0.09,
    pregnancy_period: 6,
    max_litter_size: 2,
    male_to_female_ratio: 0.5,
    diet: &[Species::SmallFish, Species::Grouper],
    food_value: 25,
    initial_food_level: 14,
    sex_change_age: None,
};

static GROUPER: SpeciesTraits = SpeciesTraits {
    breeding_age: 8,
    decay_age: 60,
    decay_rate: 0.05,
    impregnation_probability: 0.1,
    pregnancy_period: 4,
    max_litter_size: 3,
    male_to_female_ratio: 0.2,
    diet: &[Species::SmallFish],
    food_value: 12,
    initial_food_level: 10,
    sex_change_age: Some(20),
};

static SMALL_FISH: SpeciesTraits = SpeciesTraits {
    breeding_age: 5,
    decay_age: 30,
    decay_rate: 0.1,
    impregnation_probability: 0.12,
    pregnancy_period: 1,
    max_litter_size: 4,
    male_to_female_ratio: 0.5,
    diet: &[],
    food_value: 7,
    initial_food_level: 9,
    sex_change_age: None,
};

impl Species {
    pub const ALL: [Species; 3] = [Species::Shark, Species::Grouper, Species::SmallFish];

    pub fn name(self) -> &'static str {
        match self {
            Species::Shark => "Shark",
            Species::Grouper => "Grouper",
            Species::SmallFish => "SmallFish",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn traits(self) -> &'static SpeciesTraits {
        match self {
            Species::Shark => &SHARK,
            Species::Grouper => &GROUPER,
            Species::SmallFish => &SMALL_FISH,
        }
    }

    pub fn diet_contains(self, name: &str) -> bool {
        self.traits().diet_contains(name)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown species: {}", s))
    }
}
