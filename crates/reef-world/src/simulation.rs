//! Simulation driver: seeds the field and sweeps the population step by step.

use crate::behavior::{act, spawn};
use crate::field::{Census, Field};
use crate::organism::DeathCause;
use crate::species::Species;
use reef_core::{Location, OrganismId, RandomSource, Result, SeededRandom, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, event, info, instrument, Level};

pub struct Simulation {
    field: Field,
    /// Activation order; newborns are appended after each sweep
    population: Vec<OrganismId>,
    rng: Box<dyn RandomSource>,
    config: SimulationConfig,
    step: u64,
    total_births: u64,
    deaths_by_cause: BTreeMap<DeathCause, u64>,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: u64,
    pub births: usize,
    pub deaths: usize,
    pub population: usize,
}

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps_run: u64,
    pub final_census: Census,
    pub total_births: u64,
    pub deaths_by_cause: BTreeMap<DeathCause, u64>,
    /// Whether at least two species were still alive at the end
    pub viable: bool,
}

impl Simulation {
    /// Build a simulation driven by a ChaCha8 generator seeded from the config
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_random(config, rng)
    }

    /// Build a simulation around any random source
    pub fn with_random(config: SimulationConfig, rng: Box<dyn RandomSource>) -> Result<Self> {
        config.validate()?;

        let mut sim = Self {
            field: Field::new(config.field.depth, config.field.width),
            population: Vec::new(),
            rng,
            config,
            step: 0,
            total_births: 0,
            deaths_by_cause: BTreeMap::new(),
        };
        sim.populate();

        Ok(sim)
    }

    /// Scatter the initial population, one draw per cell in row-major order
    fn populate(&mut self) {
        let population = self.config.population.clone();

        for row in 0..self.field.depth() {
            for col in 0..self.field.width() {
                let roll = self.rng.next_double();
                let species = if roll < population.shark {
                    Species::Shark
                } else if roll < population.shark + population.grouper {
                    Species::Grouper
                } else if roll < population.total() {
                    Species::SmallFish
                } else {
                    continue;
                };

                let location = Location::new(row, col);
                let id = spawn(&mut self.field, species, location, self.rng.as_mut());
                if population.random_age {
                    let decay_age = species.traits().decay_age.max(1);
                    let age = self.rng.next_int(decay_age);
                    if let Some(organism) = self.field.organism_mut(id) {
                        organism.age = age;
                    }
                }
                self.population.push(id);
            }
        }

        info!(
            event = "populated",
            depth = self.field.depth(),
            width = self.field.width(),
            population = self.population.len(),
            census = %self.field.census(),
            "Seeded initial population"
        );
    }

    /// Clear the field and seed a fresh population
    pub fn reset(&mut self) {
        self.field.clear_all();
        self.population.clear();
        self.step = 0;
        self.total_births = 0;
        self.deaths_by_cause.clear();
        self.populate();
    }

    /// Run the configured number of steps, stopping early once fewer than two species remain
    #[instrument(skip(self), fields(num_steps = self.config.num_steps, seed = self.config.seed))]
    pub fn run(&mut self) -> RunSummary {
        info!("Starting simulation for {} steps", self.config.num_steps);

        while self.step < self.config.num_steps && self.is_viable() {
            let report = self.step();

            let interval = self.config.log_interval;
            if interval > 0 && report.step % interval == 0 {
                self.emit_population_metrics(&report);
            }
        }

        let summary = self.summary();
        self.emit_run_summary(&summary);
        summary
    }

    /// Execute one step.
    ///
    /// Everyone alive at the start of the step acts once, in population order.
    /// Organisms killed earlier in the sweep are skipped, and newborns join
    /// the population only after the sweep.
    pub fn step(&mut self) -> StepReport {
        self.step += 1;

        let snapshot = self.population.clone();
        let mut newborns = Vec::new();

        for id in snapshot {
            let alive = self.field.organism(id).is_some_and(|o| o.is_alive());
            if alive {
                act(&mut self.field, id, self.rng.as_mut(), &mut newborns);
            }
        }

        let births = newborns.len();
        self.total_births += births as u64;

        let field = &self.field;
        let is_alive = |id: &OrganismId| field.organism(*id).is_some_and(|o| o.is_alive());
        self.population.retain(is_alive);
        self.population.extend(newborns.into_iter().filter(is_alive));

        let deaths = self.remove_dead_organisms();

        StepReport {
            step: self.step,
            births,
            deaths,
            population: self.population.len(),
        }
    }

    fn remove_dead_organisms(&mut self) -> usize {
        let dead = self.field.purge_dead();

        for organism in &dead {
            let cause = organism
                .cause_of_death()
                .unwrap_or_else(|| panic!("dead organism {} has no cause of death", organism.id()));
            *self.deaths_by_cause.entry(cause).or_insert(0) += 1;

            debug!(
                event = "organism_death",
                organism_id = %organism.id(),
                species = %organism.species(),
                step = self.step,
                age = organism.age(),
                cause = ?cause,
                "Organism died"
            );
        }

        dead.len()
    }

    /// Emit population metrics for one step
    fn emit_population_metrics(&self, report: &StepReport) {
        let census = self.census();

        info!(
            event = "population_metrics",
            step = report.step,
            total_population = report.population,
            sharks = census.count(Species::Shark),
            groupers = census.count(Species::Grouper),
            small_fish = census.count(Species::SmallFish),
            births = report.births,
            deaths = report.deaths,
            total_births = self.total_births,
            "Population metrics snapshot"
        );

        event!(
            Level::DEBUG,
            gauge_name = "population_total",
            gauge_value = report.population,
            step = report.step,
            "Population gauge"
        );
    }

    fn emit_run_summary(&self, summary: &RunSummary) {
        info!(
            event = "run_summary",
            steps_run = summary.steps_run,
            total_births = summary.total_births,
            viable = summary.viable,
            census = %summary.final_census,
            deaths = ?summary.deaths_by_cause,
            "Simulation complete"
        );
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps_run: self.step,
            final_census: self.census(),
            total_births: self.total_births,
            deaths_by_cause: self.deaths_by_cause.clone(),
            viable: self.is_viable(),
        }
    }

    pub fn census(&self) -> Census {
        self.field.census()
    }

    /// At least two species still alive
    pub fn is_viable(&self) -> bool {
        self.census().species_alive() > 1
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn population(&self) -> &[OrganismId] {
        &self.population
    }

    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reef_core::{FieldConfig, PopulationConfig, ScriptedRandom};

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed,
            num_steps: 50,
            log_interval: 10,
            field: FieldConfig { depth: 20, width: 30 },
            population: PopulationConfig {
                shark: 0.02,
                grouper: 0.04,
                small_fish: 0.2,
                random_age: false,
            },
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(small_config(42)).unwrap();
        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.population().len(), sim.field().occupied());
        assert!(sim.census().total() > 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config(1);
        config.field.depth = 0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_populate_follows_cumulative_thresholds() {
        let config = SimulationConfig {
            field: FieldConfig { depth: 1, width: 4 },
            population: PopulationConfig {
                shark: 0.1,
                grouper: 0.1,
                small_fish: 0.1,
                random_age: false,
            },
            ..Default::default()
        };
        // Per cell: placement roll, then the newborn's sex roll
        let rng = ScriptedRandom::new().with_doubles([0.05, 0.9, 0.15, 0.9, 0.25, 0.9, 0.35]);
        let sim = Simulation::with_random(config, Box::new(rng)).unwrap();

        let species: Vec<Option<Species>> = (0..4)
            .map(|col| sim.field().get_object_at(Location::new(0, col)).map(|o| o.species()))
            .collect();
        assert_eq!(
            species,
            vec![Some(Species::Shark), Some(Species::Grouper), Some(Species::SmallFish), None]
        );
    }

    #[test]
    fn test_newborns_wait_for_the_next_step() {
        let config = SimulationConfig {
            field: FieldConfig { depth: 2, width: 2 },
            population: PopulationConfig {
                shark: 0.0,
                grouper: 0.0,
                small_fish: 0.5,
                random_age: true,
            },
            ..Default::default()
        };
        // Seeding: a female at (0,0) and a male at (0,1), both aged 10.
        // Step: the female's mating roll succeeds with a litter of one female
        // pup at (1,0); the male's two mating rolls then fall back and fail.
        let rng = ScriptedRandom::new()
            .with_doubles([0.0, 0.9, 0.0, 0.1, 0.9, 0.9, 0.05, 0.9])
            .with_ints([10, 10, 0]);
        let mut sim = Simulation::with_random(config, Box::new(rng)).unwrap();
        let parents: Vec<OrganismId> = sim.population().to_vec();
        assert_eq!(parents.len(), 2);

        let report = sim.step();
        assert_eq!(report.births, 1);
        assert_eq!(report.deaths, 0);

        let newborns: Vec<OrganismId> = sim
            .population()
            .iter()
            .copied()
            .filter(|id| !parents.contains(id))
            .collect();
        assert_eq!(newborns.len(), 1);
        assert_eq!(sim.population().len(), 3);
        for id in &newborns {
            let pup = sim.field().organism(*id).unwrap();
            assert!(pup.is_alive());
            assert_eq!(pup.age(), 0);
            assert_eq!(pup.location(), Location::new(1, 0));
        }
        for id in &parents {
            assert_eq!(sim.field().organism(*id).unwrap().age(), 11);
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let mut a = Simulation::new(small_config(7)).unwrap();
        let mut b = Simulation::new(small_config(7)).unwrap();

        for _ in 0..20 {
            let ra = a.step();
            let rb = b.step();
            assert_eq!(ra.births, rb.births);
            assert_eq!(ra.deaths, rb.deaths);
            assert_eq!(ra.population, rb.population);
        }
        assert_eq!(a.census(), b.census());
    }

    #[test]
    fn test_population_matches_field_after_steps() {
        let mut sim = Simulation::new(small_config(3)).unwrap();

        for _ in 0..25 {
            let report = sim.step();
            assert_eq!(report.population, sim.field().occupied());
            for id in sim.population() {
                let organism = sim.field().organism(*id).unwrap();
                assert!(organism.is_alive());
                assert_eq!(sim.field().occupant_at(organism.location()), Some(*id));
            }
        }
    }

    #[test]
    fn test_run_stops_at_num_steps_or_collapse() {
        let mut sim = Simulation::new(small_config(11)).unwrap();
        let summary = sim.run();

        assert!(summary.steps_run <= 50);
        if summary.steps_run < 50 {
            assert!(!summary.viable);
        }
        assert_eq!(summary.final_census, sim.census());
    }

    #[test]
    fn test_reset_repopulates() {
        let mut sim = Simulation::new(small_config(5)).unwrap();
        for _ in 0..5 {
            sim.step();
        }
        sim.reset();

        assert_eq!(sim.step_count(), 0);
        assert_eq!(sim.summary().total_births, 0);
        assert_eq!(sim.population().len(), sim.field().occupied());
    }

    #[test]
    fn test_random_age_seeding() {
        let mut config = small_config(9);
        config.population.random_age = true;
        let sim = Simulation::new(config).unwrap();

        for id in sim.population() {
            let organism = sim.field().organism(*id).unwrap();
            assert!(organism.age() < organism.species().traits().decay_age);
        }
    }

    #[test]
    fn test_run_summary_serialization() {
        let mut sim = Simulation::new(small_config(2)).unwrap();
        sim.step();
        let summary = sim.summary();

        let json = serde_json::to_string(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.steps_run, 1);
        assert_eq!(back.final_census, summary.final_census);
    }
}
