//! Configuration types for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of rows
    pub depth: usize,
    /// Number of columns
    pub width: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            depth: 80,
            width: 120,
        }
    }
}

/// Initial population seeding.
///
/// Each cell is visited once in row-major order and a single draw decides
/// which species (if any) is created there, so the probabilities are
/// cumulative and must sum to at most 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Probability that a cell starts with a shark
    pub shark: f64,
    /// Probability that a cell starts with a grouper
    pub grouper: f64,
    /// Probability that a cell starts with a small fish
    pub small_fish: f64,
    /// Give seeded organisms a random starting age instead of zero
    pub random_age: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            shark: 0.02,
            grouper: 0.03,
            small_fish: 0.08,
            random_age: false,
        }
    }
}

impl PopulationConfig {
    pub fn total(&self) -> f64 {
        self.shark + self.grouper + self.small_fish
    }
}

/// Simulation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of steps to run
    pub num_steps: u64,
    /// Steps between progress log lines (0 disables them)
    pub log_interval: u64,
    pub field: FieldConfig,
    pub population: PopulationConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_steps: 4000,
            log_interval: 100,
            field: FieldConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.field.depth == 0 || self.field.width == 0 {
            return Err(Error::InvalidConfig(format!(
                "field must be non-empty, got {}x{}",
                self.field.depth, self.field.width
            )));
        }

        let probabilities = [
            ("shark", self.population.shark),
            ("grouper", self.population.grouper),
            ("small_fish", self.population.small_fish),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidConfig(format!(
                    "{} creation probability {} outside [0, 1]",
                    name, p
                )));
            }
        }

        if self.population.total() > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "creation probabilities sum to {} (> 1)",
                self.population.total()
            )));
        }

        Ok(())
    }
}

/// Log output format for the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Runner configuration, as loaded from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub simulation: SimulationConfig,
    pub log_format: LogFormat,
}

impl RunnerConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "Loaded runner config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.simulation.validate()?;
        Ok(config)
    }
}
