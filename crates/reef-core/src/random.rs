//! Injectable random source.
//!
//! Every stochastic decision in the simulation (sex at birth, old-age death,
//! mating success, litter size) draws from a [`RandomSource`] passed in by the
//! caller, so harnesses can replace the generator with a scripted sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of uniform random draws
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`
    fn next_double(&mut self) -> f64;

    /// Uniform draw in `[0, bound)`. `bound` must be positive.
    fn next_int(&mut self, bound: u32) -> u32;
}

/// Seeded ChaCha8 generator
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_double(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_int(&mut self, bound: u32) -> u32 {
        assert!(bound > 0, "next_int bound must be positive");
        self.rng.gen_range(0..bound)
    }
}

/// Replays fixed sequences of draws, then falls back to constant values.
///
/// Doubles and ints are queued separately so a test can script e.g. "the
/// mating roll succeeds, the litter roll yields 2" without caring how many
/// draws of the other kind happen in between.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    doubles: VecDeque<f64>,
    ints: VecDeque<u32>,
    fallback_double: f64,
    fallback_int: u32,
}

impl ScriptedRandom {
    /// A stub whose doubles sit just under 1.0, so no probability roll ever fires
    pub fn new() -> Self {
        Self::constant(0.999, 0)
    }

    /// A stub that always answers the same values
    pub fn constant(double: f64, int: u32) -> Self {
        assert!((0.0..1.0).contains(&double), "scripted double must be in [0, 1)");
        Self {
            doubles: VecDeque::new(),
            ints: VecDeque::new(),
            fallback_double: double,
            fallback_int: int,
        }
    }

    pub fn with_doubles(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        for value in values {
            assert!((0.0..1.0).contains(&value), "scripted double must be in [0, 1)");
            self.doubles.push_back(value);
        }
        self
    }

    pub fn with_ints(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(values);
        self
    }

    /// Scripted draws not yet consumed, as `(doubles, ints)`
    pub fn remaining(&self) -> (usize, usize) {
        (self.doubles.len(), self.ints.len())
    }
}

impl Default for ScriptedRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_double(&mut self) -> f64 {
        self.doubles.pop_front().unwrap_or(self.fallback_double)
    }

    fn next_int(&mut self, bound: u32) -> u32 {
        assert!(bound > 0, "next_int bound must be positive");
        let value = self.ints.pop_front().unwrap_or(self.fallback_int);
        assert!(value < bound, "scripted int {} out of range for bound {}", value, bound);
        value
    }
}
