//! Randomness abstraction shared by every sampler
//!
//! Samplers never touch a global generator. They draw through a
//! [`RandomSource`], which is either backed by OS entropy in production or
//! by a fixed seed when reproducible output is needed.

use crate::error::{Result, SimulatorError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

/// Source of uniform reals, integer ranges and weighted categorical draws
pub trait RandomSource: Send {
    /// Uniform real in `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform integer in `[low, high]` (both ends inclusive)
    fn int_range(&mut self, low: i64, high: i64) -> i64;

    /// Index into `weights`, drawn with probability proportional to its weight
    fn weighted_index(&mut self, weights: &[f64]) -> Result<usize>;

    /// Fill `dest` with random bytes
    fn fill_bytes(&mut self, dest: &mut [u8]);

    /// Bernoulli trial with success probability `probability`
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }
}

/// [`RandomSource`] backed by any `rand` generator
pub struct RngSource<R> {
    rng: R,
}

impl<R> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Generator seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator: equal seeds yield equal draw sequences
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn int_range(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn weighted_index(&mut self, weights: &[f64]) -> Result<usize> {
        let dist = WeightedIndex::new(weights)
            .map_err(|e| SimulatorError::configuration(format!("invalid weights: {}", e)))?;
        Ok(dist.sample(&mut self.rng))
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }
}

/// Pick one element uniformly; `None` only for an empty slice
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let idx = rng.int_range(0, items.len() as i64 - 1) as usize;
    items.get(idx)
}

/// Pick one value from a `(value, weight)` table
pub fn weighted_choice<T: Copy>(rng: &mut dyn RandomSource, table: &[(T, f64)]) -> Result<T> {
    let weights: Vec<f64> = table.iter().map(|(_, w)| *w).collect();
    let idx = rng.weighted_index(&weights)?;
    Ok(table[idx].0)
}

/// Version-4 UUID built from the source's bytes, so seeded runs repeat it
pub fn random_uuid(rng: &mut dyn RandomSource) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// First eight hex digits of a random UUID, the short id used in log lines
pub fn short_id(rng: &mut dyn RandomSource) -> String {
    random_uuid(rng).simple().to_string()[..8].to_string()
}
