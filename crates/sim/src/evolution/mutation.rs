//! Mutation operator for reaction-norm genomes.
//!
//! Every reproduction event copies the parent's genome and perturbs it. Each
//! eligible gene mutates independently with probability `rate`; a mutation adds
//! a zero-mean Gaussian step with standard deviation `step`. Which genes are
//! eligible, and which are clamped afterwards, is fixed by the genome schema
//! (see [`Genome::mutate`](crate::genome::Genome::mutate)).

pub use crate::errors::MutationError;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Default standard deviation of a single mutation step.
pub const DEFAULT_MUTATION_STEP: f64 = 0.05;

/// Per-gene Gaussian mutation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationModel {
    /// Probability that any one eligible gene mutates in a reproduction event
    rate: f64,
    /// Standard deviation of the Gaussian mutation step
    #[serde(default = "default_step")]
    step: f64,
}

fn default_step() -> f64 {
    DEFAULT_MUTATION_STEP
}

impl MutationModel {
    /// Create a mutation model with the default step size (0.05).
    ///
    /// # Errors
    /// Returns an error if `rate` is outside [0.0, 1.0].
    pub fn new(rate: f64) -> Result<Self, MutationError> {
        Self::with_step(rate, DEFAULT_MUTATION_STEP)
    }

    /// Create a mutation model with an explicit step size.
    pub fn with_step(rate: f64, step: f64) -> Result<Self, MutationError> {
        let model = Self { rate, step };
        model.validate()?;
        Ok(model)
    }

    /// A model that never mutates anything.
    pub fn none() -> Self {
        Self {
            rate: 0.0,
            step: DEFAULT_MUTATION_STEP,
        }
    }

    /// Check the parameters, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), MutationError> {
        if !(0.0..=1.0).contains(&self.rate) {
            return Err(MutationError::InvalidMutationRate(self.rate));
        }
        if !self.step.is_finite() || self.step < 0.0 {
            return Err(MutationError::InvalidStep(self.step));
        }
        Ok(())
    }

    /// Per-gene mutation probability.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Standard deviation of a mutation step.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Apply one Bernoulli(rate) trial to `value` and, on success, add a
    /// Gaussian step.
    ///
    /// Both the uniform and the Gaussian draw come from `rng`; the Gaussian is
    /// only drawn when the gene actually mutates.
    #[inline]
    pub fn perturb<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        if rng.random::<f64>() < self.rate {
            let z: f64 = rng.sample(StandardNormal);
            value + self.step * z
        } else {
            value
        }
    }
}

impl Default for MutationModel {
    fn default() -> Self {
        Self {
            rate: 1e-3,
            step: DEFAULT_MUTATION_STEP,
        }
    }
}
