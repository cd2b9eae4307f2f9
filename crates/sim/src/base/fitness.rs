use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifetime payoff of an animal, constrained to the range [0.0, 1.0].
///
/// The exponential mismatch term is at most 1, costs only subtract from it,
/// and the density factor never exceeds 1, so every realized payoff fits the
/// unit interval. Out-of-range inputs are clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Payoff(f64);

impl Payoff {
    /// The payoff of an animal that leaves no offspring.
    pub const ZERO: Payoff = Payoff(0.0);

    /// Creates a new payoff, clamping the input to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the inner f64 value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns true if this payoff cannot produce offspring.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }

    /// Expected number of offspring when normalized against `reference`.
    ///
    /// The constant-size regime passes the population mean payoff, the
    /// variable-size regime passes the fixed maximum payoff `1/q`.
    #[inline]
    pub fn expected_offspring(self, reference: f64) -> f64 {
        self.0 / reference
    }
}

impl From<Payoff> for f64 {
    fn from(payoff: Payoff) -> Self {
        payoff.0
    }
}

impl From<f64> for Payoff {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Payoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mean of a slice of payoffs; 0.0 for an empty slice.
pub fn mean_payoff(payoffs: &[Payoff]) -> f64 {
    if payoffs.is_empty() {
        return 0.0;
    }
    payoffs.iter().map(|p| p.0).sum::<f64>() / payoffs.len() as f64
}
