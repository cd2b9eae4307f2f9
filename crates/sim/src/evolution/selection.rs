//! Lifetime payoff and selection parameters.
//!
//! Payoff determines reproductive success. An animal's base payoff decays
//! exponentially with its accumulated mismatch, is reduced by the costs of
//! plasticity and migration, and is finally scaled by how crowded its patch is:
//!
//! ```text
//! payoff = max(exp(-tau * mismatch) - costs, 0) * (1 - occupancy / capacity)
//! costs  = kd + ka * adjustments + km * migrations   (plastic animals)
//! costs  = km * migrations                           (non-plastic animals)
//! ```

use crate::base::Payoff;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Cost and selection constants of the payoff function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffModel {
    /// Coefficient of the lifetime payoff exponential
    pub tau: f64,
    /// Constant cost of maintaining plasticity
    pub kd: f64,
    /// Cost of each plastic adjustment
    pub ka: f64,
    /// Cost of each migration
    pub km: f64,
    /// Controls the expected number of offspring in the variable-size regime
    pub q: f64,
}

impl Default for PayoffModel {
    fn default() -> Self {
        Self {
            tau: 0.25,
            kd: 0.02,
            ka: 0.01,
            km: 0.2,
            q: 2.2,
        }
    }
}

impl PayoffModel {
    /// Check that every constant is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("tau", self.tau),
            ("kd", self.kd),
            ("ka", self.ka),
            ("km", self.km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    reason: format!("must be finite and non-negative, got {value}"),
                });
            }
        }
        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "q",
                reason: format!("must be finite and positive, got {}", self.q),
            });
        }
        Ok(())
    }

    /// Reference payoff of the variable-size regime (`1/q`).
    ///
    /// An animal with this payoff expects exactly one offspring.
    #[inline]
    pub fn max_payoff(&self) -> f64 {
        1.0 / self.q
    }

    /// Payoff before density regulation.
    ///
    /// Plasticity costs (`kd`, `ka`) only apply when `plastic` is true.
    pub fn base_payoff(
        &self,
        mismatch: f64,
        adjustments: u32,
        migrations: u32,
        plastic: bool,
    ) -> f64 {
        let mut value = (-self.tau * mismatch).exp() - self.km * f64::from(migrations);
        if plastic {
            value -= self.kd + self.ka * f64::from(adjustments);
        }
        value.max(0.0)
    }

    /// Full lifetime payoff including the density factor.
    pub fn payoff(
        &self,
        mismatch: f64,
        adjustments: u32,
        migrations: u32,
        plastic: bool,
        density: f64,
    ) -> Payoff {
        Payoff::new(self.base_payoff(mismatch, adjustments, migrations, plastic) * density)
    }
}

/// Crowding multiplier of a patch: `1 - occupancy / capacity`.
///
/// A capacity of zero leaves no room at all and yields 0.
#[inline]
pub fn density_factor(occupancy: usize, capacity: usize) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (1.0 - occupancy as f64 / capacity as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_match_non_plastic() {
        let model = PayoffModel::default();
        assert_eq!(model.base_payoff(0.0, 0, 0, false), 1.0);
    }

    #[test]
    fn test_plasticity_costs_only_when_plastic() {
        let model = PayoffModel::default();
        let plastic = model.base_payoff(0.0, 3, 0, true);
        let fixed = model.base_payoff(0.0, 3, 0, false);
        assert!((plastic - (1.0 - 0.02 - 3.0 * 0.01)).abs() < 1e-12);
        assert_eq!(fixed, 1.0);
    }

    #[test]
    fn test_migration_cost_applies_to_everyone() {
        let model = PayoffModel::default();
        assert!((model.base_payoff(0.0, 0, 2, false) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_payoff_floor_at_zero() {
        let model = PayoffModel::default();
        assert_eq!(model.base_payoff(0.0, 0, 10, false), 0.0);
        assert!(model.payoff(100.0, 50, 10, true, 1.0).is_zero());
    }

    #[test]
    fn test_mismatch_decay() {
        let model = PayoffModel::default();
        let expected = (-0.25f64 * 4.0).exp();
        assert!((model.base_payoff(4.0, 0, 0, false) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_density_factor() {
        assert_eq!(density_factor(0, 10), 1.0);
        assert!((density_factor(3, 10) - 0.7).abs() < 1e-12);
        assert_eq!(density_factor(10, 10), 0.0);
        assert_eq!(density_factor(5, 0), 0.0);
    }

    #[test]
    fn test_max_payoff() {
        let model = PayoffModel::default();
        assert!((model.max_payoff() - 1.0 / 2.2).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let model = PayoffModel {
            q: 0.0,
            ..Default::default()
        };
        assert!(model.validate().is_err());

        let model = PayoffModel {
            ka: -0.1,
            ..Default::default()
        };
        assert!(model.validate().is_err());
        assert!(PayoffModel::default().validate().is_ok());
    }
}
