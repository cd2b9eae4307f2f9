//! Fluctuating patch environments.
//!
//! The true state of a patch follows a noisy sine wave whose period is measured
//! in generations:
//!
//! ```text
//! E(t) = A * sin(2*pi*t / (L*R)) + B*eps + O,    eps ~ Normal(0, 1/3)
//! C(t) ~ Normal(P*(E - O) + O, (1 - P)/3)
//! ```
//!
//! `L` is the lifetime (steps per generation), so one period spans `R`
//! generations. The cue `C` is what animals perceive; `P` is its
//! predictability.

use crate::errors::{ConfigError, EnvironmentError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::Range;

/// Standard deviation of the environmental noise term before scaling by `B`.
const NOISE_SD: f64 = 1.0 / 3.0;

/// Serializable parameters of one patch environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    /// Period in generations
    #[serde(rename = "R")]
    pub r: f64,
    /// Cue predictability
    #[serde(rename = "P")]
    pub p: f64,
    /// Amplitude
    #[serde(rename = "A")]
    pub a: f64,
    /// Noise scaling
    #[serde(rename = "B")]
    pub b: f64,
    /// Offset
    #[serde(rename = "O")]
    pub o: f64,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, r: f64, p: f64, a: f64, b: f64, o: f64) -> Self {
        Self {
            name: name.into(),
            r,
            p,
            a,
            b,
            o,
        }
    }

    /// The three patches of the canonical model.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("moderate", 100.0, 0.1, 0.6, 0.0, 0.0),
            Self::new("warm", 100.0, 0.7, 1.0, 0.0, 0.5),
            Self::new("cold", 100.0, 0.5, 1.0, 0.0, -0.7),
        ]
    }
}

/// One sample of a patch environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSample {
    pub time: u64,
    /// True environmental state
    pub state: f64,
    /// Cue perceived by the animals
    pub cue: f64,
}

/// A validated, immutable patch environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    name: String,
    r: f64,
    p: f64,
    a: f64,
    b: f64,
    o: f64,
}

impl Environment {
    /// Create an environment.
    ///
    /// All parameters must be finite and `r` strictly positive. `p` is clamped
    /// into [0, 1].
    pub fn new(
        name: impl Into<String>,
        r: f64,
        p: f64,
        a: f64,
        b: f64,
        o: f64,
    ) -> Result<Self, EnvironmentError> {
        for (param, value) in [("R", r), ("P", p), ("A", a), ("B", b), ("O", o)] {
            if !value.is_finite() {
                return Err(EnvironmentError::NonFinite { name: param, value });
            }
        }
        if r <= 0.0 {
            return Err(EnvironmentError::NonPositivePeriod(r));
        }
        Ok(Self {
            name: name.into(),
            r,
            p: p.clamp(0.0, 1.0),
            a,
            b,
            o,
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> Result<Self, ConfigError> {
        Self::new(&config.name, config.r, config.p, config.a, config.b, config.o).map_err(
            |source| ConfigError::Environment {
                name: config.name.clone(),
                source,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> f64 {
        self.r
    }

    pub fn predictability(&self) -> f64 {
        self.p
    }

    pub fn amplitude(&self) -> f64 {
        self.a
    }

    pub fn noise(&self) -> f64 {
        self.b
    }

    pub fn offset(&self) -> f64 {
        self.o
    }

    /// Deterministic part of the state at time `t`.
    pub fn deterministic_state(&self, t: u64, lifetime: usize) -> f64 {
        let period = lifetime.max(1) as f64 * self.r;
        self.a * (2.0 * PI * t as f64 / period).sin() + self.o
    }

    /// Draw the state `E` and cue `C` at time `t`.
    pub fn evaluate<R: Rng + ?Sized>(&self, t: u64, lifetime: usize, rng: &mut R) -> (f64, f64) {
        let eps: f64 = rng.sample::<f64, _>(StandardNormal) * NOISE_SD;
        let state = self.deterministic_state(t, lifetime) + self.b * eps;

        let mean = self.p * (state - self.o) + self.o;
        let sd = (1.0 - self.p) / 3.0;
        let cue = if sd > 0.0 {
            mean + sd * rng.sample::<f64, _>(StandardNormal)
        } else {
            mean
        };
        (state, cue)
    }

    /// Sample the environment over a range of time points.
    pub fn series<R: Rng + ?Sized>(
        &self,
        times: Range<u64>,
        lifetime: usize,
        rng: &mut R,
    ) -> Vec<EnvironmentSample> {
        times
            .map(|time| {
                let (state, cue) = self.evaluate(time, lifetime, rng);
                EnvironmentSample { time, state, cue }
            })
            .collect()
    }

    pub fn to_config(&self) -> EnvironmentConfig {
        EnvironmentConfig::new(&self.name, self.r, self.p, self.a, self.b, self.o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_non_positive_period() {
        assert!(matches!(
            Environment::new("x", 0.0, 0.5, 1.0, 0.0, 0.0),
            Err(EnvironmentError::NonPositivePeriod(_))
        ));
        assert!(Environment::new("x", -3.0, 0.5, 1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            Environment::new("x", 1.0, 0.5, f64::INFINITY, 0.0, 0.0),
            Err(EnvironmentError::NonFinite { name: "A", .. })
        ));
    }

    #[test]
    fn test_predictability_is_clamped() {
        let env = Environment::new("x", 1.0, 1.4, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(env.predictability(), 1.0);
        let env = Environment::new("x", 1.0, -0.2, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(env.predictability(), 0.0);
    }

    #[test]
    fn test_perfect_predictability_gives_exact_cue() {
        let env = Environment::new("x", 10.0, 1.0, 1.0, 0.5, 0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for t in 0..200 {
            let (e, c) = env.evaluate(t, 5, &mut rng);
            assert!((e - c).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noiseless_state_is_a_sine() {
        let env = Environment::new("x", 4.0, 0.5, 2.0, 0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        // lifetime 1, period 4: quarter period at t = 1
        let (e, _) = env.evaluate(1, 1, &mut rng);
        assert!((e - 3.0).abs() < 1e-12);
        let (e, _) = env.evaluate(0, 1, &mut rng);
        assert!((e - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_predictability_cue_centres_on_offset() {
        let env = Environment::new("x", 10.0, 0.0, 1.0, 0.0, -0.7).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let mean = (0..n)
            .map(|t| env.evaluate(t, 5, &mut rng).1)
            .sum::<f64>()
            / n as f64;
        assert!((mean + 0.7).abs() < 0.01, "cue mean {mean}");
    }

    #[test]
    fn test_series_length_and_times() {
        let env = Environment::new("x", 10.0, 0.5, 1.0, 0.0, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let series = env.series(5..15, 5, &mut rng);
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].time, 5);
        assert_eq!(series[9].time, 14);
    }

    #[test]
    fn test_config_serde_uses_upper_case_keys() {
        let json = r#"{"name":"warm","R":100.0,"P":0.7,"A":1.0,"B":0.0,"O":0.5}"#;
        let config: EnvironmentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, EnvironmentConfig::defaults()[1]);
        let env = Environment::from_config(&config).unwrap();
        assert_eq!(env.to_config(), config);
    }

    #[test]
    fn test_from_config_names_the_environment() {
        let config = EnvironmentConfig::new("broken", 0.0, 0.5, 1.0, 0.0, 0.0);
        let err = Environment::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
