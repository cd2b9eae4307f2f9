//! Run configuration.
//!
//! A [`Configuration`] fully describes a run and round-trips through JSON, so a
//! stored configuration plus its seed reproduces the run exactly.

use crate::environment::{Environment, EnvironmentConfig};
use crate::errors::ConfigError;
use crate::evolution::{MutationModel, PayoffModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub execution: ExecutionConfig,
    pub evolution: EvolutionConfig,
    /// One entry per patch, in patch order
    #[serde(default = "EnvironmentConfig::defaults")]
    pub environments: Vec<EnvironmentConfig>,
}

/// Population regulation regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Fixed population size; offspring are resampled to the target
    #[default]
    Constant,
    /// Size follows reproductive success and may drop to zero
    Variable,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Constant => write!(f, "constant"),
            Regime::Variable => write!(f, "variable"),
        }
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constant" => Ok(Regime::Constant),
            "variable" => Ok(Regime::Variable),
            other => Err(format!("Unknown regime: {other}")),
        }
    }
}

/// High-level simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Target population size, also the carrying capacity of the payoff function
    pub population_size: usize,
    /// Number of generations to simulate
    pub generations: usize,
    /// Time steps per generation (L)
    pub lifetime: usize,
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub regime: Regime,
    /// Global time at which the environment clock starts. Unset means 0 for
    /// random founders and the recorded time for seeded ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            population_size: 5000,
            generations: 1000,
            lifetime: 5,
            seed: None,
            regime: Regime::Constant,
            start_time: None,
        }
    }
}

/// Grouped evolutionary parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    #[serde(default)]
    pub mutation: MutationModel,
    #[serde(default)]
    pub payoff: PayoffModel,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            evolution: EvolutionConfig::default(),
            environments: EnvironmentConfig::defaults(),
        }
    }
}

impl Configuration {
    pub fn new(
        execution: ExecutionConfig,
        evolution: EvolutionConfig,
        environments: Vec<EnvironmentConfig>,
    ) -> Self {
        Self {
            execution,
            evolution,
            environments,
        }
    }

    /// Number of patches.
    pub fn n_patches(&self) -> usize {
        self.environments.len()
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.population_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "population_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.execution.lifetime == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "lifetime",
                reason: "must be at least 1".into(),
            });
        }
        if self.environments.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "environments",
                reason: "at least one patch environment is required".into(),
            });
        }
        self.evolution.mutation.validate()?;
        self.evolution.payoff.validate()?;
        self.build_environments().map(|_| ())
    }

    /// Construct the validated patch environments, in patch order.
    pub fn build_environments(&self) -> Result<Vec<Environment>, ConfigError> {
        self.environments
            .iter()
            .map(Environment::from_config)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_model() {
        let config = Configuration::default();
        assert_eq!(config.execution.population_size, 5000);
        assert_eq!(config.execution.generations, 1000);
        assert_eq!(config.execution.lifetime, 5);
        assert_eq!(config.evolution.mutation.rate(), 1e-3);
        assert_eq!(config.evolution.payoff.q, 2.2);
        assert_eq!(config.n_patches(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = Configuration::default();
        config.execution.seed = Some(7);
        config.execution.regime = Regime::Variable;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"variable\""));
        assert_eq!(Configuration::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let json = r#"{
            "execution": {"population_size": 10, "generations": 2, "lifetime": 1},
            "evolution": {}
        }"#;
        let config = Configuration::from_json(json).unwrap();
        assert_eq!(config.execution.regime, Regime::Constant);
        assert_eq!(config.execution.seed, None);
        assert_eq!(config.evolution.payoff, PayoffModel::default());
        assert_eq!(config.n_patches(), 3);
    }

    #[test]
    fn test_validate_rejects_empty_population() {
        let mut config = Configuration::default();
        config.execution.population_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "population_size",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_environment() {
        let mut config = Configuration::default();
        config.environments[2].r = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Environment { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_no_patches() {
        let mut config = Configuration::default();
        config.environments.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_regime_from_str() {
        assert_eq!("Variable".parse::<Regime>().unwrap(), Regime::Variable);
        assert!("other".parse::<Regime>().is_err());
    }
}
