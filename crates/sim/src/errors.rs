use thiserror::Error;

/// Error returned when a genome cannot be built from raw gene values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    /// The input did not contain exactly one value per gene.
    #[error("Genome requires exactly {expected} genes, got {found}")]
    WrongLength { expected: usize, found: usize },

    /// A gene value was NaN or infinite.
    #[error("Gene '{gene}' has non-finite value {value}")]
    NonFinite { gene: &'static str, value: f64 },
}

/// Errors that can occur when constructing an environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvironmentError {
    /// One of the R, P, A, B, O parameters was NaN or infinite.
    #[error("Environment parameter {name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// The period must be strictly positive.
    #[error("Environment period R must be > 0, got {0}")]
    NonPositivePeriod(f64),
}

/// Errors that can occur during mutation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// Invalid mutation rate (must be between 0.0 and 1.0)
    #[error("Invalid mutation rate: {0} (must be between 0.0 and 1.0)")]
    InvalidMutationRate(f64),

    /// Invalid mutation step size (must be finite and >= 0.0)
    #[error("Invalid mutation step: {0} (must be finite and non-negative)")]
    InvalidStep(f64),
}

/// Errors raised while assembling a population.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PopulationError {
    /// The declared size does not match the number of animals supplied.
    #[error("Population size {declared} does not match number of animals {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// An animal sits on a patch that does not exist.
    #[error("Animal {index} has position {position}, but only {patches} patches exist")]
    InvalidPosition {
        index: usize,
        position: usize,
        patches: usize,
    },

    /// A population needs at least one patch to live on.
    #[error("Population requires at least one patch")]
    NoPatches,

    /// A recorded summary had no occupants to seed founders from.
    #[error("Recorded summary of generation {generation} has no animals to seed from")]
    NoFounders { generation: usize },

    #[error(transparent)]
    Genome(#[from] GenomeError),
}

/// Failure of the constant-size breeding step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreedError {
    /// Every animal has zero lifetime payoff, so relative fitness is undefined.
    #[error("Mean payoff of population decreased to 0")]
    ZeroMeanPayoff,

    /// Every Poisson draw came up empty, so there is nothing to resample from.
    #[error("No offspring were produced")]
    NoOffspring,
}

/// Errors detected while validating a run configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// An invalid parameter value was provided.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid mutation parameters: {0}")]
    Mutation(#[from] MutationError),

    #[error("Invalid environment '{name}': {source}")]
    Environment {
        name: String,
        #[source]
        source: EnvironmentError,
    },
}

/// Errors that abort a simulation run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Relative fitness became undefined in the constant-size regime.
    #[error("Mean payoff collapsed to 0 at generation {generation}; check your parameters")]
    ZeroMeanPayoff { generation: usize },

    /// The constant-size regime produced an empty offspring pool.
    #[error("No offspring were produced at generation {generation}")]
    NoOffspring { generation: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    /// The output collaborator failed to store a record.
    #[error("Output sink failed: {0}")]
    Sink(#[from] DatabaseError),
}

impl SimulationError {
    /// Attach the failing generation to a breeding error.
    pub fn from_breed(err: BreedError, generation: usize) -> Self {
        match err {
            BreedError::ZeroMeanPayoff => Self::ZeroMeanPayoff { generation },
            BreedError::NoOffspring => Self::NoOffspring { generation },
        }
    }

    /// Whether a fresh attempt from a new random population may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ZeroMeanPayoff { .. } | Self::NoOffspring { .. }
        )
    }
}

/// Database error types.
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Database initialization error: {0}")]
    Initialization(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Insert error: {0}")]
    Insert(String),
    #[error("Close error: {0}")]
    Close(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors that can occur during simulation building.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// A required parameter is missing
    #[error("Missing required parameter: {0}")]
    MissingRequired(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_error_display() {
        let err = GenomeError::WrongLength {
            expected: 9,
            found: 7,
        };
        assert_eq!(err.to_string(), "Genome requires exactly 9 genes, got 7");
    }

    #[test]
    fn test_simulation_error_carries_generation() {
        let err = SimulationError::ZeroMeanPayoff { generation: 12 };
        assert!(err.to_string().contains("generation 12"));
    }

    #[test]
    fn test_breed_error_mapping() {
        let err = SimulationError::from_breed(BreedError::NoOffspring, 3);
        assert!(matches!(err, SimulationError::NoOffspring { generation: 3 }));
        assert!(err.is_retryable());
        let err: SimulationError = ConfigError::InvalidParameter {
            name: "q",
            reason: "bad".into(),
        }
        .into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_config_error_from_mutation() {
        let err: ConfigError = MutationError::InvalidMutationRate(1.5).into();
        assert!(matches!(err, ConfigError::Mutation(_)));
        assert!(err.to_string().contains("1.5"));
    }
}
