//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults and comprehensive validation.

use crate::environment::EnvironmentConfig;
pub use crate::errors::BuilderError;
use crate::evolution::{MutationModel, PayoffModel, DEFAULT_MUTATION_STEP};
use crate::simulation::{
    Configuration, EvolutionConfig, ExecutionConfig, InitialPopulation, Regime, Simulation,
};

/// Builder for constructing Simulation instances with a fluent API.
///
/// # Examples
///
/// ```
/// use plastevo_sim::simulation::{Regime, SimulationBuilder};
///
/// // Three default patches, constant population
/// let sim = SimulationBuilder::new()
///     .population_size(100)
///     .generations(10)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// // Single patch, variable population
/// let sim = SimulationBuilder::new()
///     .population_size(100)
///     .generations(10)
///     .lifetime(1)
///     .environment("flat", 10.0, 0.5, 1.0, 0.0, 0.0)
///     .regime(Regime::Variable)
///     .mutation_rate(0.01)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    // Required parameters
    population_size: Option<usize>,
    generations: Option<usize>,

    lifetime: usize,
    regime: Regime,
    start_time: Option<u64>,
    seed: Option<u64>,

    mutation_rate: f64,
    mutation_step: f64,
    payoff: PayoffModel,

    // Empty means the three default patches
    environments: Vec<EnvironmentConfig>,
    initial: InitialPopulation,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    /// Create a new simulation builder with default values.
    pub fn new() -> Self {
        let defaults = ExecutionConfig::default();
        let mutation = MutationModel::default();
        Self {
            population_size: None,
            generations: None,
            lifetime: defaults.lifetime,
            regime: defaults.regime,
            start_time: None,
            seed: None,
            mutation_rate: mutation.rate(),
            mutation_step: DEFAULT_MUTATION_STEP,
            payoff: PayoffModel::default(),
            environments: Vec::new(),
            initial: InitialPopulation::Random,
        }
    }

    /// Set the population size (required).
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = Some(size);
        self
    }

    /// Set the number of generations to run (required).
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    /// Time steps per generation.
    pub fn lifetime(mut self, lifetime: usize) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn regime(mut self, regime: Regime) -> Self {
        self.regime = regime;
        self
    }

    /// Global time at which the environment clock starts.
    pub fn start_time(mut self, start_time: u64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn mutation_step(mut self, step: f64) -> Self {
        self.mutation_step = step;
        self
    }

    pub fn payoff(mut self, payoff: PayoffModel) -> Self {
        self.payoff = payoff;
        self
    }

    /// Add a patch. Without any call the three default patches are used.
    pub fn environment(
        mut self,
        name: impl Into<String>,
        r: f64,
        p: f64,
        a: f64,
        b: f64,
        o: f64,
    ) -> Self {
        self.environments
            .push(EnvironmentConfig::new(name, r, p, a, b, o));
        self
    }

    pub fn environments(mut self, environments: Vec<EnvironmentConfig>) -> Self {
        self.environments = environments;
        self
    }

    pub fn initial_population(mut self, initial: InitialPopulation) -> Self {
        self.initial = initial;
        self
    }

    /// Assemble and validate the configuration without creating a simulation.
    pub fn configuration(&self) -> Result<Configuration, BuilderError> {
        let population_size = self
            .population_size
            .ok_or(BuilderError::MissingRequired("population_size"))?;
        let generations = self
            .generations
            .ok_or(BuilderError::MissingRequired("generations"))?;

        let mutation = MutationModel::with_step(self.mutation_rate, self.mutation_step)
            .map_err(crate::errors::ConfigError::from)?;

        let environments = if self.environments.is_empty() {
            EnvironmentConfig::defaults()
        } else {
            self.environments.clone()
        };

        let config = Configuration::new(
            ExecutionConfig {
                population_size,
                generations,
                lifetime: self.lifetime,
                seed: self.seed,
                regime: self.regime,
                start_time: self.start_time,
            },
            EvolutionConfig {
                mutation,
                payoff: self.payoff,
            },
            environments,
        );
        config.validate()?;
        Ok(config)
    }

    /// Build and validate the simulation.
    pub fn build(self) -> Result<Simulation, BuilderError> {
        let config = self.configuration()?;
        Ok(Simulation::with_initial(config, &self.initial)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    #[test]
    fn test_builder_minimal() {
        let sim = SimulationBuilder::new()
            .population_size(20)
            .generations(5)
            .build()
            .unwrap();
        assert_eq!(sim.population().size(), 20);
        assert_eq!(sim.environments().len(), 3);
        assert_eq!(sim.config().execution.lifetime, 5);
    }

    #[test]
    fn test_builder_missing_population_size() {
        let result = SimulationBuilder::new().generations(5).build();
        assert!(matches!(
            result,
            Err(BuilderError::MissingRequired("population_size"))
        ));
    }

    #[test]
    fn test_builder_missing_generations() {
        let result = SimulationBuilder::new().population_size(5).build();
        assert!(matches!(
            result,
            Err(BuilderError::MissingRequired("generations"))
        ));
    }

    #[test]
    fn test_builder_invalid_mutation_rate() {
        let result = SimulationBuilder::new()
            .population_size(5)
            .generations(5)
            .mutation_rate(1.5)
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::Config(ConfigError::Mutation(_)))
        ));
    }

    #[test]
    fn test_builder_invalid_environment() {
        let result = SimulationBuilder::new()
            .population_size(5)
            .generations(5)
            .environment("bad", 0.0, 0.5, 1.0, 0.0, 0.0)
            .build();
        assert!(matches!(
            result,
            Err(BuilderError::Config(ConfigError::Environment { .. }))
        ));
    }

    #[test]
    fn test_builder_all_options() {
        let sim = SimulationBuilder::new()
            .population_size(30)
            .generations(2)
            .lifetime(2)
            .regime(Regime::Variable)
            .start_time(10)
            .seed(42)
            .mutation_rate(0.01)
            .mutation_step(0.1)
            .environment("a", 10.0, 0.5, 1.0, 0.0, 0.0)
            .environment("b", 20.0, 0.9, 0.5, 0.1, 0.2)
            .build()
            .unwrap();
        let config = sim.config();
        assert_eq!(config.execution.regime, Regime::Variable);
        assert_eq!(config.execution.seed, Some(42));
        assert_eq!(config.evolution.mutation.step(), 0.1);
        assert_eq!(config.n_patches(), 2);
        assert_eq!(sim.time(), 10);
    }

    #[test]
    fn test_builder_with_seed_is_reproducible() {
        let build = || {
            SimulationBuilder::new()
                .population_size(10)
                .generations(1)
                .seed(9)
                .build()
                .unwrap()
        };
        assert_eq!(build().population().animals(), build().population().animals());
    }
}
