//! Simulation engine.
//!
//! One generation consists of `L` lifetime steps, in each of which every patch
//! environment is sampled and every animal reacts, followed by breeding and a
//! forced reaction of the newborns to the last sampled environment.

use crate::analysis::{GenerationSummary, ReactionNorm};
use crate::environment::Environment;
use crate::errors::{ConfigError, SimulationError};
use crate::simulation::{
    BreedOutcome, BreedStats, Configuration, InitialPopulation, Population, Regime,
};
use crate::storage::OutputSink;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

/// Result of a single generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationOutcome {
    /// The population bred and lives on.
    Bred { generation: usize, stats: BreedStats },
    /// Breeding produced no offspring (variable regime only).
    Extinct { generation: usize },
}

/// Result of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    Completed { generations: usize },
    Extinct { generation: usize },
}

impl RunReport {
    pub fn survived(&self) -> bool {
        matches!(self, RunReport::Completed { .. })
    }
}

/// Main simulation engine.
#[derive(Debug)]
pub struct Simulation {
    config: Configuration,
    environments: Vec<Environment>,
    names: Vec<String>,
    population: Population,
    /// Master stream; everything else is seeded from it
    rng: Xoshiro256PlusPlus,
    /// Global time step
    time: u64,
    /// Environmental state and cue of the last step, per patch
    state: Vec<f64>,
    cue: Vec<f64>,
}

impl Simulation {
    /// Create a simulation with random founders.
    pub fn new(config: Configuration) -> Result<Self, SimulationError> {
        Self::with_initial(config, &InitialPopulation::Random)
    }

    /// Create a simulation whose founders come from `initial`.
    ///
    /// The master RNG is seeded from `execution.seed`, or from OS entropy when
    /// no seed is configured. Without an explicit `execution.start_time`, a
    /// seeded start continues the clock of the run it was recorded from.
    pub fn with_initial(
        mut config: Configuration,
        initial: &InitialPopulation,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if config.execution.start_time.is_none() {
            config.execution.start_time = initial.start_time();
        }
        let mut rng = match config.execution.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };
        let population = initial.build(
            config.execution.population_size,
            config.n_patches(),
            &mut rng,
        )?;
        Self::from_parts(config, population, rng)
    }

    /// Assemble a simulation from an existing population and RNG.
    pub fn from_parts(
        config: Configuration,
        population: Population,
        rng: Xoshiro256PlusPlus,
    ) -> Result<Self, SimulationError> {
        let environments = config.build_environments()?;
        if population.n_patches() != environments.len() {
            return Err(ConfigError::InvalidParameter {
                name: "environments",
                reason: format!(
                    "population lives on {} patches but {} environments are configured",
                    population.n_patches(),
                    environments.len()
                ),
            }
            .into());
        }
        if population.target_size() != config.execution.population_size {
            return Err(ConfigError::InvalidParameter {
                name: "population_size",
                reason: format!(
                    "population targets {} animals but {} are configured",
                    population.target_size(),
                    config.execution.population_size
                ),
            }
            .into());
        }
        let names = environments.iter().map(|e| e.name().to_string()).collect();
        let n_patches = environments.len();
        Ok(Self {
            time: config.execution.start_time.unwrap_or(0),
            config,
            environments,
            names,
            population,
            rng,
            state: vec![0.0; n_patches],
            cue: vec![0.0; n_patches],
        })
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Current global time step.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Index of the generation about to be lived.
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    /// Snapshot of the current population.
    pub fn summary(&self, is_final: bool) -> GenerationSummary {
        GenerationSummary::from_population(&self.population, &self.names, self.time, is_final)
    }

    pub fn reaction_norm(&self) -> ReactionNorm {
        ReactionNorm::from_population(&self.population)
    }

    /// Sample every patch environment at the current time and advance the clock.
    fn sample_environments(&mut self) {
        let lifetime = self.config.execution.lifetime;
        for (patch, environment) in self.environments.iter().enumerate() {
            let (state, cue) = environment.evaluate(self.time, lifetime, &mut self.rng);
            self.state[patch] = state;
            self.cue[patch] = cue;
        }
        self.time += 1;
    }

    /// Live the `L` steps of one generation.
    pub fn live_lifetime(&mut self) {
        for _ in 0..self.config.execution.lifetime {
            self.sample_environments();
            self.population
                .react(&self.state, &self.cue, false, &mut self.rng);
        }
    }

    /// Advance by one generation.
    pub fn step<S: OutputSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<GenerationOutcome, SimulationError> {
        let generation = self.population.generation();
        sink.record_generation(&self.summary(false))?;

        self.live_lifetime();

        let evolution = &self.config.evolution;
        let outcome = match self.config.execution.regime {
            Regime::Constant => self
                .population
                .breed_constant(&evolution.payoff, &evolution.mutation, &mut self.rng)
                .map_err(|e| SimulationError::from_breed(e, generation))?,
            Regime::Variable => self.population.breed_variable(
                &evolution.payoff,
                &evolution.mutation,
                &mut self.rng,
            ),
        };

        let stats = *outcome.stats();
        debug!(
            generation,
            pool = stats.pool_size,
            size = stats.size,
            mean_payoff = stats.mean_payoff,
            occupancy = ?self.population.occupancy(),
            "Bred generation"
        );

        if let BreedOutcome::Extinct(_) = outcome {
            info!(generation, "Population died out");
            return Ok(GenerationOutcome::Extinct { generation });
        }

        self.population
            .react(&self.state, &self.cue, true, &mut self.rng);
        Ok(GenerationOutcome::Bred { generation, stats })
    }

    /// Run all remaining generations.
    ///
    /// A completed run records a final summary and the mean reaction norm.
    /// The sink is not finished; that is left to the caller, which may reuse
    /// it for further replicates.
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunReport, SimulationError> {
        self.run_with(sink, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_generation` after every generation.
    pub fn run_with<S, F>(
        &mut self,
        sink: &mut S,
        mut on_generation: F,
    ) -> Result<RunReport, SimulationError>
    where
        S: OutputSink + ?Sized,
        F: FnMut(&GenerationOutcome),
    {
        let generations = self.config.execution.generations;
        while self.population.generation() < generations {
            let outcome = self.step(sink)?;
            on_generation(&outcome);
            if let GenerationOutcome::Extinct { generation } = outcome {
                return Ok(RunReport::Extinct { generation });
            }
        }

        sink.record_generation(&self.summary(true))?;
        sink.record_reaction_norm(&self.reaction_norm())?;
        info!(
            generations,
            size = self.population.size(),
            "Simulation completed"
        );
        Ok(RunReport::Completed { generations })
    }
}
