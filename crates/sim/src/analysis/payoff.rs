//! Payoff of a recorded population without breeding.
//!
//! Founders are drawn around the gene statistics of a summary and live one
//! generation after another over a full environmental cycle. Each generation
//! starts from fresh copies of the same founders: one forced reaction, then
//! `L` lifetime steps, then every animal's lifetime payoff is taken.

use crate::analysis::GenerationSummary;
use crate::base::fitness::mean_payoff;
use crate::errors::SimulationError;
use crate::genome::Animal;
use crate::simulation::{Configuration, InitialPopulation, Population};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mean lifetime payoff per evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffEvaluation {
    pub generation_payoffs: Vec<f64>,
}

impl PayoffEvaluation {
    /// Average over every evaluated generation.
    pub fn mean(&self) -> f64 {
        if self.generation_payoffs.is_empty() {
            return 0.0;
        }
        self.generation_payoffs.iter().sum::<f64>() / self.generation_payoffs.len() as f64
    }
}

/// Generations that make up one environmental cycle: the longest period,
/// rounded up.
pub fn cycle_generations(config: &Configuration) -> usize {
    config
        .environments
        .iter()
        .map(|env| env.r.ceil() as usize)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Evaluate the payoff of the population recorded in `summary` under `config`.
///
/// The clock starts at the recorded time and runs on across generations.
/// Crowding is judged against `execution.population_size`.
pub fn evaluate_payoff<R: Rng + ?Sized>(
    summary: &GenerationSummary,
    config: &Configuration,
    rng: &mut R,
) -> Result<PayoffEvaluation, SimulationError> {
    config.validate()?;
    let environments = config.build_environments()?;
    let lifetime = config.execution.lifetime;
    let capacity = config.execution.population_size;
    let n_patches = environments.len();

    let founders = InitialPopulation::FromSummary(summary.clone()).build(capacity, n_patches, rng)?;
    let mut time = config.execution.start_time.unwrap_or(summary.time);
    let mut state = vec![0.0; n_patches];
    let mut cue = vec![0.0; n_patches];

    let mut generation_payoffs = Vec::new();
    for _ in 0..cycle_generations(config) {
        let animals = founders
            .animals()
            .iter()
            .map(|a| Animal::new(*a.genome(), a.position()))
            .collect();
        let mut population = Population::with_target(animals, capacity, n_patches)?;

        for step in 0..=lifetime {
            for (patch, env) in environments.iter().enumerate() {
                (state[patch], cue[patch]) = env.evaluate(time, lifetime, rng);
            }
            time += 1;
            population.react(&state, &cue, step == 0, rng);
        }

        generation_payoffs.push(mean_payoff(&population.payoffs(&config.evolution.payoff)));
    }

    Ok(PayoffEvaluation { generation_payoffs })
}
