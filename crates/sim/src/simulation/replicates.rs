//! Independent replicate runs under one configuration.
//!
//! In the constant-size regime an attempt whose payoffs collapse is thrown
//! away and restarted from fresh founders, up to a bounded number of attempts.
//! In the variable-size regime every replicate runs once and either survives
//! or goes extinct.

use crate::errors::SimulationError;
use crate::simulation::{
    Configuration, GenerationOutcome, InitialPopulation, RunReport, Simulation,
};
use crate::storage::OutputSink;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Default bound on attempts per replicate.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Final status of one replicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReplicateOutcome {
    /// Ran every generation.
    Survived { generations: usize, attempts: usize },
    /// Died out while breeding `generation`.
    Extinct { generation: usize, attempts: usize },
    /// Every attempt failed; `generation` is where the last one stopped.
    Failed { generation: usize, attempts: usize },
}

impl ReplicateOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            ReplicateOutcome::Survived { .. } => "survived",
            ReplicateOutcome::Extinct { .. } => "extinct",
            ReplicateOutcome::Failed { .. } => "failed",
        }
    }

    /// Generation count for survivors, stopping generation otherwise.
    pub fn generation(&self) -> usize {
        match *self {
            ReplicateOutcome::Survived { generations, .. } => generations,
            ReplicateOutcome::Extinct { generation, .. }
            | ReplicateOutcome::Failed { generation, .. } => generation,
        }
    }

    pub fn attempts(&self) -> usize {
        match *self {
            ReplicateOutcome::Survived { attempts, .. }
            | ReplicateOutcome::Extinct { attempts, .. }
            | ReplicateOutcome::Failed { attempts, .. } => attempts,
        }
    }

    pub fn survived(&self) -> bool {
        matches!(self, ReplicateOutcome::Survived { .. })
    }

    /// Rebuild an outcome from its stored parts.
    pub fn from_parts(status: &str, generation: usize, attempts: usize) -> Option<Self> {
        match status {
            "survived" => Some(ReplicateOutcome::Survived {
                generations: generation,
                attempts,
            }),
            "extinct" => Some(ReplicateOutcome::Extinct {
                generation,
                attempts,
            }),
            "failed" => Some(ReplicateOutcome::Failed {
                generation,
                attempts,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ReplicateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicateOutcome::Survived { generations, .. } => {
                write!(f, "survived {generations} generations")
            }
            ReplicateOutcome::Extinct { generation, .. } => {
                write!(f, "died out at generation {generation}")
            }
            ReplicateOutcome::Failed { generation, attempts } => {
                write!(f, "failed {attempts} times, last at generation {generation}")
            }
        }
    }
}

/// Outcomes of every replicate, in replicate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicateReport {
    pub outcomes: Vec<ReplicateOutcome>,
}

impl ReplicateReport {
    pub fn survivors(&self) -> usize {
        self.outcomes.iter().filter(|o| o.survived()).count()
    }

    pub fn total_attempts(&self) -> usize {
        self.outcomes.iter().map(|o| o.attempts()).sum()
    }

    pub fn survival_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.survivors() as f64 / self.outcomes.len() as f64
    }
}

/// Progress notification passed to [`Replicates::run_with`].
#[derive(Debug, Clone, Copy)]
pub struct ReplicateProgress<'a> {
    pub replicate: usize,
    pub attempt: usize,
    pub outcome: &'a GenerationOutcome,
}

/// Runner for a batch of independent replicates.
#[derive(Debug, Clone)]
pub struct Replicates {
    config: Configuration,
    count: usize,
    max_attempts: usize,
    initial: InitialPopulation,
}

impl Replicates {
    pub fn new(config: Configuration, count: usize) -> Self {
        Self {
            config,
            count,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial: InitialPopulation::Random,
        }
    }

    /// Bound the number of attempts per replicate (at least one).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial(mut self, initial: InitialPopulation) -> Self {
        self.initial = initial;
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn run<S: OutputSink + ?Sized>(&self, sink: &mut S) -> Result<ReplicateReport, SimulationError> {
        self.run_with(sink, |_| {})
    }

    /// Run every replicate, reporting each finished generation to `progress`.
    ///
    /// Records of a failed attempt are discarded from `sink` before the retry.
    /// Errors that a fresh start cannot fix are returned immediately. The sink
    /// is finished once all replicates are done.
    pub fn run_with<S, F>(
        &self,
        sink: &mut S,
        mut progress: F,
    ) -> Result<ReplicateReport, SimulationError>
    where
        S: OutputSink + ?Sized,
        F: FnMut(ReplicateProgress<'_>),
    {
        self.config.validate()?;
        let mut seeds = self.config.execution.seed.map(Xoshiro256PlusPlus::seed_from_u64);
        let mut report = ReplicateReport::default();

        for replicate in 0..self.count {
            let mut attempt = 0;
            let outcome = loop {
                attempt += 1;
                sink.begin_replicate(replicate)?;

                let mut config = self.config.clone();
                config.execution.seed = seeds.as_mut().map(|rng| rng.random());
                let mut sim = Simulation::with_initial(config, &self.initial)?;

                let result = sim.run_with(sink, |outcome| {
                    progress(ReplicateProgress {
                        replicate,
                        attempt,
                        outcome,
                    })
                });

                match result {
                    Ok(RunReport::Completed { generations }) => {
                        break ReplicateOutcome::Survived {
                            generations,
                            attempts: attempt,
                        };
                    }
                    Ok(RunReport::Extinct { generation }) => {
                        break ReplicateOutcome::Extinct {
                            generation,
                            attempts: attempt,
                        };
                    }
                    Err(err) if err.is_retryable() => {
                        let generation = sim.generation();
                        if attempt >= self.max_attempts {
                            warn!(replicate, attempt, %err, "Giving up on replicate");
                            break ReplicateOutcome::Failed {
                                generation,
                                attempts: attempt,
                            };
                        }
                        warn!(replicate, attempt, %err, "Restarting replicate");
                    }
                    Err(err) => return Err(err),
                }
            };

            info!(replicate, %outcome, "Replicate finished");
            sink.record_outcome(&outcome)?;
            report.outcomes.push(outcome);
        }

        sink.finish()?;
        Ok(report)
    }
}
