//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use plastevo_sim::prelude::*;
//!
//! let mut config = Configuration::default();
//! config.execution.population_size = 50;
//! config.execution.generations = 2;
//! config.execution.seed = Some(1);
//!
//! let mut sim = Simulation::new(config).unwrap();
//! let mut sink = MemorySink::new();
//! let report = sim.run(&mut sink).unwrap();
//! assert!(report.survived());
//! ```

pub use crate::analysis::{
    evaluate_payoff, GenerationSummary, PatchSummary, PayoffEvaluation, ReactionNorm,
};
pub use crate::base::{scale, Payoff};
pub use crate::environment::{Environment, EnvironmentConfig};
pub use crate::errors;
pub use crate::evolution::{MutationModel, PayoffModel};
pub use crate::genome::{Animal, Gene, Genome};
pub use crate::simulation::{
    Configuration, InitialPopulation, Population, Regime, ReplicateOutcome, Replicates,
    RunReport, Simulation, SimulationBuilder,
};
pub use crate::storage::{MemorySink, OutputSink, QueryBuilder, Recorder, RecordingStrategy};
