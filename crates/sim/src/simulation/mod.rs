//! Simulation engine and population management.
//!
//! This module provides the generation loop, the population container with
//! its two breeding regimes, founder creation and the replicate runner.
//!
//! - `Simulation`: the engine that lives generations and breeds the population.
//! - `Population`: in-memory container for animals and patch occupancy.
//! - `Replicates`: independent runs of one configuration with bounded retries.
//! - `SimulationBuilder`: fluent builder for constructing `Simulation` instances
//!   with sensible defaults and validation.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod initialization;
pub mod population;
pub mod replicates;

pub use builder::SimulationBuilder;
pub use configs::{Configuration, EvolutionConfig, ExecutionConfig, Regime};
pub use engine::{GenerationOutcome, RunReport, Simulation};
pub use initialization::InitialPopulation;
pub use population::{BreedOutcome, BreedStats, Population};
pub use replicates::{
    ReplicateOutcome, ReplicateProgress, ReplicateReport, Replicates, DEFAULT_MAX_ATTEMPTS,
};
