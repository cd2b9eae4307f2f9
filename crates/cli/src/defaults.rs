//! Shared default values for the command-line interface.

pub const CONFIG_FILE: &str = "plastevo.json";
pub const OUTPUT_DB: &str = "plastevo.db";

pub const POPULATION_SIZE: usize = 5000;
pub const GENERATIONS: usize = 1000;
pub const LIFETIME: usize = 5;

pub const MUTATION_RATE: f64 = 1e-3;
pub const MUTATION_STEP: f64 = 0.05;

pub const REPLICATES: usize = 1;
pub const RECORDING: &str = "all";

/// Generations shown by the `environment` command.
pub const ENVIRONMENT_GENERATIONS: u64 = 2;
