use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    /// Population size (also the carrying capacity)
    #[arg(short = 'n', long, default_value_t = defaults::POPULATION_SIZE)]
    pub population_size: usize,

    /// Number of generations
    #[arg(short = 'g', long, default_value_t = defaults::GENERATIONS)]
    pub generations: usize,

    /// Time steps per generation
    #[arg(short = 'l', long, default_value_t = defaults::LIFETIME)]
    pub lifetime: usize,

    /// Population regulation (constant or variable)
    #[arg(long, default_value = "constant")]
    pub regime: String,

    /// Per-gene mutation probability
    #[arg(long, default_value_t = defaults::MUTATION_RATE)]
    pub mutation_rate: f64,

    /// Standard deviation of a mutation step
    #[arg(long, default_value_t = defaults::MUTATION_STEP)]
    pub mutation_step: f64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Record to this SQLite database; results are only summarized when omitted
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Number of independent replicates
    #[arg(short, long, default_value_t = defaults::REPLICATES)]
    pub replicates: usize,

    /// Override random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of generations
    #[arg(short = 'g', long)]
    pub generations: Option<usize>,

    /// Override the population regime (constant or variable)
    #[arg(long)]
    pub regime: Option<String>,

    /// Start the environment clock here; a seeded run continues the recorded clock by default
    #[arg(long)]
    pub start_time: Option<u64>,

    /// Which generations to record: all, none, every:N or at:G1,G2
    #[arg(long, default_value = defaults::RECORDING)]
    pub record: String,

    /// Attempts per replicate before giving up (constant regime)
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Seed the founders from the final summary of a recorded run
    #[arg(long)]
    pub seed_from: Option<PathBuf>,

    /// Replicate of `--seed-from` to take the founders from
    #[arg(long, default_value_t = 0, requires = "seed_from")]
    pub seed_replicate: usize,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct EnvironmentArgs {
    /// Configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Patch name or index; all patches when omitted
    #[arg(short, long)]
    pub patch: Option<String>,

    /// First time step
    #[arg(long, default_value_t = 0)]
    pub from: u64,

    /// Number of time steps; two generations when omitted
    #[arg(long)]
    pub steps: Option<u64>,

    /// Random seed for the noise terms
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PayoffArgs {
    /// Database of a recorded run
    #[arg(short, long, default_value = defaults::OUTPUT_DB)]
    pub database: PathBuf,

    /// Evaluate under this configuration instead of the recorded one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Replicate to evaluate; every replicate with a final summary when omitted
    #[arg(short, long)]
    pub replicate: Option<usize>,

    /// Random seed for founders and environments
    #[arg(long)]
    pub seed: Option<u64>,
}
