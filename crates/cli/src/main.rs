mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::{EnvironmentArgs, InitArgs, PayoffArgs, RunArgs};
use commands::{environment, info, init, payoff, run};

/// Plastevo: evolution of phenotypic plasticity in fluctuating environments
///
/// Animals on a set of patches sense a noisy cue about their environment and
/// adjust an insulation phenotype in response. Their genes decide how far they
/// trust the cue, how often they adjust and whether they migrate.
#[derive(Parser, Debug)]
#[command(name = "plastevo")]
#[command(author, version, about = "Simulates the evolution of phenotypic plasticity", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log per-generation details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration file.
    ///
    /// Sets up the parameters for a new experiment (population size, mutation
    /// rate, regime) but does not run it yet.
    Init(InitArgs),

    /// Run replicates of a simulation.
    Run(RunArgs),

    /// Show the configuration and results stored in a database.
    Info {
        /// Database path
        #[arg(short, long, default_value = defaults::OUTPUT_DB)]
        database: PathBuf,
    },

    /// Print sampled environmental states and cues.
    Environment(EnvironmentArgs),

    /// Mean payoff of recorded final populations over one environmental cycle.
    ///
    /// Founders are drawn around the recorded gene means and live without
    /// breeding, one generation per period unit of the slowest patch.
    Payoff(PayoffArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_config(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Info { database } => {
            info::show_info(&database)?;
        }
        Commands::Environment(args) => {
            environment::show_environment(&args)?;
        }
        Commands::Payoff(args) => {
            payoff::show_payoff(&args)?;
        }
    }

    Ok(())
}
