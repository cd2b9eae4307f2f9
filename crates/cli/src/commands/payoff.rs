use anyhow::{bail, Context, Result};
use plastevo_sim::analysis::{cycle_generations, evaluate_payoff};
use plastevo_sim::storage::QueryBuilder;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{info, warn};

use crate::args::PayoffArgs;
use crate::commands::load_config;

/// Print the mean payoff of recorded final populations as TSV.
pub fn show_payoff(args: &PayoffArgs) -> Result<()> {
    if !args.database.exists() {
        bail!("Database {} not found", args.database.display());
    }
    let query = QueryBuilder::new(&args.database)
        .with_context(|| format!("Failed to open {}", args.database.display()))?;
    let config = match args.config.as_deref() {
        Some(path) => load_config(Some(path))?,
        None => query.get_config().context("Failed to read stored configuration")?,
    };

    let replicates = match args.replicate {
        Some(replicate) => vec![replicate],
        None => query.replicates()?,
    };
    let mut rng = match args.seed.or(config.execution.seed) {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
    };
    info!(
        replicates = replicates.len(),
        generations = cycle_generations(&config),
        "Evaluating recorded populations"
    );

    println!("replicate\tmean_payoff\tgeneration_payoffs");
    let mut evaluated = 0;
    for replicate in replicates {
        let Some(summary) = query.get_final_summary(replicate)? else {
            warn!(replicate, "No final summary, skipping");
            continue;
        };
        let evaluation = evaluate_payoff(&summary, &config, &mut rng)
            .with_context(|| format!("Failed to evaluate replicate {replicate}"))?;
        let per_generation: Vec<String> = evaluation
            .generation_payoffs
            .iter()
            .map(|p| format!("{p:.6}"))
            .collect();
        println!(
            "{replicate}\t{:.6}\t{}",
            evaluation.mean(),
            per_generation.join(",")
        );
        evaluated += 1;
    }

    if evaluated == 0 {
        bail!("No replicate in {} has a final summary", args.database.display());
    }
    Ok(())
}
