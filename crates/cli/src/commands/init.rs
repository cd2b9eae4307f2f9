use anyhow::{bail, Context, Result};
use plastevo_sim::evolution::MutationModel;
use plastevo_sim::simulation::{Configuration, ExecutionConfig, Regime};

use crate::args::InitArgs;
use crate::printing::print_parameters;

pub fn init_config(args: &InitArgs) -> Result<()> {
    println!("🧬 Plastevo - Evolution of Phenotypic Plasticity");
    println!("============================================\n");

    if args.output.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let config = build_config(args)?;
    print_parameters(&config);

    let json = config.to_json().context("Failed to serialize configuration")?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n✓ Configuration written to {}", args.output.display());
    println!("  Next: plastevo run --config {}", args.output.display());
    Ok(())
}

fn build_config(args: &InitArgs) -> Result<Configuration> {
    let regime: Regime = args
        .regime
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid regime")?;
    let mutation = MutationModel::with_step(args.mutation_rate, args.mutation_step)
        .context("Invalid mutation parameters")?;

    let mut config = Configuration::default();
    config.execution = ExecutionConfig {
        population_size: args.population_size,
        generations: args.generations,
        lifetime: args.lifetime,
        seed: args.seed,
        regime,
        start_time: None,
    };
    config.evolution.mutation = mutation;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
