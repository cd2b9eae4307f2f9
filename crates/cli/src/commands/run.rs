use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use plastevo_sim::simulation::{
    Configuration, GenerationOutcome, InitialPopulation, Regime, ReplicateReport, Replicates,
};
use plastevo_sim::storage::{MemorySink, OutputSink, QueryBuilder, Recorder, RecordingStrategy};
use tracing::info;

use crate::args::RunArgs;
use crate::commands::load_config;
use crate::printing::{print_outcome, print_parameters, print_report, print_summary};

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 Plastevo - Running Simulation");
    println!("============================================\n");

    let mut config = apply_overrides(load_config(args.config.as_deref())?, args)?;
    let strategy: RecordingStrategy = args
        .record
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid recording strategy")?;
    let initial = initial_population(args)?;
    if config.execution.start_time.is_none() {
        config.execution.start_time = initial.start_time();
    }

    print_parameters(&config);
    println!("\n▶ Running {} replicate(s)...", args.replicates);

    let mut replicates = Replicates::new(config.clone(), args.replicates).with_initial(initial);
    if let Some(max_attempts) = args.max_attempts {
        replicates = replicates.with_max_attempts(max_attempts);
    }

    let report = match &args.database {
        Some(database) => {
            if database.exists() {
                bail!(
                    "{} already exists; choose a new database path",
                    database.display()
                );
            }
            let mut recorder =
                Recorder::new(database, &config, strategy).context("Failed to create recorder")?;
            recorder
                .set_metadata("replicates", &args.replicates.to_string())
                .context("Failed to write metadata")?;
            let report = execute(&replicates, &config, &mut recorder, !args.no_progress)?;
            let stats = recorder.close().context("Failed to close recorder")?;
            println!(
                "\n💾 Recorded {} summaries to {}",
                stats.generations_recorded,
                database.display()
            );
            report
        }
        None => {
            let mut sink = MemorySink::new();
            let report = execute(&replicates, &config, &mut sink, !args.no_progress)?;
            println!("\n🏁 Final populations");
            for (replicate, record) in sink.replicates().iter().enumerate() {
                if let Some(summary) = record.final_summary() {
                    println!("  Replicate {replicate}:");
                    print_summary(summary);
                }
            }
            report
        }
    };

    print_report(&report);
    println!("\n✓ Simulation complete!");
    Ok(())
}

fn apply_overrides(mut config: Configuration, args: &RunArgs) -> Result<Configuration> {
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(generations) = args.generations {
        config.execution.generations = generations;
    }
    if let Some(start_time) = args.start_time {
        config.execution.start_time = Some(start_time);
    }
    if let Some(regime) = &args.regime {
        config.execution.regime = regime
            .parse::<Regime>()
            .map_err(|e| anyhow::anyhow!(e))
            .context("Invalid regime")?;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn initial_population(args: &RunArgs) -> Result<InitialPopulation> {
    let Some(path) = &args.seed_from else {
        return Ok(InitialPopulation::Random);
    };
    let query = QueryBuilder::new(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let summary = query
        .get_final_summary(args.seed_replicate)?
        .with_context(|| {
            format!(
                "Replicate {} of {} has no final summary",
                args.seed_replicate,
                path.display()
            )
        })?;
    info!(
        source = %path.display(),
        founders = summary.population_size(),
        "Seeding founders from recorded run"
    );
    Ok(InitialPopulation::FromSummary(summary))
}

fn execute<S: OutputSink>(
    replicates: &Replicates,
    config: &Configuration,
    sink: &mut S,
    show_progress: bool,
) -> Result<ReplicateReport> {
    let generations = config.execution.generations as u64;
    let total = generations * replicates.count() as u64;

    let pb = if show_progress {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = replicates
        .run_with(sink, |progress| {
            let Some(pb) = &pb else { return };
            let done = match progress.outcome {
                GenerationOutcome::Bred { generation, .. } => *generation as u64 + 1,
                // The rest of an extinct replicate counts as done
                GenerationOutcome::Extinct { .. } => generations,
            };
            pb.set_position(progress.replicate as u64 * generations + done);
            pb.set_message(format!(
                "replicate {} attempt {}",
                progress.replicate, progress.attempt
            ));
        })
        .context("Simulation failed")?;

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    println!();
    for (replicate, outcome) in report.outcomes.iter().enumerate() {
        print_outcome(replicate, outcome);
    }
    Ok(report)
}
