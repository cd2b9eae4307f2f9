use anyhow::{bail, Context, Result};
use plastevo_sim::storage::QueryBuilder;
use std::path::Path;

use crate::printing::{print_outcome, print_parameters, print_summary};

pub fn show_info(database: &Path) -> Result<()> {
    if !database.exists() {
        bail!("Database {} not found", database.display());
    }
    let query = QueryBuilder::new(database).context("Failed to open database")?;
    let config = query
        .get_config()
        .context("Failed to get simulation info")?;

    println!("\n📊 Simulation Information");
    println!("{}", "=".repeat(50));
    if let Some(strategy) = query.get_metadata_value("recording_strategy")? {
        println!("Recording: {strategy}");
    }
    print_parameters(&config);

    let replicates = query.replicates().context("Failed to list replicates")?;
    if replicates.is_empty() {
        println!("\nNo recorded replicates found.");
        return Ok(());
    }

    let outcomes = query.get_outcomes().context("Failed to read outcomes")?;
    println!("\n🧪 Replicates");
    for replicate in replicates {
        match outcomes.iter().find(|(r, _)| *r == replicate) {
            Some((_, outcome)) => print_outcome(replicate, outcome),
            None => println!("  … Replicate {replicate}: unfinished"),
        }
        let generations = query.get_recorded_generations(replicate)?;
        println!("    Recorded generations: {}", generations.len());

        if let Some(summary) = query.get_final_summary(replicate)? {
            print_summary(&summary);
        }
        if let Some(norm) = query.get_reaction_norm(replicate)? {
            println!(
                "    Reaction norm: I0={:.3} b={:.3} I0p={:.3} bp={:.3}",
                norm.i0, norm.b, norm.i0p, norm.bp
            );
        }
    }

    Ok(())
}
