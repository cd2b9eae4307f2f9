use plastevo_sim::analysis::GenerationSummary;
use plastevo_sim::simulation::{Configuration, ReplicateOutcome, ReplicateReport};

pub fn print_parameters(config: &Configuration) {
    let exec = &config.execution;
    let mutation = &config.evolution.mutation;
    let payoff = &config.evolution.payoff;

    println!("\n📋 Simulation Configuration");
    println!(
        "  • Population size: {} [-n, --population-size]",
        exec.population_size
    );
    println!("  • Generations: {} [-g, --generations]", exec.generations);
    println!("  • Lifetime: {} steps [-l, --lifetime]", exec.lifetime);
    println!("  • Regime: {} [--regime]", exec.regime);
    if let Some(seed) = exec.seed {
        println!("  • Random seed: {seed} [--seed]");
    } else {
        println!("  • Random seed: Random [--seed]");
    }
    if let Some(start_time) = exec.start_time {
        println!("  • Start time: {start_time}");
    }

    println!("\n⚡ Mutation Parameters");
    println!("  • Rate: {:.2e} per gene [--mutation-rate]", mutation.rate());
    println!("  • Step: {} [--mutation-step]", mutation.step());

    println!("\n💰 Payoff Parameters");
    println!("  • Mismatch sensitivity (tau): {}", payoff.tau);
    println!("  • Plasticity cost (kd): {}", payoff.kd);
    println!("  • Adjustment cost (ka): {}", payoff.ka);
    println!("  • Migration cost (km): {}", payoff.km);
    println!("  • Fecundity (q): {}", payoff.q);

    println!("\n🌍 Patches");
    for (i, env) in config.environments.iter().enumerate() {
        println!(
            "  {i}. {}: R={} P={} A={} B={} O={}",
            env.name, env.r, env.p, env.a, env.b, env.o
        );
    }
}

pub fn print_outcome(replicate: usize, outcome: &ReplicateOutcome) {
    let icon = match outcome {
        ReplicateOutcome::Survived { .. } => "✓",
        ReplicateOutcome::Extinct { .. } => "☠",
        ReplicateOutcome::Failed { .. } => "✗",
    };
    println!(
        "  {icon} Replicate {replicate}: {outcome} ({} attempt{})",
        outcome.attempts(),
        if outcome.attempts() == 1 { "" } else { "s" }
    );
}

pub fn print_report(report: &ReplicateReport) {
    println!("\n📈 Results");
    println!(
        "  • Survivors: {}/{} ({:.1}%)",
        report.survivors(),
        report.outcomes.len(),
        100.0 * report.survival_rate()
    );
    println!("  • Total attempts: {}", report.total_attempts());
}

pub fn print_summary(summary: &GenerationSummary) {
    println!(
        "  Generation {} (t = {}), {} animals",
        summary.generation,
        summary.time,
        summary.population_size()
    );
    for patch in &summary.patches {
        println!("    • {} [{}]: {} animals", patch.name, patch.patch, patch.occupancy);
        if patch.occupancy == 0 {
            continue;
        }
        let genes: Vec<String> = patch
            .genes()
            .map(|(gene, mean, std)| format!("{gene}={mean:.3}±{std:.3}"))
            .collect();
        println!("      {}", genes.join(" "));
    }
}
