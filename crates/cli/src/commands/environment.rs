use anyhow::{bail, Result};
use plastevo_sim::environment::Environment;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::args::EnvironmentArgs;
use crate::commands::load_config;
use crate::defaults;

/// Print sampled states and cues of the configured patches as TSV.
pub fn show_environment(args: &EnvironmentArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let environments = config.build_environments()?;
    let lifetime = config.execution.lifetime;

    let selected: Vec<&Environment> = match &args.patch {
        None => environments.iter().collect(),
        Some(patch) => {
            let found = match patch.parse::<usize>() {
                Ok(index) => environments.get(index),
                Err(_) => environments.iter().find(|e| e.name() == patch),
            };
            match found {
                Some(env) => vec![env],
                None => bail!("Unknown patch '{patch}'"),
            }
        }
    };

    let seed = args.seed.or(config.execution.seed);
    let mut rng = match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
    };
    let steps = args
        .steps
        .unwrap_or(defaults::ENVIRONMENT_GENERATIONS * lifetime as u64);

    println!("patch\ttime\tstate\tcue");
    for env in selected {
        for sample in env.series(args.from..args.from + steps, lifetime, &mut rng) {
            println!(
                "{}\t{}\t{:.6}\t{:.6}",
                env.name(),
                sample.time,
                sample.state,
                sample.cue
            );
        }
    }
    Ok(())
}
