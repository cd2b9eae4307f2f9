pub mod environment;
pub mod info;
pub mod init;
pub mod payoff;
pub mod run;

use anyhow::{Context, Result};
use plastevo_sim::simulation::Configuration;
use std::path::Path;

/// Read and validate a configuration file, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Configuration> {
    let config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Configuration::from_json(&json)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => Configuration::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
