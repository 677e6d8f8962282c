//! Configuration display command.

use anyhow::{Context, Result};
use cinder_config::CinderConfig;

/// Show the effective configuration.
pub fn show(config: &CinderConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{toml_str}");
    Ok(())
}
