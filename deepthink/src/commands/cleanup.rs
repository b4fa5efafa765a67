//! Durable cache cleanup.

use anyhow::{Context, Result};
use colored::Colorize;

use super::open_memory;
use crate::config::Config;

pub async fn execute(max_age_hours: Option<u64>, config: &Config) -> Result<()> {
    let hours = max_age_hours.unwrap_or(config.cleanup.max_age_hours);
    let mut memory = open_memory(config)?;

    let removed = memory
        .cleanup(hours)
        .context("Failed to clean result cache")?;

    println!(
        "{} Removed {} cache entries older than {} hours",
        "✓".green(),
        removed,
        hours
    );
    Ok(())
}
