//! Wake-up, intro and wind-down.

use anyhow::{Context, Result};

use super::open_memory;
use crate::config::Config;
use crate::personality::AgentProfile;

pub async fn execute(config: &Config) -> Result<()> {
    let profile = AgentProfile::load(config)?;
    println!();
    println!("{}", profile.wake_up());
    println!();
    Ok(())
}

pub async fn intro(config: &Config) -> Result<()> {
    println!("{}", AgentProfile::load(config)?.quick_intro());
    Ok(())
}

/// Flush memory to disk, then narrate the session summary.
pub async fn wind_down(config: &Config) -> Result<()> {
    let memory = open_memory(config)?;
    memory.flush().context("Failed to save memory")?;

    let profile = AgentProfile::load(config)?;
    println!();
    println!("{}", profile.wind_down());
    println!();
    Ok(())
}
