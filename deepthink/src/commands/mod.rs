//! Command implementations for the deepthink CLI.
//!
//! Each submodule implements the logic for one command.

pub mod cleanup;
pub mod insights;
pub mod research;
pub mod stats;
pub mod wake;

use anyhow::{Context, Result};
use deepthink_core::ResearchMemory;

use crate::config::Config;

/// Open research memory at the configured locations.
pub(crate) fn open_memory(config: &Config) -> Result<ResearchMemory> {
    ResearchMemory::open(config.memory_paths(), config.memory_config())
        .context("Failed to open research memory")
}
