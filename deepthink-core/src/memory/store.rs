//! JSON-backed persistence for the pattern log and statistics.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;
use crate::types::{MemoryStats, PatternRecord};

const PATTERNS_FILE: &str = "patterns.json";
const STATS_FILE: &str = "stats.json";

/// Durable home of the pattern log and the statistics aggregate.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    dir: PathBuf,
}

impl PersistentStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn patterns_path(&self) -> PathBuf {
        self.dir.join(PATTERNS_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    /// Load the pattern log. A missing file is an empty log.
    pub fn load_patterns(&self) -> Result<Vec<PatternRecord>> {
        Ok(read_json(&self.patterns_path())?.unwrap_or_default())
    }

    pub fn save_patterns(&self, patterns: &[PatternRecord]) -> Result<()> {
        write_json(&self.patterns_path(), &patterns)
    }

    /// Load statistics. A missing file yields zeroed counters.
    pub fn load_stats(&self) -> Result<MemoryStats> {
        Ok(read_json(&self.stats_path())?.unwrap_or_default())
    }

    pub fn save_stats(&self, stats: &MemoryStats) -> Result<()> {
        write_json(&self.stats_path(), stats)
    }
}

/// Read and parse a JSON document, `None` if the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Pretty-print a value to `path`, replacing any previous content.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    debug!("Wrote {:?}", path);
    Ok(())
}
