//! Evolution log: dated JSON files recording learning milestones.
//!
//! Milestones for a day accumulate in `<dir>/<YYYY-MM-DD>-learning.json` as a
//! JSON array. Other tooling may drop markdown notes in the same directory;
//! they count towards [`EvolutionLog::count_entries`].

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::memory::InsightReport;

/// Entry type tag for learning milestones.
pub const LEARNING_MILESTONE: &str = "LEARNING_MILESTONE";

/// Snapshot of memory taken when the pattern count hits a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub patterns_learned: u64,
    pub total_patterns: usize,
    pub cache_hit_rate: f64,
    pub insights: InsightReport,
}

/// Directory of evolution files.
#[derive(Debug, Clone)]
pub struct EvolutionLog {
    dir: PathBuf,
}

impl EvolutionLog {
    /// Open the log, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File holding milestones recorded on `date`.
    pub fn learning_file(&self, date: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("{}-learning.json", date.format("%Y-%m-%d")))
    }

    /// Append a milestone built from `insights` to today's file.
    pub fn record_milestone(&self, insights: &InsightReport, agent: &str) -> Result<Milestone> {
        let now = Utc::now();
        let milestone = Milestone {
            kind: LEARNING_MILESTONE.to_string(),
            timestamp: now,
            agent: agent.to_string(),
            patterns_learned: insights.patterns_learned,
            total_patterns: insights.total_patterns,
            cache_hit_rate: insights.cache_hit_rate,
            insights: insights.clone(),
        };

        let path = self.learning_file(now);
        let mut entries: Vec<Milestone> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        entries.push(milestone.clone());
        fs::write(&path, serde_json::to_string_pretty(&entries)?)?;

        info!(
            "Learning milestone recorded: {} patterns learned",
            milestone.patterns_learned
        );
        Ok(milestone)
    }

    /// Milestones recorded on `date`.
    pub fn milestones_on(&self, date: DateTime<Utc>) -> Result<Vec<Milestone>> {
        let path = self.learning_file(date);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Count `.json` and `.md` files in the log directory.
    pub fn count_entries(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let tracked = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "json" || ext == "md");
            if path.is_file() && tracked {
                count += 1;
            }
        }
        Ok(count)
    }
}
