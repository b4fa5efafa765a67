//! Agent personality: wake-up banner, quick intro and wind-down narration.

use anyhow::{Context, Result};
use colored::Colorize;
use deepthink_core::memory::{CombinationStat, InsightReport, PersistentStore};
use deepthink_core::EvolutionLog;
use serde::Deserialize;

use crate::config::Config;

pub const AGENT_NAME: &str = "OpenAI-DeepResearch-aget";
pub const NICKNAME: &str = "DeepThink";
pub const PURPOSE: &str = "Managing and enhancing the OpenAI_DeepResearch dual-implementation system";
const DEFAULT_AGET_VERSION: &str = "2.0.0-alpha";

/// Contents of `<aget_dir>/version.json`.
#[derive(Debug, Deserialize)]
struct VersionInfo {
    aget_version: Option<String>,
}

/// What the agent remembers at wake-up time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySnapshot {
    pub patterns: usize,
    pub total_queries: u64,
    pub avg_response_time: f64,
    pub cache_hits: u64,
}

impl MemorySnapshot {
    /// Cache hits as a percentage of queries, if any queries were made.
    pub fn cache_hit_percent(&self) -> Option<f64> {
        (self.total_queries > 0)
            .then(|| self.cache_hits as f64 / self.total_queries as f64 * 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct AgentProfile {
    pub version: String,
    pub aget_version: String,
    pub memory: MemorySnapshot,
    pub evolution_entries: usize,
    /// Method with the most successful records
    pub preferred_method: Option<String>,
    pub best_combinations: Vec<CombinationStat>,
    pub memory_dir_exists: bool,
    pub cache_dir_exists: bool,
}

impl AgentProfile {
    /// Load agent state from the configured directories.
    pub fn load(config: &Config) -> Result<Self> {
        let paths = config.memory_paths();
        let memory_dir_exists = paths.persistent_dir.exists();
        let cache_dir_exists = paths.cache_dir.exists();

        let store = PersistentStore::open(&paths.persistent_dir)
            .context("Failed to open memory directory")?;
        let stats = store.load_stats().context("Failed to load memory stats")?;
        let patterns = store.load_patterns().context("Failed to load patterns")?;

        let insights = InsightReport::build(&patterns, &stats);

        let evolution = EvolutionLog::open(config.evolution_dir())
            .context("Failed to open evolution directory")?;

        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            aget_version: read_aget_version(config)?,
            memory: MemorySnapshot {
                patterns: patterns.len(),
                total_queries: stats.total_queries,
                avg_response_time: stats.avg_response_time,
                cache_hits: stats.cache_hits,
            },
            evolution_entries: evolution.count_entries()?,
            preferred_method: insights.preferred_method().map(str::to_string),
            best_combinations: insights.best_combinations,
            memory_dir_exists,
            cache_dir_exists,
        })
    }

    /// Full wake-up banner.
    pub fn wake_up(&self) -> String {
        let mut out = Vec::new();
        let rule = "═".repeat(60);
        let thin = "─".repeat(40);

        out.push(rule.clone());
        out.push(format!("🧠 {} Awakening...", AGENT_NAME).cyan().bold().to_string());
        out.push(rule.clone());
        out.push(String::new());
        out.push(format!(
            "Hello! I'm {}, the cognitive agent managing your",
            NICKNAME.bold()
        ));
        out.push("OpenAI_DeepResearch dual-implementation research system.".to_string());
        out.push(String::new());
        out.push(format!("📚 Purpose: {}", PURPOSE));
        out.push(format!("🔧 Version: {} | AGET {}", self.version, self.aget_version));

        out.push(String::new());
        out.push(thin.clone());
        out.push("📊 System Status".bold().to_string());
        out.push(thin.clone());
        let components = [
            ("Memory System", self.memory_dir_exists),
            ("Result Cache", self.cache_dir_exists),
            ("Intelligent Router", true),
            ("Personality Module", true),
        ];
        for (name, ok) in components {
            let icon = if ok { "✓".green() } else { "✗".red() };
            out.push(format!("  [{}] {}", icon, name));
        }

        out.push(String::new());
        out.push("📚 Memory Status:".to_string());
        out.push(format!("  • Patterns recorded: {}", self.memory.patterns));
        out.push(format!("  • Total queries processed: {}", self.memory.total_queries));
        if self.memory.avg_response_time > 0.0 {
            out.push(format!(
                "  • Average response time: {:.1}s",
                self.memory.avg_response_time
            ));
        }
        if let Some(rate) = self.memory.cache_hit_percent() {
            out.push(format!("  • Cache hit rate: {:.1}%", rate));
        }

        out.push(String::new());
        out.push("🔬 Evolution Tracking:".to_string());
        out.push(format!("  • Decisions recorded: {}", self.evolution_entries));

        out.push(String::new());
        out.push(thin.clone());
        out.push("💡 Capabilities".bold().to_string());
        out.push(thin);
        out.push("  🔍 OpenAI Agents - fast technical queries (30-60s)".to_string());
        out.push("  🔍 Deep Research API - comprehensive analysis (2-5min)".to_string());
        out.push("  🔍 Auto-routing based on learned patterns".to_string());
        out.push("  🧠 Result caching for instant responses".to_string());

        out.push(String::new());
        out.push(rule.clone());
        out.push(format!("✨ {} is ready!", AGENT_NAME).green().bold().to_string());
        out.push(rule);
        out.push(String::new());
        out.push("Try: deepthink research \"Your research question here\"".to_string());
        out.push("     deepthink stats     # performance statistics".to_string());
        out.push("     deepthink insights  # learned patterns".to_string());

        out.join("\n")
    }

    /// Short introduction with what memory has learned so far.
    pub fn quick_intro(&self) -> String {
        let mut out = vec![format!(
            "🧠 {} v{} - OpenAI_DeepResearch Cognitive Agent",
            NICKNAME, self.version
        )];
        if self.memory.patterns == 0 {
            out.push("   Ready to learn from your research queries!".to_string());
            return out.join("\n");
        }

        out.push(format!(
            "   {} patterns recorded | Ready to research!",
            self.memory.patterns
        ));
        if let Some(method) = &self.preferred_method {
            out.push(format!("   Preferred method: {}", method.cyan()));
        }
        if !self.best_combinations.is_empty() {
            out.push("🎯 Best learned combinations:".to_string());
            for combo in &self.best_combinations {
                out.push(format!(
                    "   • {}: {} successes, {:.1}s avg",
                    combo.label(),
                    combo.count,
                    combo.avg_response_time
                ));
            }
        }
        out.join("\n")
    }

    /// Wind-down narration.
    pub fn wind_down(&self) -> String {
        let thin = "─".repeat(40);
        [
            thin.clone(),
            format!("🌙 Winding Down {}", AGENT_NAME).cyan().bold().to_string(),
            thin,
            "💾 Memory patterns saved".to_string(),
            "📊 Session complete:".to_string(),
            format!("   • Patterns in memory: {}", self.memory.patterns),
            format!("   • Evolution entries: {}", self.evolution_entries),
            String::new(),
            "\"Every research query makes me smarter. See you next session!\"".to_string(),
            format!("   - {}, your OpenAI_DeepResearch agent", NICKNAME),
        ]
        .join("\n")
    }
}

fn read_aget_version(config: &Config) -> Result<String> {
    let path = config.version_file();
    if !path.exists() {
        return Ok(DEFAULT_AGET_VERSION.to_string());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let info: VersionInfo = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(info
        .aget_version
        .unwrap_or_else(|| DEFAULT_AGET_VERSION.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepthink_core::{MemoryConfig, ResearchMemory};
    use tempfile::tempdir;

    fn config_in(root: &std::path::Path) -> Config {
        Config::default().with_overrides(Some(root.join(".aget")), Some(root.join("workspace")))
    }

    #[test]
    fn test_fresh_profile() {
        let temp = tempdir().unwrap();
        let profile = AgentProfile::load(&config_in(temp.path())).unwrap();

        assert_eq!(profile.aget_version, "2.0.0-alpha");
        assert_eq!(profile.memory, MemorySnapshot::default());
        assert_eq!(profile.evolution_entries, 0);
        assert!(profile.quick_intro().contains("Ready to learn"));
        assert!(!profile.quick_intro().contains("Preferred method"));
        assert!(profile.best_combinations.is_empty());
        assert_eq!(profile.memory.cache_hit_percent(), None);
    }

    #[test]
    fn test_profile_reads_state() {
        let temp = tempdir().unwrap();
        let config = config_in(temp.path());
        std::fs::create_dir_all(&config.paths.aget_dir).unwrap();
        std::fs::write(config.version_file(), r#"{"version": "0.3.0", "aget_version": "2.1.0"}"#)
            .unwrap();

        let mut memory = ResearchMemory::open(config.memory_paths(), MemoryConfig::default()).unwrap();
        memory.remember_query("What is RAG?", "openai_agents", true, 4.0, 2).unwrap();
        memory.remember_query("What is MoE?", "openai_agents", true, 6.0, 2).unwrap();
        memory.flush().unwrap();

        let profile = AgentProfile::load(&config).unwrap();
        assert_eq!(profile.aget_version, "2.1.0");
        assert_eq!(profile.memory.patterns, 2);
        assert_eq!(profile.memory.total_queries, 2);
        assert_eq!(profile.memory.avg_response_time, 5.0);
        assert!(profile.memory_dir_exists);
        assert!(profile.quick_intro().contains("2 patterns recorded"));
        assert_eq!(profile.preferred_method.as_deref(), Some("openai_agents"));
        assert!(profile
            .quick_intro()
            .contains("conceptual_explanation → openai_agents: 2 successes, 5.0s avg"));
        assert!(profile.wake_up().contains("Average response time: 5.0s"));
        assert!(profile.wind_down().contains("Patterns in memory: 2"));
    }

    #[test]
    fn test_cache_hit_percent() {
        let snapshot = MemorySnapshot {
            total_queries: 8,
            cache_hits: 2,
            ..Default::default()
        };
        assert_eq!(snapshot.cache_hit_percent(), Some(25.0));
    }
}
