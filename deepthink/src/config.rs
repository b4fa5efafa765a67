//! Configuration management for deepthink.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Command line flags / environment variables (DEEPTHINK_*)
//! 2. Config file (DEEPTHINK_CONFIG, `<aget_dir>/config.toml`, or the user config dir)
//! 3. Default values

use anyhow::{Context, Result};
use deepthink_core::{MemoryConfig, MemoryPaths, RouterConfig};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// State and workspace locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Learning and caching knobs
    #[serde(default)]
    pub memory: MemorySettings,

    /// Cache cleanup settings
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Agent state directory (patterns, stats, evolution log)
    #[serde(default = "default_aget_dir")]
    pub aget_dir: PathBuf,

    /// Workspace directory (result cache)
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Seconds a cached result stays fresh
    pub cache_ttl_secs: u64,
    /// Persist patterns/stats every N records
    pub flush_every: usize,
    /// Successes needed before a pattern counts as learned
    pub learn_threshold: usize,
    /// Minimum success share for a method suggestion
    pub min_confidence: f64,
    /// Record an evolution milestone every N patterns
    pub milestone_every: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Durable cache entries older than this are removed
    pub max_age_hours: u64,
}

fn default_aget_dir() -> PathBuf {
    PathBuf::from(".aget")
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("workspace")
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "aget", "deepthink") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".deepthink")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            aget_dir: default_aget_dir(),
            workspace_dir: default_workspace_dir(),
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        let core = MemoryConfig::default();
        Self {
            cache_ttl_secs: core.cache_ttl_secs, // 1 hour
            flush_every: core.flush_every,
            learn_threshold: core.learn_threshold,
            min_confidence: core.min_confidence,
            milestone_every: 10,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { max_age_hours: 24 }
    }
}

impl Config {
    /// Load configuration from file, honoring an explicit state directory.
    pub fn load(aget_dir: Option<&Path>) -> Result<Self> {
        let state_dir = aget_dir.map(Path::to_path_buf).unwrap_or_else(default_aget_dir);
        let config_path = Self::config_path(&state_dir);

        let config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Config::default()
        };

        Ok(config.with_overrides(aget_dir.map(Path::to_path_buf), None))
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Apply command line / environment overrides.
    pub fn with_overrides(mut self, aget_dir: Option<PathBuf>, workspace_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = aget_dir {
            self.paths.aget_dir = dir;
        }
        if let Some(dir) = workspace_dir {
            self.paths.workspace_dir = dir;
        }
        self
    }

    /// Get the config file path.
    pub fn config_path(aget_dir: &Path) -> PathBuf {
        if let Ok(path) = std::env::var("DEEPTHINK_CONFIG") {
            return PathBuf::from(path);
        }
        let local = aget_dir.join("config.toml");
        if local.exists() {
            local
        } else {
            default_data_dir().join("config.toml")
        }
    }

    pub fn memory_config(&self) -> MemoryConfig {
        MemoryConfig {
            cache_ttl_secs: self.memory.cache_ttl_secs,
            flush_every: self.memory.flush_every,
            learn_threshold: self.memory.learn_threshold,
            min_confidence: self.memory.min_confidence,
        }
    }

    pub fn memory_paths(&self) -> MemoryPaths {
        MemoryPaths::from_roots(&self.paths.aget_dir, &self.paths.workspace_dir)
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            milestone_every: self.memory.milestone_every,
            ..RouterConfig::default()
        }
    }

    pub fn evolution_dir(&self) -> PathBuf {
        self.paths.aget_dir.join("evolution")
    }

    pub fn version_file(&self) -> PathBuf {
        self.paths.aget_dir.join("version.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.paths.aget_dir, PathBuf::from(".aget"));
        assert_eq!(config.paths.workspace_dir, PathBuf::from("workspace"));
        assert_eq!(config.memory.cache_ttl_secs, 3600);
        assert_eq!(config.memory.flush_every, 5);
        assert_eq!(config.memory.learn_threshold, 3);
        assert_eq!(config.memory.min_confidence, 0.6);
        assert_eq!(config.memory.milestone_every, 10);
        assert_eq!(config.cleanup.max_age_hours, 24);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[memory]\ncache_ttl_secs = 60\n\n[cleanup]\nmax_age_hours = 48\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.memory.cache_ttl_secs, 60);
        assert_eq!(config.memory.flush_every, 5);
        assert_eq!(config.cleanup.max_age_hours, 48);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[memory\ncache_ttl_secs = ").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::default().with_overrides(
            Some(PathBuf::from("/tmp/state")),
            Some(PathBuf::from("/tmp/ws")),
        );
        assert_eq!(config.paths.aget_dir, PathBuf::from("/tmp/state"));

        let paths = config.memory_paths();
        assert_eq!(paths.persistent_dir, PathBuf::from("/tmp/state/memory"));
        assert_eq!(paths.cache_dir, PathBuf::from("/tmp/ws/memory/cache"));
        assert_eq!(config.evolution_dir(), PathBuf::from("/tmp/state/evolution"));
    }

    #[test]
    fn test_memory_and_router_config() {
        let mut config = Config::default();
        config.memory.min_confidence = 0.75;
        config.memory.milestone_every = 4;

        assert_eq!(config.memory_config().min_confidence, 0.75);
        assert_eq!(config.router_config().milestone_every, 4);
    }
}
