//! Research memory: pattern log, statistics and result cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ResearchMemory                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ PatternLog   │  │ MemoryStats  │  │ ResultCache        │  │
//! │  │ append-only  │  │ counters     │  │ hot map ─▶ backend │  │
//! │  └──────┬───────┘  └──────┬───────┘  │ TTL: 1h (lazy)     │  │
//! │         └────────┬────────┘          └─────────┬──────────┘  │
//! │           PersistentStore               CacheBackend         │
//! │      patterns.json, stats.json       <fingerprint>.json      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pattern log and statistics are loaded once on open and flushed every
//! `flush_every` records (or on [`ResearchMemory::flush`]). Cache entries are
//! written through to the backend as soon as they are cached.
//!
//! ## Usage
//!
//! ```ignore
//! use deepthink_core::memory::{MemoryConfig, MemoryPaths, ResearchMemory};
//!
//! let mut memory = ResearchMemory::open(MemoryPaths::from_roots(".aget", "workspace"), MemoryConfig::default())?;
//!
//! if let Some(method) = memory.suggest("How to implement a trie?") {
//!     println!("memory suggests {method}");
//! }
//! memory.remember_query("How to implement a trie?", "openai_agents", true, 31.2, 6)?;
//! memory.cache_result("How to implement a trie?", &result)?;
//! ```

mod cache;
mod insight;
mod store;
mod traits;

pub use cache::*;
pub use insight::*;
pub use store::PersistentStore;
pub use traits::*;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::learning::{PatternLog, Suggestion};
use crate::types::{MemoryStats, PatternRecord};

/// Tunables for the memory system.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Cache freshness window in seconds (default: 1 hour).
    pub cache_ttl_secs: u64,
    /// Flush the pattern log and stats every N records.
    pub flush_every: usize,
    /// Successes needed before a `(query_type, method)` pair counts as learned.
    pub learn_threshold: usize,
    /// A suggestion must strictly exceed this share of same-type successes.
    pub min_confidence: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,          // 1 hour
            flush_every: 5,
            learn_threshold: 3,
            min_confidence: 0.6,
        }
    }
}

/// Where the durable stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPaths {
    /// Pattern log and statistics (kept, backed up).
    pub persistent_dir: PathBuf,
    /// Cached results (volatile, safe to clear).
    pub cache_dir: PathBuf,
}

impl MemoryPaths {
    /// Standard layout: `<aget>/memory` and `<workspace>/memory/cache`.
    pub fn from_roots(aget_dir: impl AsRef<Path>, workspace_dir: impl AsRef<Path>) -> Self {
        Self {
            persistent_dir: aget_dir.as_ref().join("memory"),
            cache_dir: workspace_dir.as_ref().join("memory").join("cache"),
        }
    }
}

/// Pattern log, statistics and result cache behind one owner.
///
/// All operations take `&mut self`; one research flow drives the memory at
/// a time.
pub struct ResearchMemory {
    config: MemoryConfig,
    store: PersistentStore,
    patterns: PatternLog,
    stats: MemoryStats,
    cache: ResultCache,
}

impl ResearchMemory {
    /// Open memory on disk: file-backed cache under `paths.cache_dir`.
    pub fn open(paths: MemoryPaths, config: MemoryConfig) -> Result<Self> {
        let backend = FileCacheBackend::open(&paths.cache_dir)?;
        Self::with_cache_backend(paths.persistent_dir, Box::new(backend), config)
    }

    /// Open memory with a custom cache backend.
    pub fn with_cache_backend(
        persistent_dir: impl Into<PathBuf>,
        backend: Box<dyn CacheBackend>,
        config: MemoryConfig,
    ) -> Result<Self> {
        let store = PersistentStore::open(persistent_dir)?;
        let patterns = PatternLog::new(store.load_patterns()?);
        let stats = store.load_stats()?;
        let cache = ResultCache::new(backend, config.cache_ttl_secs);

        info!("Memory initialized: {} patterns loaded", patterns.len());

        Ok(Self {
            config,
            store,
            patterns,
            stats,
            cache,
        })
    }

    pub fn patterns(&self) -> &[PatternRecord] {
        self.patterns.records()
    }

    pub fn stats(&self) -> &MemoryStats {
        &self.stats
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResultCache {
        &mut self.cache
    }

    /// Record the outcome of a research attempt.
    pub fn remember_query(
        &mut self,
        query: &str,
        method: &str,
        success: bool,
        response_time: f64,
        citations_count: u32,
    ) -> Result<()> {
        let record = self
            .patterns
            .append(query, method, success, response_time, citations_count)
            .clone();
        self.stats.record_query(record.response_time);

        if let Some(learned) = self.patterns.learn(&record, self.config.learn_threshold) {
            self.stats.patterns_learned += 1;
            info!(
                "Pattern learned: {} → {} (confidence: {:.2}%)",
                learned.query_type,
                learned.method,
                learned.share * 100.0
            );
        }

        if self.patterns.len() % self.config.flush_every.max(1) == 0 {
            self.flush()?;
            info!("Memory checkpoint: {} patterns saved", self.patterns.len());
        }

        Ok(())
    }

    /// Suggested method identifier for `query`, if memory is confident.
    pub fn suggest(&self, query: &str) -> Option<String> {
        self.suggestion(query).map(|s| s.method)
    }

    /// Full suggestion (method, type, confidence) for `query`.
    pub fn suggestion(&self, query: &str) -> Option<Suggestion> {
        let suggestion = self.patterns.suggest(query, self.config.min_confidence)?;
        info!(
            "Memory suggests: {} for {} (confidence: {:.0}%)",
            suggestion.method,
            suggestion.query_type,
            suggestion.confidence * 100.0
        );
        Some(suggestion)
    }

    /// Fresh cached result for `query`, counting the hit.
    pub fn get_cached_result(&mut self, query: &str) -> Result<Option<serde_json::Value>> {
        let Some(hit) = self.cache.lookup(query)? else {
            return Ok(None);
        };

        self.stats.cache_hits += 1;
        match hit.tier {
            CacheTier::Memory => info!("Cache hit! (used {} times)", hit.hit_count),
            CacheTier::Durable => info!("Cache hit from disk!"),
        }
        Ok(Some(hit.result))
    }

    /// Whether a fresh cached result exists for `query`. Counts nothing.
    pub fn has_cached_result(&self, query: &str) -> Result<bool> {
        self.cache.contains_fresh(query)
    }

    /// Cache a result under the fingerprint of `query`.
    pub fn cache_result<T: Serialize + ?Sized>(&mut self, query: &str, result: &T) -> Result<()> {
        let key = self.cache.put(query, result)?;
        debug!(key = %key, "Result cached");
        Ok(())
    }

    /// Recompute the insight report from the full pattern log.
    pub fn get_insights(&self) -> InsightReport {
        InsightReport::build(self.patterns.records(), &self.stats)
    }

    /// Remove durable cache entries older than `max_age_hours`.
    pub fn cleanup(&mut self, max_age_hours: u64) -> Result<usize> {
        self.cache.sweep(max_age_hours)
    }

    /// Write the pattern log and statistics to disk.
    pub fn flush(&self) -> Result<()> {
        self.store.save_patterns(self.patterns.records())?;
        self.store.save_stats(&self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CacheEntry, QueryType};
    use crate::error::Error;
    use std::fs;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::{TempDir, tempdir};

    fn open_temp() -> (TempDir, ResearchMemory) {
        let temp = tempdir().unwrap();
        let memory = ResearchMemory::open(
            MemoryPaths::from_roots(temp.path().join(".aget"), temp.path().join("workspace")),
            MemoryConfig::default(),
        )
        .unwrap();
        (temp, memory)
    }

    fn reopen(temp: &TempDir) -> ResearchMemory {
        ResearchMemory::open(
            MemoryPaths::from_roots(temp.path().join(".aget"), temp.path().join("workspace")),
            MemoryConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_paths_layout() {
        let paths = MemoryPaths::from_roots(".aget", "workspace");
        assert_eq!(paths.persistent_dir, PathBuf::from(".aget/memory"));
        assert_eq!(paths.cache_dir, PathBuf::from("workspace/memory/cache"));
    }

    #[test]
    fn test_running_average_over_all_records() {
        let (_temp, mut memory) = open_temp();
        memory.remember_query("q1", "A", true, 10.0, 0).unwrap();
        memory.remember_query("q2", "A", false, 20.0, 0).unwrap();
        memory.remember_query("q3", "B", true, 30.0, 0).unwrap();

        assert_eq!(memory.stats().total_queries, 3);
        assert_eq!(memory.stats().avg_response_time, 20.0);
    }

    #[test]
    fn test_learner_fires_at_threshold_and_keeps_firing() {
        let (_temp, mut memory) = open_temp();
        for _ in 0..2 {
            memory.remember_query("Explain lifetimes", "A", true, 1.0, 0).unwrap();
        }
        assert_eq!(memory.stats().patterns_learned, 0);

        memory.remember_query("Explain lifetimes", "A", true, 1.0, 0).unwrap();
        assert_eq!(memory.stats().patterns_learned, 1);

        // recurring emission once past the threshold
        memory.remember_query("Define borrowing", "A", true, 1.0, 0).unwrap();
        assert_eq!(memory.stats().patterns_learned, 2);

        // failures never count
        memory.remember_query("Define borrowing", "A", false, 1.0, 0).unwrap();
        assert_eq!(memory.stats().patterns_learned, 2);
    }

    #[test]
    fn test_flush_every_fifth_record() {
        let (temp, mut memory) = open_temp();
        for i in 0..4 {
            memory.remember_query(&format!("q{}", i), "A", true, 1.0, 0).unwrap();
        }
        assert!(reopen(&temp).patterns().is_empty());

        memory.remember_query("q4", "A", true, 1.0, 0).unwrap();
        let reloaded = reopen(&temp);
        assert_eq!(reloaded.patterns().len(), 5);
        assert_eq!(reloaded.stats().total_queries, 5);
        assert_eq!(reloaded.patterns(), memory.patterns());
    }

    #[test]
    fn test_flush_failure_reaches_caller() {
        let (temp, mut memory) = open_temp();
        // a directory where patterns.json belongs makes the write fail
        fs::create_dir_all(temp.path().join(".aget/memory/patterns.json")).unwrap();

        for i in 0..4 {
            memory.remember_query(&format!("q{}", i), "A", true, 1.0, 0).unwrap();
        }
        let err = memory.remember_query("q4", "A", true, 1.0, 0).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        // the record itself is kept in memory
        assert_eq!(memory.patterns().len(), 5);
    }

    #[test]
    fn test_has_cached_result_counts_nothing() {
        let (_temp, mut memory) = open_temp();
        memory.cache_result("What is RAG?", &json!("retrieval")).unwrap();

        assert!(memory.has_cached_result("What is RAG?").unwrap());
        assert!(!memory.has_cached_result("What is MoE?").unwrap());
        assert_eq!(memory.stats().cache_hits, 0);
    }

    #[test]
    fn test_explicit_flush() {
        let (temp, mut memory) = open_temp();
        memory.remember_query("What is Rust?", "A", true, 2.0, 1).unwrap();
        memory.flush().unwrap();

        let reloaded = reopen(&temp);
        assert_eq!(reloaded.patterns().len(), 1);
        assert_eq!(reloaded.patterns()[0].query_type, QueryType::ConceptualExplanation);
    }

    #[test]
    fn test_cache_roundtrip_counts_hits() {
        let (_temp, mut memory) = open_temp();
        let result = json!({"content": "A neural network is...", "citations": 10});
        memory.cache_result("What is a neural network?", &result).unwrap();

        assert_eq!(
            memory.get_cached_result("What is a neural network?").unwrap(),
            Some(result)
        );
        assert_eq!(memory.stats().cache_hits, 1);
        assert_eq!(memory.get_cached_result("something else").unwrap(), None);
        assert_eq!(memory.stats().cache_hits, 1);
    }

    #[test]
    fn test_cache_survives_restart() {
        let (temp, mut memory) = open_temp();
        memory.cache_result("persisted", &json!([1, 2, 3])).unwrap();
        drop(memory);

        let mut reloaded = reopen(&temp);
        assert_eq!(reloaded.get_cached_result("persisted").unwrap(), Some(json!([1, 2, 3])));
        assert_eq!(reloaded.stats().cache_hits, 1);
        assert!(reloaded.cache().is_hot("persisted"));
    }

    #[test]
    fn test_ttl_boundary() {
        let (_temp, mut memory) = open_temp();
        let now = Utc::now();
        for (query, age) in [("fresh", 3599), ("stale", 3601)] {
            memory
                .cache_mut()
                .insert_entry(CacheEntry {
                    key: fingerprint(query),
                    query: query.to_string(),
                    result: json!(query),
                    created_at: now - Duration::seconds(age),
                    hit_count: 0,
                })
                .unwrap();
        }

        assert_eq!(memory.get_cached_result("fresh").unwrap(), Some(json!("fresh")));
        assert_eq!(memory.get_cached_result("stale").unwrap(), None);
        assert_eq!(memory.stats().cache_hits, 1);
    }

    #[test]
    fn test_cleanup_counts_removed() {
        let (_temp, mut memory) = open_temp();
        let now = Utc::now();
        for (query, hours) in [("old-1", 48), ("old-2", 25), ("new", 1)] {
            memory
                .cache_mut()
                .insert_entry(CacheEntry {
                    key: fingerprint(query),
                    query: query.to_string(),
                    result: json!(null),
                    created_at: now - Duration::hours(hours),
                    hit_count: 0,
                })
                .unwrap();
        }

        assert_eq!(memory.cleanup(24).unwrap(), 2);
        let remaining = memory.cache().backend().entries().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].query, "new");
    }

    #[test]
    fn test_in_memory_backend() {
        let temp = tempdir().unwrap();
        let mut memory = ResearchMemory::with_cache_backend(
            temp.path(),
            Box::new(InMemoryCacheBackend::new()),
            MemoryConfig::default(),
        )
        .unwrap();

        memory.cache_result("q", "answer").unwrap();
        assert_eq!(memory.get_cached_result("q").unwrap(), Some(json!("answer")));
        assert_eq!(memory.cache().backend().name(), "memory");
    }

    #[test]
    fn test_end_to_end_conceptual_queries() {
        let (_temp, mut memory) = open_temp();
        for topic in ["monads", "CRDTs", "ownership", "actors", "futures"] {
            memory
                .remember_query(&format!("What is {}?", topic), "A", true, 5.0, 2)
                .unwrap();
        }

        let insights = memory.get_insights();
        assert_eq!(insights.avg_response_time, 5.0);
        assert_eq!(insights.method_preferences["A"], 5);
        assert_eq!(insights.query_types["conceptual_explanation"], 5);
        assert_eq!(memory.suggest("What is X?"), Some("A".to_string()));
    }
}
