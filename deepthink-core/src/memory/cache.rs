//! Content-addressed result cache.
//!
//! Two tiers: a process-local map for speed, backed by a pluggable
//! [`CacheBackend`] that survives restarts. Reads check the hot map first and
//! hydrate it from the backend on a miss. Expiry is lazy: stale entries are
//! skipped by reads and only removed by [`ResultCache::sweep`], which works
//! on the backend alone. An entry swept from the backend stays readable from
//! the hot map until it goes stale there too.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::store::{read_json, write_json};
use super::traits::CacheBackend;
use crate::error::Result;
use crate::types::CacheEntry;

/// Deterministic fingerprint of the raw query text (MD5, lowercase hex).
pub fn fingerprint(query: &str) -> String {
    format!("{:x}", md5::compute(query.as_bytes()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Backends
// ─────────────────────────────────────────────────────────────────────────────

/// Backend that keeps entries in process memory only.
#[derive(Debug, Default)]
pub struct InMemoryCacheBackend {
    entries: HashMap<String, CacheEntry>,
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for InMemoryCacheBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, entry: &CacheEntry) -> Result<()> {
        self.entries.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        Ok(self.entries.values().cloned().collect())
    }
}

/// Backend storing one `<fingerprint>.json` document per entry.
#[derive(Debug, Clone)]
pub struct FileCacheBackend {
    dir: PathBuf,
}

impl FileCacheBackend {
    /// Open a cache directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn entry_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl CacheBackend for FileCacheBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        read_json(&self.path_for(key))
    }

    fn store(&mut self, entry: &CacheEntry) -> Result<()> {
        write_json(&self.path_for(&entry.key), entry)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for path in self.entry_paths()? {
            if let Some(entry) = read_json(&path)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tiered cache
// ─────────────────────────────────────────────────────────────────────────────

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Memory,
    Durable,
}

/// A fresh cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub result: serde_json::Value,
    pub tier: CacheTier,
    /// Hit count of the entry after this lookup.
    pub hit_count: u64,
}

/// Hot map layered over a durable backend, with TTL-based freshness.
pub struct ResultCache {
    hot: HashMap<String, CacheEntry>,
    durable: Box<dyn CacheBackend>,
    ttl_secs: u64,
}

impl ResultCache {
    pub fn new(durable: Box<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self {
            hot: HashMap::new(),
            durable,
            ttl_secs,
        }
    }

    /// Cache with no persistence beyond the process.
    pub fn in_memory(ttl_secs: u64) -> Self {
        Self::new(Box::new(InMemoryCacheBackend::new()), ttl_secs)
    }

    pub fn backend(&self) -> &dyn CacheBackend {
        self.durable.as_ref()
    }

    /// Whether the hot tier holds an entry for `query`, fresh or not.
    pub fn is_hot(&self, query: &str) -> bool {
        self.hot.contains_key(&fingerprint(query))
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        entry.age_secs(now) < self.ttl_secs as f64
    }

    /// Store a result under the fingerprint of `query` in both tiers.
    pub fn put<T: Serialize + ?Sized>(&mut self, query: &str, result: &T) -> Result<String> {
        let entry = CacheEntry {
            key: fingerprint(query),
            query: query.to_string(),
            result: serde_json::to_value(result)?,
            created_at: Utc::now(),
            hit_count: 0,
        };
        let key = entry.key.clone();
        self.insert_entry(entry)?;
        Ok(key)
    }

    /// Write a prepared entry to both tiers.
    pub fn insert_entry(&mut self, entry: CacheEntry) -> Result<()> {
        self.durable.store(&entry)?;
        debug!(key = %entry.key, backend = self.durable.name(), "Cached result");
        self.hot.insert(entry.key.clone(), entry);
        Ok(())
    }

    pub fn lookup(&mut self, query: &str) -> Result<Option<CacheHit>> {
        self.lookup_at(query, Utc::now())
    }

    /// Look up `query` as of `now`.
    ///
    /// Hot hits bump the entry's hit count. Durable hits hydrate the hot tier
    /// with the entry as stored, leaving its hit count untouched.
    pub fn lookup_at(&mut self, query: &str, now: DateTime<Utc>) -> Result<Option<CacheHit>> {
        let key = fingerprint(query);
        let ttl = self.ttl_secs as f64;

        if let Some(entry) = self.hot.get_mut(&key) {
            if entry.age_secs(now) < ttl {
                entry.hit_count += 1;
                return Ok(Some(CacheHit {
                    result: entry.result.clone(),
                    tier: CacheTier::Memory,
                    hit_count: entry.hit_count,
                }));
            }
        }

        let Some(entry) = self.durable.load(&key)? else {
            return Ok(None);
        };
        if !self.is_fresh(&entry, now) {
            debug!(key = %key, "Durable cache entry is stale");
            return Ok(None);
        }

        let hit = CacheHit {
            result: entry.result.clone(),
            tier: CacheTier::Durable,
            hit_count: entry.hit_count,
        };
        self.hot.insert(key, entry);
        Ok(Some(hit))
    }

    /// Whether a fresh entry exists for `query`, without counting a hit or
    /// hydrating the hot tier.
    pub fn contains_fresh(&self, query: &str) -> Result<bool> {
        self.contains_fresh_at(query, Utc::now())
    }

    pub fn contains_fresh_at(&self, query: &str, now: DateTime<Utc>) -> Result<bool> {
        let key = fingerprint(query);
        if self.hot.get(&key).is_some_and(|e| self.is_fresh(e, now)) {
            return Ok(true);
        }
        Ok(self
            .durable
            .load(&key)?
            .is_some_and(|e| self.is_fresh(&e, now)))
    }

    pub fn sweep(&mut self, max_age_hours: u64) -> Result<usize> {
        self.sweep_at(max_age_hours, Utc::now())
    }

    /// Remove durable entries older than `max_age_hours` as of `now`.
    pub fn sweep_at(&mut self, max_age_hours: u64, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for entry in self.durable.entries()? {
            let age_hours = entry.age_secs(now) / 3600.0;
            if age_hours > max_age_hours as f64 && self.durable.remove(&entry.key)? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Cleaned {} old cache entries", removed);
        }
        Ok(removed)
    }
}
