//! Storage trait for the result cache.

use crate::error::Result;
use crate::types::CacheEntry;

/// Backend holding cache entries addressed by fingerprint.
///
/// Implementations decide where entries live (process memory, one JSON file
/// per entry, ...). Freshness is not the backend's concern: it stores and
/// returns entries verbatim, and [`super::ResultCache`] applies the TTL.
pub trait CacheBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Load an entry by fingerprint.
    fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Store (or overwrite) an entry under `entry.key`.
    fn store(&mut self, entry: &CacheEntry) -> Result<()>;

    /// Remove an entry. Returns whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// All entries currently held.
    fn entries(&self) -> Result<Vec<CacheEntry>>;
}
