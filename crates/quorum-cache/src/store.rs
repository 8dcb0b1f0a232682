//! The result cache: command trait and in-memory implementation.
//!
//! The bridge only writes commands; it never reads entries. Screens populate
//! entries with [`MemoryCache::insert`] after their own fetches and consult
//! [`Freshness`] to decide whether to refetch. Invalidation is monotonic
//! (fresh → stale, stale stays stale), which is what makes duplicate or
//! reordered invalidations harmless.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::key::QueryKey;

/// Whether a cached entry can be served as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// Servable without a refetch.
    Fresh,
    /// Servable only while a refetch is in flight; the next read refetches.
    Stale,
}

/// One cached query result.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The fetched (or pushed) payload.
    pub value: Value,
    /// Current freshness.
    pub freshness: Freshness,
}

/// The write-command surface the sync bridge mutates the cache through.
///
/// All three commands are infallible and idempotent. Implementations must
/// tolerate commands for absent keys (both invalidate and evict are no-ops
/// then) and must never block event processing for long.
pub trait ResultCache: Send + Sync {
    /// Mark an entry stale so the next read triggers a fresh fetch.
    fn invalidate(&self, key: &QueryKey);
    /// Overwrite an entry with a server-pushed payload and mark it fresh.
    fn replace(&self, key: QueryKey, value: Value);
    /// Remove an entry outright so no stale value is servable.
    fn evict(&self, key: &QueryKey);
}

/// Running counts of commands applied, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored.
    pub size: usize,
    /// Invalidate commands applied (including no-op ones).
    pub invalidations: u64,
    /// Replace commands applied.
    pub replacements: u64,
    /// Evict commands applied (including no-op ones).
    pub evictions: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    invalidations: u64,
    replacements: u64,
    evictions: u64,
}

/// In-memory result cache with freshness tracking.
#[derive(Default)]
pub struct MemoryCache {
    inner: RwLock<Inner>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly fetched result (screen-side write).
    pub fn insert(&self, key: QueryKey, value: Value) {
        let mut inner = self.inner.write();
        let _ = inner.entries.insert(
            key,
            Entry {
                value,
                freshness: Freshness::Fresh,
            },
        );
    }

    /// Read an entry (screen-side read). The bridge never calls this.
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<Entry> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Whether any entry exists under the key, fresh or stale.
    #[must_use]
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.read().entries.contains_key(key)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Command counters and current size.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        CacheStats {
            size: inner.entries.len(),
            invalidations: inner.invalidations,
            replacements: inner.replacements,
            evictions: inner.evictions,
        }
    }
}

impl ResultCache for MemoryCache {
    fn invalidate(&self, key: &QueryKey) {
        let mut inner = self.inner.write();
        inner.invalidations += 1;
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.freshness = Freshness::Stale;
            tracing::debug!(key = %key, "cache entry invalidated");
        }
    }

    fn replace(&self, key: QueryKey, value: Value) {
        let mut inner = self.inner.write();
        inner.replacements += 1;
        tracing::debug!(key = %key, "cache entry replaced with pushed payload");
        let _ = inner.entries.insert(
            key,
            Entry {
                value,
                freshness: Freshness::Fresh,
            },
        );
    }

    fn evict(&self, key: &QueryKey) {
        let mut inner = self.inner.write();
        inner.evictions += 1;
        if inner.entries.remove(key).is_some() {
            tracing::debug!(key = %key, "cache entry evicted");
        }
    }
}
