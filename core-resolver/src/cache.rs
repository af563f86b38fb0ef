//! # Resolution Cache
//!
//! Bounded in-memory map of previously resolved `(storage key, filename)`
//! pairs to local paths, so repeated resolutions skip the filesystem walk and
//! any remote fetch. Entries are validated against disk by the engine before
//! being trusted.

use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;

/// A cached resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub storage_key: String,
    pub filename: String,
    pub local_path: PathBuf,
    pub resolved_at: DateTime<Utc>,
}

/// LRU cache of resolved attachment locations.
///
/// Reads and writes are atomic per key: the interior mutex means concurrent
/// resolutions never observe a partially written entry. A later `put` for the
/// same key overwrites the earlier entry.
#[derive(Debug)]
pub struct ResolutionCache {
    inner: Mutex<LruCache<(String, String), CacheEntry>>,
}

impl ResolutionCache {
    /// Create a cache holding at most `capacity` entries, evicting the least
    /// recently used beyond that.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up an entry, marking it most recently used.
    pub fn get(&self, storage_key: &str, filename: &str) -> Option<CacheEntry> {
        self.lock()
            .get(&(storage_key.to_string(), filename.to_string()))
            .cloned()
    }

    /// Insert or update an entry.
    pub fn put(&self, storage_key: &str, filename: &str, local_path: PathBuf) {
        let entry = CacheEntry {
            storage_key: storage_key.to_string(),
            filename: filename.to_string(),
            local_path,
            resolved_at: Utc::now(),
        };
        self.lock()
            .put((entry.storage_key.clone(), entry.filename.clone()), entry);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(String, String), CacheEntry>> {
        // A panic while holding the lock cannot leave an entry half written
        // (inserts are single calls), so a poisoned lock is still usable.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
