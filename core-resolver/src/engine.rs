//! # Resolution Engine
//!
//! Orchestrates reference parsing, metadata-assisted key derivation, local
//! lookup, remote fallback retrieval, and result caching into the single
//! `resolve` operation, plus the bulk sync operations.
//!
//! ## Resolution order
//!
//! 1. Parse the reference; reject empty input outright.
//! 2. Derive a storage key from the metadata store when the input carries
//!    none.
//! 3. Trust the cache only if the cached file is still on disk.
//! 4. Direct probe of `<library>/<key>/<filename>`, then a recursive walk of
//!    the library root.
//! 5. Remote fetch, when sync is enabled and a key is known.
//!
//! Concurrent resolutions of the same `(storage key, filename)` coalesce:
//! the miss path is serialized per key, so only one download can be in
//! flight and late arrivals pick the winner's result out of the cache.

use crate::cache::ResolutionCache;
use crate::error::{ResolverError, Result};
use crate::job::{RemoteStatus, SyncKind, SyncOutcome, SyncReport};
use crate::locator::{AttachmentLocator, FsLocator};
use crate::reference::{self, AttachmentReference, Notation};
use crate::remote::RemoteSyncClient;
use crate::resolved::{ResolutionSource, ResolvedFile};
use core_library::MetadataLookup;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::{debug, info, instrument, warn};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Local attachment library root.
    pub library_dir: PathBuf,

    /// Resolution cache capacity.
    pub cache_capacity: usize,

    /// Parallel downloads during bulk sync.
    pub bulk_concurrency: usize,

    /// Per-item cutoff for remote transfers during bulk sync, so one
    /// unreachable item cannot stall the batch.
    pub item_timeout: Duration,
}

impl EngineConfig {
    pub fn new(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: library_dir.into(),
            cache_capacity: 4096,
            bulk_concurrency: 4,
            item_timeout: Duration::from_secs(60),
        }
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn bulk_concurrency(mut self, concurrency: usize) -> Self {
        self.bulk_concurrency = concurrency;
        self
    }

    pub fn item_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = timeout;
        self
    }
}

type FlightKey = (String, String);

enum ItemOutcome {
    Downloaded {
        storage_key: String,
        filename: String,
        path: PathBuf,
    },
    Skipped,
}

/// The attachment resolution and remote sync engine.
///
/// Owns the resolution cache; the metadata store and remote client are
/// injected collaborators.
pub struct ResolutionEngine {
    library_dir: PathBuf,
    metadata: Arc<dyn MetadataLookup>,
    remote: Option<Arc<dyn RemoteSyncClient>>,
    locator: Arc<dyn AttachmentLocator>,
    cache: ResolutionCache,
    // Per-key serialization of the miss path. Entries are never pruned; the
    // map is bounded by the number of distinct attachments, like the cache.
    in_flight: StdMutex<HashMap<FlightKey, Arc<AsyncMutex<()>>>>,
    bulk_concurrency: usize,
    item_timeout: Duration,
}

impl ResolutionEngine {
    /// Create an engine. Pass `None` for `remote` to run local-only.
    pub fn new(
        config: EngineConfig,
        metadata: Arc<dyn MetadataLookup>,
        remote: Option<Arc<dyn RemoteSyncClient>>,
    ) -> Self {
        Self {
            library_dir: config.library_dir,
            metadata,
            remote,
            locator: Arc::new(FsLocator),
            cache: ResolutionCache::new(config.cache_capacity),
            in_flight: StdMutex::new(HashMap::new()),
            bulk_concurrency: config.bulk_concurrency,
            item_timeout: config.item_timeout,
        }
    }

    /// Replace the local locator (used by tests).
    pub fn with_locator(mut self, locator: Arc<dyn AttachmentLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Whether remote sync is enabled.
    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Resolve a reference to a local file, fetching from the remote mirror
    /// on a local miss when possible.
    ///
    /// # Errors
    ///
    /// `ResolverError::InvalidInput` for an empty reference;
    /// `ResolverError::Internal` only for unexpected faults. A legitimately
    /// absent attachment is `Ok` with `found: false`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_reference: &str) -> Result<ResolvedFile> {
        let raw = raw_reference.trim();
        if raw.is_empty() {
            return Err(ResolverError::InvalidInput(
                "reference must not be empty".to_string(),
            ));
        }

        let mut reference = AttachmentReference::parse(raw);
        if reference.storage_key.is_none() {
            reference.storage_key = self.derive_storage_key(&reference).await;
        }
        debug!(
            storage_key = ?reference.storage_key,
            filename = %reference.filename,
            "Reference parsed"
        );

        if let Some(resolved) = self.cached(&reference) {
            return Ok(resolved);
        }

        // Serialize the miss path per key; concurrent misses for the same
        // attachment coalesce into one download.
        let guard = reference
            .storage_key
            .as_ref()
            .map(|key| self.flight_guard(key, &reference.filename));
        let _held = match &guard {
            Some(mutex) => Some(mutex.lock().await),
            None => None,
        };

        // A caller that lost the race finds the winner's result here.
        if let Some(resolved) = self.cached(&reference) {
            return Ok(resolved);
        }

        if let Some(found) = self.find_local(&reference).await? {
            if let Some(key) = reference.storage_key.as_deref() {
                self.cache.put(key, &reference.filename, found.clone());
            }
            return Ok(ResolvedFile::found_at(
                &reference.filename,
                found,
                &self.library_dir,
                ResolutionSource::LocalDisk,
            ));
        }

        if let (Some(remote), Some(key)) = (self.remote.as_ref(), reference.storage_key.as_deref())
        {
            match remote.download_attachment(key, &reference.filename).await {
                Ok(path) => {
                    info!(storage_key = %key, filename = %reference.filename, "Attachment fetched from remote mirror");
                    self.cache.put(key, &reference.filename, path.clone());
                    return Ok(ResolvedFile::found_at(
                        &reference.filename,
                        path,
                        &self.library_dir,
                        ResolutionSource::Remote,
                    ));
                }
                Err(e) => {
                    warn!(storage_key = %key, filename = %reference.filename, error = %e, "Remote fetch failed, reporting not found");
                }
            }
        }

        let message = if reference.storage_key.is_none() {
            "no storage key could be derived for this reference"
        } else {
            "attachment not found locally or remotely"
        };
        Ok(ResolvedFile::not_found(&reference.filename, message))
    }

    /// Sync up to `limit` attachments from the remote mirror into the local
    /// library. One item's failure never aborts the batch.
    #[instrument(skip(self))]
    pub async fn sync_all(&self, limit: usize) -> SyncReport {
        let mut report = SyncReport::new(SyncKind::BulkAttachments, Some(limit));
        let Some(remote) = self.remote.clone() else {
            report.errors.push("remote sync is disabled".to_string());
            report.finish();
            return report;
        };

        let mut records = self.metadata.list_attachments(limit).await;
        // No two downloads may share a destination path.
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert((r.storage_key.clone(), r.filename.clone())));
        info!(count = records.len(), "Starting bulk attachment sync");

        let semaphore = Arc::new(Semaphore::new(self.bulk_concurrency.max(1)));
        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            let semaphore = Arc::clone(&semaphore);
            let remote = Arc::clone(&remote);
            let guard = self.flight_guard(&record.storage_key, &record.filename);
            let local_path = self
                .library_dir
                .join(&record.storage_key)
                .join(&record.filename);
            let item_timeout = self.item_timeout;
            let storage_key = record.storage_key;
            let filename = record.filename;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| format!("{}/{}: semaphore closed", storage_key, filename))?;
                let _held = guard.lock().await;

                if local_path.is_file() {
                    return Ok(ItemOutcome::Skipped);
                }

                match tokio::time::timeout(
                    item_timeout,
                    remote.download_attachment(&storage_key, &filename),
                )
                .await
                {
                    Ok(Ok(path)) => Ok(ItemOutcome::Downloaded {
                        storage_key,
                        filename,
                        path,
                    }),
                    Ok(Err(e)) => Err(format!("{}/{}: {}", storage_key, filename, e)),
                    Err(_) => Err(format!(
                        "{}/{}: transfer timed out after {}s",
                        storage_key,
                        filename,
                        item_timeout.as_secs()
                    )),
                }
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(Ok(ItemOutcome::Downloaded {
                    storage_key,
                    filename,
                    path,
                })) => {
                    self.cache.put(&storage_key, &filename, path);
                    report.record_success();
                }
                Ok(Ok(ItemOutcome::Skipped)) => report.record_skipped(),
                Ok(Err(message)) => {
                    warn!(%message, "Bulk sync item failed");
                    report.record_failure(message);
                }
                Err(e) => report.record_failure(format!("sync task failed: {}", e)),
            }
        }

        report.finish();
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Bulk attachment sync finished"
        );
        report
    }

    /// Replace the local bibliographic database with the remote snapshot.
    #[instrument(skip(self))]
    pub async fn sync_database(&self) -> SyncOutcome {
        let Some(remote) = self.remote.as_ref() else {
            return SyncOutcome {
                success: false,
                message: "remote sync is disabled".to_string(),
            };
        };
        match remote.sync_database_snapshot().await {
            Ok(()) => SyncOutcome {
                success: true,
                message: "database snapshot synced".to_string(),
            },
            Err(e) => {
                warn!(error = %e, "Database snapshot sync failed");
                SyncOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Probe remote mirror connectivity.
    #[instrument(skip(self))]
    pub async fn remote_status(&self) -> RemoteStatus {
        match self.remote.as_ref() {
            None => RemoteStatus {
                enabled: false,
                connected: false,
                error: None,
            },
            Some(remote) => {
                let connected = remote.test_connection().await;
                RemoteStatus {
                    enabled: true,
                    connected,
                    error: (!connected).then(|| "remote mirror is unreachable".to_string()),
                }
            }
        }
    }

    async fn derive_storage_key(&self, reference: &AttachmentReference) -> Option<String> {
        match reference.notation {
            Notation::Legacy => {
                if let Some(key) = self.metadata.storage_key_for_path(&reference.raw_input).await {
                    return Some(key);
                }
                // An absolute path the store does not know must not borrow
                // the key of another item sharing the basename; the filename
                // fallback is for bare references only.
                if reference::is_absolute_path(&reference.raw_input) {
                    return None;
                }
                self.metadata
                    .storage_key_for_filename(&reference.filename)
                    .await
            }
            _ => {
                self.metadata
                    .storage_key_for_filename(&reference.filename)
                    .await
            }
        }
    }

    /// Cache lookup validated against disk presence; a stale entry pointing
    /// at a deleted file is not trusted and the miss path runs instead.
    fn cached(&self, reference: &AttachmentReference) -> Option<ResolvedFile> {
        let key = reference.storage_key.as_deref()?;
        let entry = self.cache.get(key, &reference.filename)?;
        if entry.local_path.is_file() {
            Some(ResolvedFile::found_at(
                &reference.filename,
                entry.local_path,
                &self.library_dir,
                ResolutionSource::Cache,
            ))
        } else {
            debug!(storage_key = %key, filename = %reference.filename, "Stale cache entry, re-resolving");
            None
        }
    }

    /// Direct probe of the key folder, then a recursive walk of the library.
    async fn find_local(&self, reference: &AttachmentReference) -> Result<Option<PathBuf>> {
        if let Some(key) = reference.storage_key.as_deref() {
            let direct = self.library_dir.join(key).join(&reference.filename);
            if direct.is_file() {
                return Ok(Some(direct));
            }
        }

        let locator = Arc::clone(&self.locator);
        let root = self.library_dir.clone();
        let filename = reference.filename.clone();
        tokio::task::spawn_blocking(move || locator.find_by_filename(&root, &filename))
            .await
            .map_err(|e| ResolverError::Internal(format!("local scan task failed: {}", e)))
    }

    fn flight_guard(&self, storage_key: &str, filename: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry((storage_key.to_string(), filename.to_string()))
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
