//! # Bibliographic Metadata Store
//!
//! Read-only adapter to the library's SQLite database.
//!
//! The database file is owned by the reference manager (and periodically
//! replaced wholesale by the remote snapshot sync), so this adapter never
//! pools connections: each lookup opens one read-only connection and closes
//! it before returning, on every exit path. Query failures and zero-row
//! results both degrade to "no key" — the resolution engine treats them
//! identically, and a broken store must never fail a resolution outright.

use crate::error::{LibraryError, Result};
use crate::models::AttachmentRecord;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Read-only lookups against the bibliographic store.
///
/// All methods degrade on failure: an unavailable or corrupt store yields
/// `None` / an empty list after logging, never an error.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Storage key recorded for a legacy absolute attachment path, if any.
    async fn storage_key_for_path(&self, path: &str) -> Option<String>;

    /// Storage key for an attachment known only by filename, if any.
    async fn storage_key_for_filename(&self, filename: &str) -> Option<String>;

    /// Up to `limit` attachment records, for bulk sync.
    async fn list_attachments(&self, limit: usize) -> Vec<AttachmentRecord>;
}

/// SQLite-backed [`MetadataLookup`] over the reference manager's database.
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    database_path: PathBuf,
}

impl SqliteMetadataStore {
    /// Create a store reading from the given database file.
    ///
    /// The file may not exist yet (it appears after the first snapshot
    /// sync); lookups against a missing file degrade to empty results.
    pub fn new(database_path: impl AsRef<Path>) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying database file.
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    async fn open(&self) -> Result<SqliteConnection> {
        if !self.database_path.exists() {
            return Err(LibraryError::DatabaseMissing(
                self.database_path.display().to_string(),
            ));
        }
        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .read_only(true)
            .create_if_missing(false);
        Ok(options.connect().await?)
    }

    async fn close(conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close metadata store connection");
        }
    }

    async fn query_key_for_path(&self, path: &str) -> Result<Option<String>> {
        let mut conn = self.open().await?;
        let result = sqlx::query_as::<_, (String,)>(
            "SELECT i.key FROM itemAttachments ia \
             JOIN items i ON ia.itemID = i.itemID \
             WHERE ia.path = ?",
        )
        .bind(path)
        .fetch_optional(&mut conn)
        .await;
        Self::close(conn).await;
        Ok(result?.map(|(key,)| key))
    }

    async fn query_key_for_filename(&self, filename: &str) -> Result<Option<String>> {
        let mut conn = self.open().await?;
        let result = sqlx::query_as::<_, (String,)>(
            "SELECT i.key FROM itemAttachments ia \
             JOIN items i ON ia.itemID = i.itemID \
             WHERE ia.path LIKE ? OR ia.path = ?",
        )
        .bind(format!("%{}", filename))
        .bind(format!("storage:{}", filename))
        .fetch_optional(&mut conn)
        .await;
        Self::close(conn).await;
        Ok(result?.map(|(key,)| key))
    }

    async fn query_attachments(&self, limit: usize) -> Result<Vec<AttachmentRecord>> {
        let mut conn = self.open().await?;
        let result = sqlx::query_as::<_, (String, String)>(
            "SELECT i.key, ia.path FROM itemAttachments ia \
             JOIN items i ON ia.itemID = i.itemID \
             WHERE ia.path LIKE 'storage:%' AND lower(ia.path) LIKE '%.pdf' \
             ORDER BY i.key \
             LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&mut conn)
        .await;
        Self::close(conn).await;
        Ok(result?
            .into_iter()
            .map(|(key, path)| AttachmentRecord::from_row(key, &path))
            .collect())
    }
}

#[async_trait]
impl MetadataLookup for SqliteMetadataStore {
    #[instrument(skip(self))]
    async fn storage_key_for_path(&self, path: &str) -> Option<String> {
        match self.query_key_for_path(path).await {
            Ok(key) => {
                debug!(found = key.is_some(), "Legacy path lookup finished");
                key
            }
            Err(e) => {
                warn!(error = %e, "Legacy path lookup failed, treating as no key");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn storage_key_for_filename(&self, filename: &str) -> Option<String> {
        match self.query_key_for_filename(filename).await {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Filename lookup failed, treating as no key");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_attachments(&self, limit: usize) -> Vec<AttachmentRecord> {
        match self.query_attachments(limit).await {
            Ok(records) => {
                debug!(count = records.len(), "Listed attachment records");
                records
            }
            Err(e) => {
                warn!(error = %e, "Attachment listing failed, returning empty set");
                Vec::new()
            }
        }
    }
}
