//! WebDAV remote mirror client
//!
//! Implements the `RemoteSyncClient` trait against a WebDAV share laid out
//! as `<storage_root>/<KEY>/<filename>` plus a single database snapshot
//! file. Downloads land inside the local library under the same
//! `<KEY>/<filename>` layout, so the resolution engine finds them on the
//! next local lookup.

use crate::error::{Result, WebDavError};
use crate::transport::{HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use core_resolver::{RemoteError, RemoteSyncClient};
use core_runtime::config::WebDavSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Suffix of the scratch file used for atomic replacement
const PARTIAL_SUFFIX: &str = ".part";

/// WebDAV client for attachment and database snapshot retrieval
pub struct WebDavClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    storage_root: String,
    remote_database_path: String,
    library_dir: PathBuf,
    local_database_path: PathBuf,
}

impl WebDavClient {
    /// Create a client backed by the production `reqwest` transport.
    pub fn new(
        settings: &WebDavSettings,
        library_dir: impl Into<PathBuf>,
        local_database_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(settings)?);
        Ok(Self::with_transport(
            transport,
            settings,
            library_dir,
            local_database_path,
        ))
    }

    /// Create a client over an arbitrary transport (used by tests).
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        settings: &WebDavSettings,
        library_dir: impl Into<PathBuf>,
        local_database_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            base_url: settings.base_url.clone(),
            storage_root: settings.storage_root.clone(),
            remote_database_path: settings.database_path.clone(),
            library_dir: library_dir.into(),
            local_database_path: local_database_path.into(),
        }
    }

    /// URL of one attachment on the remote share.
    fn attachment_url(&self, storage_key: &str, filename: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            self.storage_root,
            urlencoding::encode(storage_key),
            urlencoding::encode(filename)
        )
    }

    /// URL of the remote database snapshot.
    fn database_url(&self) -> String {
        format!("{}{}", self.base_url, self.remote_database_path)
    }

    /// URL of the storage root folder, used for connectivity probes.
    fn storage_root_url(&self) -> String {
        format!("{}{}", self.base_url, self.storage_root)
    }

    /// Fetch `url` and write it to `destination` via a scratch sibling and
    /// rename, so a crashed transfer never leaves a truncated file behind.
    async fn fetch_to_path(&self, url: &str, destination: &Path) -> Result<()> {
        let body = self.transport.get(url).await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut scratch = destination.as_os_str().to_owned();
        scratch.push(PARTIAL_SUFFIX);
        let scratch = PathBuf::from(scratch);

        tokio::fs::write(&scratch, &body).await?;
        if let Err(e) = tokio::fs::rename(&scratch, destination).await {
            // The scratch file must not outlive a failed transfer.
            let _ = tokio::fs::remove_file(&scratch).await;
            return Err(WebDavError::Io(e));
        }
        debug!(destination = %destination.display(), bytes = body.len(), "Transfer complete");
        Ok(())
    }
}

#[async_trait]
impl RemoteSyncClient for WebDavClient {
    #[instrument(skip(self))]
    async fn download_attachment(
        &self,
        storage_key: &str,
        filename: &str,
    ) -> std::result::Result<PathBuf, RemoteError> {
        let destination = self.library_dir.join(storage_key).join(filename);
        if destination.is_file() {
            debug!(destination = %destination.display(), "Attachment already present, skipping download");
            return Ok(destination);
        }

        let url = self.attachment_url(storage_key, filename);
        self.fetch_to_path(&url, &destination).await?;
        info!(storage_key = %storage_key, filename = %filename, "Attachment downloaded");
        Ok(destination)
    }

    #[instrument(skip(self))]
    async fn sync_database_snapshot(&self) -> std::result::Result<(), RemoteError> {
        let url = self.database_url();
        self.fetch_to_path(&url, &self.local_database_path).await?;
        info!(path = %self.local_database_path.display(), "Database snapshot replaced");
        Ok(())
    }

    async fn remote_exists(&self, storage_key: &str, filename: &str) -> bool {
        let url = self.attachment_url(storage_key, filename);
        match self.transport.exists(&url).await {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "Remote existence probe failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn test_connection(&self) -> bool {
        match self.transport.exists(&self.storage_root_url()).await {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "Remote mirror is unreachable");
                false
            }
        }
    }
}
