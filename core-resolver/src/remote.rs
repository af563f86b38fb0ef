//! # Remote Sync Client Seam
//!
//! Trait the resolution engine uses to reach the remote library mirror.
//! Concrete transports (the WebDAV provider) implement this; tests mock it.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// A remote transfer failure.
///
/// Transport details (timeout, 404, auth) are flattened into the message:
/// the engine treats them all the same way, degrading the resolution to
/// not-found instead of escalating.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RemoteError(pub String);

/// Client for the remote library mirror.
///
/// Implementations must contain their own failures: no method may panic or
/// abort the process on transport errors.
#[async_trait]
pub trait RemoteSyncClient: Send + Sync {
    /// Fetch `<remote storage root>/<key>/<filename>` into the local library
    /// at `<library root>/<key>/<filename>`, creating directories as needed.
    ///
    /// Downloading a file already present locally is a no-op success;
    /// content is not re-verified.
    async fn download_attachment(
        &self,
        storage_key: &str,
        filename: &str,
    ) -> Result<PathBuf, RemoteError>;

    /// Fetch the remote bibliographic database and atomically replace the
    /// local copy (temp file + rename), so concurrent readers never observe
    /// a partial write.
    async fn sync_database_snapshot(&self) -> Result<(), RemoteError>;

    /// Whether the attachment exists on the mirror. `false` on any failure.
    async fn remote_exists(&self, storage_key: &str, filename: &str) -> bool;

    /// Lightweight existence probe against the remote storage root.
    /// Never raises; `false` on any failure.
    async fn test_connection(&self) -> bool;
}
