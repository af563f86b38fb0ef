//! Core service façade and bootstrap helpers.
//!
//! This crate wires the metadata store, the optional WebDAV remote client,
//! and the resolution engine into a single handle host applications hold.
//! HTTP servers expose `resolve` behind their attachment endpoint and the
//! sync operations behind admin endpoints; the façade owns all construction
//! so hosts never assemble engine internals themselves.

pub mod error;

pub use error::{CoreError, Result};

use core_library::SqliteMetadataStore;
use core_resolver::{
    EngineConfig, RemoteStatus, RemoteSyncClient, ResolutionEngine, ResolvedFile, SyncOutcome,
    SyncReport,
};
use core_runtime::config::CoreConfig;
use provider_webdav::WebDavClient;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct AttachmentService {
    config: Arc<CoreConfig>,
    engine: Arc<ResolutionEngine>,
}

impl AttachmentService {
    /// Construct the service from a validated configuration.
    ///
    /// Creates the library directory if absent and, when remote sync is
    /// configured, builds the WebDAV client; a bad remote configuration
    /// fails initialization rather than the first request.
    pub fn initialize(config: CoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.library_dir).map_err(|e| {
            CoreError::InitializationFailed(format!(
                "cannot create library directory {}: {}",
                config.library_dir.display(),
                e
            ))
        })?;

        let metadata = Arc::new(SqliteMetadataStore::new(&config.database_path));

        let remote: Option<Arc<dyn RemoteSyncClient>> = match &config.webdav {
            Some(settings) => {
                let client =
                    WebDavClient::new(settings, &config.library_dir, &config.database_path)
                        .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let engine = ResolutionEngine::new(
            EngineConfig::new(&config.library_dir).cache_capacity(config.cache_capacity),
            metadata,
            remote,
        );

        info!(
            library_dir = %config.library_dir.display(),
            remote_enabled = config.remote_enabled(),
            "Attachment service initialized"
        );
        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        })
    }

    /// Resolve an attachment reference to a local file.
    pub async fn resolve(&self, reference: &str) -> Result<ResolvedFile> {
        Ok(self.engine.resolve(reference).await?)
    }

    /// Bulk-sync up to `limit` attachments from the remote mirror.
    pub async fn sync_all(&self, limit: usize) -> SyncReport {
        self.engine.sync_all(limit).await
    }

    /// Replace the local database with the remote snapshot.
    pub async fn sync_database(&self) -> SyncOutcome {
        self.engine.sync_database().await
    }

    /// Report remote mirror configuration and connectivity.
    pub async fn remote_status(&self) -> RemoteStatus {
        self.engine.remote_status().await
    }

    /// The configuration the service was built from.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_runtime::config::WebDavSettings;
    use tempfile::TempDir;

    fn base_config(dir: &TempDir) -> CoreConfig {
        CoreConfig::builder()
            .library_dir(dir.path().join("library"))
            .database_path(dir.path().join("zotero.sqlite"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_creates_library_dir() {
        let dir = TempDir::new().unwrap();
        let service = AttachmentService::initialize(base_config(&dir)).unwrap();

        assert!(dir.path().join("library").is_dir());
        assert!(!service.config().remote_enabled());
    }

    #[tokio::test]
    async fn test_local_only_service_resolves_from_disk() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("library/ABCD1234/paper.pdf");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, b"%PDF-1.4").unwrap();

        let service = AttachmentService::initialize(base_config(&dir)).unwrap();
        let resolved = service.resolve("storage:ABCD1234/paper.pdf").await.unwrap();

        assert!(resolved.found);
        assert_eq!(resolved.relative_path.as_deref(), Some("ABCD1234/paper.pdf"));
    }

    #[tokio::test]
    async fn test_sync_without_remote_reports_disabled() {
        let dir = TempDir::new().unwrap();
        let service = AttachmentService::initialize(base_config(&dir)).unwrap();

        let status = service.remote_status().await;
        assert!(!status.enabled);

        let outcome = service.sync_database().await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_initialize_with_webdav_settings() {
        let dir = TempDir::new().unwrap();
        let config = CoreConfig::builder()
            .library_dir(dir.path().join("library"))
            .database_path(dir.path().join("zotero.sqlite"))
            .webdav(WebDavSettings::new(
                "https://dav.example.org",
                "user",
                "secret",
            ))
            .build()
            .unwrap();

        let service = AttachmentService::initialize(config).unwrap();
        assert!(service.config().remote_enabled());
    }
}
