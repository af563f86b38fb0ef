//! # Core Configuration Module
//!
//! Provides configuration management for the Reference Library Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all settings the attachment resolution engine needs.
//! It enforces fail-fast validation so a misconfigured deployment is rejected
//! at startup rather than at the first resolution request.
//!
//! Remote sync is optional: when no [`WebDavSettings`] block is present the
//! engine runs in local-only mode and never touches the network.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, WebDavSettings};
//!
//! let config = CoreConfig::builder()
//!     .library_dir("/srv/library")
//!     .database_path("/srv/zotero/zotero.sqlite")
//!     .webdav(WebDavSettings::new(
//!         "https://cloud.example.org/remote.php/dav/files/me",
//!         "me",
//!         "secret",
//!     ))
//!     .build()?;
//! # Ok::<(), core_runtime::Error>(())
//! ```
//!
//! The process bootstrap layer owns the environment; [`CoreConfig::from_env`]
//! is the single place environment variables are read:
//!
//! | Variable            | Meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `LIBRARY_DIR`       | Local attachment library root (required)  |
//! | `LIBRARY_DB`        | Path to the bibliographic SQLite database |
//! | `WEBDAV_ENABLED`    | `true` to enable the remote mirror        |
//! | `WEBDAV_URL`        | Remote mirror base URL                    |
//! | `WEBDAV_USERNAME`   | Basic auth user                           |
//! | `WEBDAV_PASSWORD`   | Basic auth credential                     |

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default remote directory holding per-key attachment folders.
pub const DEFAULT_REMOTE_STORAGE_ROOT: &str = "/zotero/storage";

/// Default remote path of the bibliographic database snapshot.
pub const DEFAULT_REMOTE_DATABASE_PATH: &str = "/zotero/zotero.sqlite";

/// Default capacity of the in-memory resolution cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Connection settings for the remote WebDAV mirror.
///
/// Immutable for the lifetime of the engine; owned exclusively by the remote
/// sync client once the service is constructed.
#[derive(Debug, Clone)]
pub struct WebDavSettings {
    /// Base URL of the WebDAV endpoint (no trailing slash).
    pub base_url: String,

    /// Basic auth username.
    pub username: String,

    /// Basic auth credential.
    pub password: String,

    /// Remote directory holding `<KEY>/<filename>` attachment folders.
    pub storage_root: String,

    /// Remote path of the bibliographic database file.
    pub database_path: String,
}

impl WebDavSettings {
    /// Create settings with the default remote layout.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
            storage_root: DEFAULT_REMOTE_STORAGE_ROOT.to_string(),
            database_path: DEFAULT_REMOTE_DATABASE_PATH.to_string(),
        }
    }

    /// Override the remote storage root.
    pub fn storage_root(mut self, root: impl Into<String>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Override the remote database path.
    pub fn database_path(mut self, path: impl Into<String>) -> Self {
        self.database_path = path.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config(
                "WebDAV base URL must not be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "WebDAV base URL must be http(s), got: {}",
                self.base_url
            )));
        }
        if self.username.is_empty() {
            return Err(Error::Config(
                "WebDAV username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Core configuration for the attachment resolution engine.
///
/// Use [`CoreConfig::builder`] to construct instances; [`CoreConfigBuilder::build`]
/// validates all required settings.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Local attachment library root (the cache directory remote downloads
    /// land in and local lookups walk).
    pub library_dir: PathBuf,

    /// Path to the local copy of the bibliographic SQLite database.
    pub database_path: PathBuf,

    /// Capacity of the in-memory resolution cache.
    pub cache_capacity: usize,

    /// Remote mirror settings; `None` disables remote sync entirely.
    pub webdav: Option<WebDavSettings>,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Whether remote sync is enabled.
    pub fn remote_enabled(&self) -> bool {
        self.webdav.is_some()
    }

    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a required variable is missing or when
    /// `WEBDAV_ENABLED=true` without the corresponding connection variables.
    pub fn from_env() -> Result<Self> {
        let require = |name: &str| -> Result<String> {
            std::env::var(name)
                .map_err(|_| Error::Config(format!("environment variable {} is not set", name)))
        };

        let mut builder = Self::builder()
            .library_dir(require("LIBRARY_DIR")?)
            .database_path(require("LIBRARY_DB")?);

        if std::env::var("WEBDAV_ENABLED").as_deref() == Ok("true") {
            let mut webdav = WebDavSettings::new(
                require("WEBDAV_URL")?,
                require("WEBDAV_USERNAME")?,
                require("WEBDAV_PASSWORD")?,
            );
            if let Ok(root) = std::env::var("WEBDAV_STORAGE_ROOT") {
                webdav = webdav.storage_root(root);
            }
            if let Ok(path) = std::env::var("WEBDAV_DATABASE_PATH") {
                webdav = webdav.database_path(path);
            }
            builder = builder.webdav(webdav);
        }

        builder.build()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    library_dir: Option<PathBuf>,
    database_path: Option<PathBuf>,
    cache_capacity: Option<usize>,
    webdav: Option<WebDavSettings>,
}

impl CoreConfigBuilder {
    /// Set the local attachment library root (required).
    pub fn library_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.library_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the local bibliographic database path (required).
    pub fn database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the resolution cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Enable remote sync with the given settings.
    pub fn webdav(mut self, settings: WebDavSettings) -> Self {
        self.webdav = Some(settings);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` with an actionable message when a required
    /// setting is missing or invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let library_dir = self.library_dir.ok_or_else(|| {
            Error::Config("library_dir is required - set LIBRARY_DIR or call .library_dir()".into())
        })?;
        if library_dir.as_os_str().is_empty() {
            return Err(Error::Config("library_dir must not be empty".into()));
        }

        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("database_path is required - set LIBRARY_DB or call .database_path()".into())
        })?;

        let cache_capacity = self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY);
        if cache_capacity == 0 {
            return Err(Error::Config("cache_capacity must be greater than zero".into()));
        }

        if let Some(webdav) = &self.webdav {
            webdav.validate()?;
        }

        tracing::debug!(
            library_dir = %library_dir.display(),
            database_path = %database_path.display(),
            remote_enabled = self.webdav.is_some(),
            "Core configuration built"
        );

        Ok(CoreConfig {
            library_dir,
            database_path,
            cache_capacity,
            webdav: self.webdav,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let config = CoreConfig::builder()
            .library_dir("/tmp/library")
            .database_path("/tmp/zotero.sqlite")
            .build()
            .unwrap();

        assert_eq!(config.library_dir, PathBuf::from("/tmp/library"));
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(!config.remote_enabled());
    }

    #[test]
    fn test_builder_missing_library_dir() {
        let result = CoreConfig::builder().database_path("/tmp/db").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_zero_cache_capacity_rejected() {
        let result = CoreConfig::builder()
            .library_dir("/tmp/library")
            .database_path("/tmp/db")
            .cache_capacity(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_webdav_settings_trailing_slash_stripped() {
        let settings = WebDavSettings::new("https://dav.example.org/", "user", "pass");
        assert_eq!(settings.base_url, "https://dav.example.org");
        assert_eq!(settings.storage_root, DEFAULT_REMOTE_STORAGE_ROOT);
    }

    #[test]
    fn test_webdav_settings_rejects_non_http_url() {
        let config = CoreConfig::builder()
            .library_dir("/tmp/library")
            .database_path("/tmp/db")
            .webdav(WebDavSettings::new("ftp://dav.example.org", "user", "pass"))
            .build();
        assert!(config.is_err());
    }

    #[test]
    fn test_webdav_remote_layout_overrides() {
        let settings = WebDavSettings::new("https://dav.example.org", "user", "pass")
            .storage_root("/library/storage")
            .database_path("/library/refs.sqlite");

        assert_eq!(settings.storage_root, "/library/storage");
        assert_eq!(settings.database_path, "/library/refs.sqlite");
    }
}
