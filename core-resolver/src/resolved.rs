//! Resolution result record, serialized for the route layer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a successful resolution came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    /// Previously resolved and still present on disk.
    Cache,
    /// Found by walking the local library.
    LocalDisk,
    /// Fetched from the remote mirror during this resolution.
    Remote,
}

/// The uniform resolution result handed to the caller.
///
/// When `found` is `false` all path fields are absent and `message` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    pub found: bool,

    pub filename: String,

    /// Path relative to the library root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_path: Option<String>,

    /// URL path the web layer serves the file under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_path: Option<String>,

    /// Absolute path on local storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResolutionSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResolvedFile {
    /// Build a successful result from an absolute path under the library
    /// root. The relative/web path derivation cannot fail for paths the
    /// engine produced itself; a path from outside the root degrades to its
    /// full form rather than erroring.
    pub fn found_at(
        filename: impl Into<String>,
        full_path: PathBuf,
        library_root: &Path,
        source: ResolutionSource,
    ) -> Self {
        let relative = full_path
            .strip_prefix(library_root)
            .unwrap_or(&full_path)
            .to_string_lossy()
            .replace('\\', "/");
        Self {
            found: true,
            filename: filename.into(),
            web_path: Some(format!("/library/{}", relative)),
            relative_path: Some(relative),
            full_path: Some(full_path),
            source: Some(source),
            message: None,
        }
    }

    /// Build a not-found result with an explanatory message.
    pub fn not_found(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            found: false,
            filename: filename.into(),
            relative_path: None,
            web_path: None,
            full_path: None,
            source: None,
            message: Some(message.into()),
        }
    }

    /// HTTP status a route layer serves this result with.
    pub fn http_status(&self) -> u16 {
        if self.found {
            200
        } else {
            404
        }
    }
}
