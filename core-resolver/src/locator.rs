//! # Local Attachment Locator
//!
//! Depth-first search of the local library for a file by exact name.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Locates a file on local storage by its exact filename.
pub trait AttachmentLocator: Send + Sync {
    /// Full path of the first regular file under `root` named exactly
    /// `filename`, or `None`.
    fn find_by_filename(&self, root: &Path, filename: &str) -> Option<PathBuf>;
}

/// Filesystem-backed locator.
///
/// Matching is case-sensitive. On duplicate filenames anywhere in the tree
/// the result is whichever match directory read order reaches first, which is
/// not guaranteed deterministic across filesystems; callers must not depend
/// on which duplicate is returned. Unreadable directories are skipped and
/// their subtrees treated as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocator;

impl AttachmentLocator for FsLocator {
    fn find_by_filename(&self, root: &Path, filename: &str) -> Option<PathBuf> {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %root.display(), error = %e, "Skipping unreadable directory");
                return None;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(_) => continue,
            };
            if file_type.is_dir() {
                if let Some(found) = self.find_by_filename(&path, filename) {
                    return Some(found);
                }
            } else if file_type.is_file() && entry.file_name().to_str() == Some(filename) {
                return Some(path);
            }
        }
        None
    }
}
