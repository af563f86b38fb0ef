//! Data model for bibliographic attachment records.

use serde::{Deserialize, Serialize};

/// A single attachment row from the bibliographic store, as needed by the
/// resolution engine and bulk sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// 8-character uppercase alphanumeric storage key of the owning item.
    pub storage_key: String,

    /// Attachment filename (basename, no directory components).
    pub filename: String,
}

impl AttachmentRecord {
    /// Build a record from an item key and the raw `path` column value.
    ///
    /// The store records paths either as `storage:<filename>` or as a legacy
    /// absolute path; in both cases the filename is the final segment.
    pub fn from_row(storage_key: String, raw_path: &str) -> Self {
        let stripped = raw_path.strip_prefix("storage:").unwrap_or(raw_path);
        let filename = stripped
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(stripped)
            .to_string();
        Self {
            storage_key,
            filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_row_storage_prefix() {
        let record = AttachmentRecord::from_row("ABCD1234".to_string(), "storage:paper.pdf");
        assert_eq!(record.storage_key, "ABCD1234");
        assert_eq!(record.filename, "paper.pdf");
    }

    #[test]
    fn test_from_row_legacy_absolute_path() {
        let record =
            AttachmentRecord::from_row("ABCD1234".to_string(), "/home/user/Library/old/paper.pdf");
        assert_eq!(record.filename, "paper.pdf");
    }

    #[test]
    fn test_from_row_windows_separator() {
        let record =
            AttachmentRecord::from_row("ABCD1234".to_string(), "C:\\Library\\old\\paper.pdf");
        assert_eq!(record.filename, "paper.pdf");
    }
}
