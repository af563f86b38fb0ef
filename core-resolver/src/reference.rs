//! # Attachment Reference Parsing
//!
//! Normalises the three reference notations the library accepts into a
//! canonical [`AttachmentReference`]:
//!
//! - `storage:<KEY>/<filename>` (the reference manager's own notation)
//! - `attachments:<KEY>/<filename>` (linked-attachment notation)
//! - a bare path, either `KEY/filename` or a legacy absolute filesystem path
//!
//! Parsing never fails: an un-parseable input degrades to a reference whose
//! filename is the raw input and whose storage key is absent, and the
//! resolution simply reports not-found downstream.

use serde::{Deserialize, Serialize};

const STORAGE_PREFIX: &str = "storage:";
const ATTACHMENTS_PREFIX: &str = "attachments:";

/// Which notation the raw input used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// Bare path, possibly a pre-storage-key absolute filesystem path.
    Legacy,
    /// Explicit `storage:` prefix.
    StorageKey,
    /// Explicit `attachments:` prefix.
    AttachmentsKey,
}

/// A parsed attachment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentReference {
    /// The reference exactly as received.
    pub raw_input: String,

    /// Notation the input used.
    pub notation: Notation,

    /// 8-character uppercase alphanumeric storage key, when one could be
    /// derived from the input itself. May be filled in later from the
    /// metadata store.
    pub storage_key: Option<String>,

    /// Basename of the referenced file.
    pub filename: String,
}

impl AttachmentReference {
    /// Parse a raw reference string.
    pub fn parse(raw_input: &str) -> Self {
        let (notation, stripped) = if let Some(rest) = raw_input.strip_prefix(STORAGE_PREFIX) {
            (Notation::StorageKey, rest)
        } else if let Some(rest) = raw_input.strip_prefix(ATTACHMENTS_PREFIX) {
            (Notation::AttachmentsKey, rest)
        } else {
            (Notation::Legacy, raw_input)
        };

        let filename = match stripped.rsplit(['/', '\\']).next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => raw_input.to_string(),
        };

        let storage_key = stripped
            .split(['/', '\\'])
            .find(|segment| is_storage_key(segment))
            .map(str::to_string);

        Self {
            raw_input: raw_input.to_string(),
            notation,
            storage_key,
            filename,
        }
    }
}

/// Absolute filesystem path in either Unix or Windows notation.
pub fn is_absolute_path(raw: &str) -> bool {
    if raw.starts_with('/') || raw.starts_with('\\') {
        return true;
    }
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

/// Exactly 8 characters, each an uppercase ASCII letter or digit.
pub fn is_storage_key(segment: &str) -> bool {
    segment.len() == 8
        && segment
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_notations_extract_identical_pair() {
        for raw in [
            "storage:ABCD1234/file.pdf",
            "attachments:ABCD1234/file.pdf",
            "ABCD1234/file.pdf",
        ] {
            let reference = AttachmentReference::parse(raw);
            assert_eq!(
                reference.storage_key.as_deref(),
                Some("ABCD1234"),
                "failed for {raw}"
            );
            assert_eq!(reference.filename, "file.pdf", "failed for {raw}");
        }
    }

    #[test]
    fn test_notation_recorded() {
        assert_eq!(
            AttachmentReference::parse("storage:ABCD1234/file.pdf").notation,
            Notation::StorageKey
        );
        assert_eq!(
            AttachmentReference::parse("attachments:ABCD1234/file.pdf").notation,
            Notation::AttachmentsKey
        );
        assert_eq!(
            AttachmentReference::parse("ABCD1234/file.pdf").notation,
            Notation::Legacy
        );
    }

    #[test]
    fn test_legacy_path_without_token_has_no_key() {
        let reference =
            AttachmentReference::parse("/home/user/Documents/Library/old papers/thesis.pdf");
        assert_eq!(reference.notation, Notation::Legacy);
        assert_eq!(reference.storage_key, None);
        assert_eq!(reference.filename, "thesis.pdf");
    }

    #[test]
    fn test_legacy_path_with_embedded_key() {
        let reference = AttachmentReference::parse("/data/storage/WXYZ9876/paper.pdf");
        assert_eq!(reference.storage_key.as_deref(), Some("WXYZ9876"));
    }

    #[test]
    fn test_first_token_wins() {
        let reference = AttachmentReference::parse("AAAA1111/BBBB2222/file.pdf");
        assert_eq!(reference.storage_key.as_deref(), Some("AAAA1111"));
    }

    #[test]
    fn test_storage_prefix_without_key() {
        let reference = AttachmentReference::parse("storage:file.pdf");
        assert_eq!(reference.notation, Notation::StorageKey);
        assert_eq!(reference.storage_key, None);
        assert_eq!(reference.filename, "file.pdf");
    }

    #[test]
    fn test_unparseable_input_degrades() {
        let reference = AttachmentReference::parse("///");
        assert_eq!(reference.filename, "///");
        assert_eq!(reference.storage_key, None);
    }

    #[test]
    fn test_is_absolute_path() {
        assert!(is_absolute_path("/home/user/thesis.pdf"));
        assert!(is_absolute_path("C:\\Library\\thesis.pdf"));
        assert!(is_absolute_path("c:/Library/thesis.pdf"));
        assert!(!is_absolute_path("thesis.pdf"));
        assert!(!is_absolute_path("old/thesis.pdf"));
        assert!(!is_absolute_path("ABCD1234/thesis.pdf"));
    }

    #[test]
    fn test_is_storage_key() {
        assert!(is_storage_key("ABCD1234"));
        assert!(is_storage_key("AAAAAAAA"));
        assert!(is_storage_key("12345678"));
        assert!(!is_storage_key("abcd1234")); // lowercase
        assert!(!is_storage_key("ABCD123")); // too short
        assert!(!is_storage_key("ABCD12345")); // too long
        assert!(!is_storage_key("ABCD-234")); // punctuation
    }
}
