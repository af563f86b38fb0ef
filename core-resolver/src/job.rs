//! # Sync Job Reports
//!
//! Per-invocation summaries for the bulk attachment sync and database
//! snapshot sync. A report is created when the sync starts, accumulated
//! while it runs, and handed to the caller when it finishes; nothing is
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a sync invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncJobId(Uuid);

impl SyncJobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SyncJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SyncJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Kind
// ============================================================================

/// What a sync invocation transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    /// The bibliographic database snapshot.
    Database,
    /// A batch of attachment files.
    BulkAttachments,
}

impl SyncKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Database => "database",
            SyncKind::BulkAttachments => "bulkattachments",
        }
    }
}

impl FromStr for SyncKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "database" => Ok(SyncKind::Database),
            "bulkattachments" => Ok(SyncKind::BulkAttachments),
            _ => Err(format!("unknown sync kind: {}", s)),
        }
    }
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Report
// ============================================================================

/// Summary of one sync invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub id: SyncJobId,
    pub kind: SyncKind,
    /// Item cutoff supplied by the caller, if any.
    pub limit: Option<usize>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Items transferred successfully.
    pub succeeded: u64,
    /// Items that failed; one entry in `errors` each.
    pub failed: u64,
    /// Items already present locally and therefore not transferred.
    pub skipped: u64,
    /// Per-item failure messages, in the order the failures were observed.
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Start a new report.
    pub fn new(kind: SyncKind, limit: Option<usize>) -> Self {
        Self {
            id: SyncJobId::new(),
            kind,
            limit,
            started_at: Utc::now(),
            completed_at: None,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.failed += 1;
        self.errors.push(error.into());
    }

    /// Mark the report finished.
    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Total items the invocation looked at.
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed + self.skipped
    }
}

/// Result of a database snapshot sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
}

/// Connectivity report for the remote mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub enabled: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
