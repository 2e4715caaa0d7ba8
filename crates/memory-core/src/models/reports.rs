use serde::{Deserialize, Serialize};

/// Outcome of ingesting a single file, returned by `Ingestor::ingest_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestAction {
    Created,
    Updated,
    Skipped,
    Quarantined,
}

/// Result of ingesting one file, including the reason when quarantined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub action: IngestAction,
    pub memory_id: Option<String>,
    pub reason: Option<String>,
}

impl IngestOutcome {
    pub fn created(memory_id: impl Into<String>) -> Self {
        Self { action: IngestAction::Created, memory_id: Some(memory_id.into()), reason: None }
    }

    pub fn updated(memory_id: impl Into<String>) -> Self {
        Self { action: IngestAction::Updated, memory_id: Some(memory_id.into()), reason: None }
    }

    pub fn skipped(memory_id: impl Into<String>) -> Self {
        Self { action: IngestAction::Skipped, memory_id: Some(memory_id.into()), reason: None }
    }

    pub fn quarantined(reason: impl Into<String>) -> Self {
        Self { action: IngestAction::Quarantined, memory_id: None, reason: Some(reason.into()) }
    }
}

/// Aggregate report of a full directory scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub total_files: usize,
    pub ingested: usize,
    pub updated: usize,
    pub skipped: usize,
    pub quarantined: usize,
    pub errors: Vec<String>,
}

/// Read-only comparison between DB rows and on-disk files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub orphaned_files: Vec<String>,
    pub missing_files: Vec<String>,
    pub content_mismatches: Vec<String>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_files.is_empty()
            && self.missing_files.is_empty()
            && self.content_mismatches.is_empty()
    }
}
