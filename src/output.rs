//! Result types returned by the page pipeline and the job driver.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// What one run of [`crate::convert::PageConverter::convert`] did.
///
/// Page failures do not turn a conversion into an error; they are listed in
/// `failures` so the gap between `total_pages` and `uploaded.len()` is visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Prefix every output key was derived from.
    pub prefix: String,
    /// Number of pages in the source document.
    pub total_pages: usize,
    /// Output keys that were stored, in page order.
    pub uploaded: Vec<String>,
    /// Per-page failures, in page order.
    pub failures: Vec<PageError>,
    /// Wall-clock time from first dispatch to the final join.
    pub duration_ms: u64,
}

impl ConversionSummary {
    pub fn processed_pages(&self) -> usize {
        self.uploaded.len()
    }

    pub fn failed_pages(&self) -> usize {
        self.failures.len()
    }

    /// `true` when every page produced an image.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.uploaded.len() == self.total_pages
    }
}

/// Terminal state of one trigger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    /// The document was opened and every page was attempted.
    Converted(ConversionSummary),
    /// The record was not a source document and was left alone.
    Skipped { reason: String },
    /// A job-level error stopped the record before any page was attempted.
    Failed { error: String },
}

/// Outcome for one trigger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub bucket: String,
    pub key: String,
    #[serde(flatten)]
    pub status: RecordStatus,
}

/// Outcome of handling one trigger event, one entry per record in event order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub records: Vec<RecordOutcome>,
}

impl JobOutcome {
    pub fn converted(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.status, RecordStatus::Converted(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.status, RecordStatus::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.status, RecordStatus::Skipped { .. }))
            .count()
    }

    /// Pages that failed across every converted record.
    pub fn failed_pages(&self) -> usize {
        self.records
            .iter()
            .map(|r| match &r.status {
                RecordStatus::Converted(s) => s.failed_pages(),
                _ => 0,
            })
            .sum()
    }
}
