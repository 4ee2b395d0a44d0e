//! Scheduler type definitions
//!
//! Per-item outcomes, the progress events streamed to the caller, and the
//! aggregate [`RunResult`] reduced from all item reports once the pool has
//! finished.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::app::client::{SkipReason, TransferOutcome};
use crate::errors::{DownloadError, DownloadResult};

/// Result type for worker operations
pub type WorkerResult<T> = DownloadResult<T>;

/// Terminal outcome of one submitted URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Nothing was downloaded
    Skipped(SkipReason),
    /// The file was written
    Completed { bytes: u64 },
    /// The transfer failed; siblings are unaffected
    Failed(String),
    /// The transfer was cancelled or never started because of cancellation
    Cancelled,
}

impl DownloadOutcome {
    /// Classify the result of a transfer
    pub fn from_transfer(result: DownloadResult<TransferOutcome>) -> Self {
        match result {
            Ok(TransferOutcome::Skipped(reason)) => DownloadOutcome::Skipped(reason),
            Ok(TransferOutcome::Completed { bytes }) => DownloadOutcome::Completed { bytes },
            Err(e) if e.is_cancellation() => DownloadOutcome::Cancelled,
            Err(e) => DownloadOutcome::Failed(e.to_string()),
        }
    }

    /// Build a failed outcome from an error
    pub fn failed(error: &DownloadError) -> Self {
        DownloadOutcome::Failed(error.to_string())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DownloadOutcome::Failed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadOutcome::Cancelled)
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            DownloadOutcome::Completed { bytes } => write!(f, "completed ({} bytes)", bytes),
            DownloadOutcome::Failed(message) => write!(f, "failed: {}", message),
            DownloadOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Outcome of one URL together with where and how long it ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// The submitted URL
    pub url: String,
    /// Worker that processed the item; `None` if it was never started
    pub worker_id: Option<u32>,
    /// Terminal outcome
    pub outcome: DownloadOutcome,
    /// Time spent on the item
    pub elapsed: Duration,
}

impl ItemReport {
    /// Report for a queued item abandoned because of cancellation
    pub fn abandoned(url: String) -> Self {
        Self {
            url,
            worker_id: None,
            outcome: DownloadOutcome::Cancelled,
            elapsed: Duration::ZERO,
        }
    }

    /// Check whether a worker started this item
    pub fn was_started(&self) -> bool {
        self.worker_id.is_some()
    }
}

/// Per-item notification streamed while the scheduler runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Completed { url: String, bytes: u64 },
    Skipped { url: String, reason: SkipReason },
    Failed { url: String, message: String },
    Cancelled { url: String },
}

impl ProgressEvent {
    pub fn url(&self) -> &str {
        match self {
            ProgressEvent::Completed { url, .. }
            | ProgressEvent::Skipped { url, .. }
            | ProgressEvent::Failed { url, .. }
            | ProgressEvent::Cancelled { url } => url,
        }
    }
}

impl From<&ItemReport> for ProgressEvent {
    fn from(report: &ItemReport) -> Self {
        let url = report.url.clone();
        match &report.outcome {
            DownloadOutcome::Completed { bytes } => ProgressEvent::Completed { url, bytes: *bytes },
            DownloadOutcome::Skipped(reason) => ProgressEvent::Skipped {
                url,
                reason: *reason,
            },
            DownloadOutcome::Failed(message) => ProgressEvent::Failed {
                url,
                message: message.clone(),
            },
            DownloadOutcome::Cancelled => ProgressEvent::Cancelled { url },
        }
    }
}

/// Aggregate result of a scheduler run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// True iff at least one item failed
    pub any_failure: bool,
    /// Items submitted to the scheduler
    pub submitted: usize,
    /// Items a worker actually started
    pub attempted: usize,
    /// Items downloaded
    pub completed: usize,
    /// Items skipped
    pub skipped: usize,
    /// Items failed
    pub failed: usize,
    /// Items cancelled in flight or abandoned in the queue
    pub cancelled_items: usize,
    /// Bytes written across all completed items
    pub bytes_downloaded: u64,
    /// Whether the run was cancelled
    pub cancelled: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Every item report, in completion order
    pub reports: Vec<ItemReport>,
}

impl RunResult {
    /// Reduce item reports into the aggregate result
    pub fn from_reports(
        submitted: usize,
        reports: Vec<ItemReport>,
        cancelled: bool,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        let mut result = Self {
            any_failure: false,
            submitted,
            attempted: 0,
            completed: 0,
            skipped: 0,
            failed: 0,
            cancelled_items: 0,
            bytes_downloaded: 0,
            cancelled,
            started_at,
            duration,
            reports: Vec::new(),
        };

        for report in &reports {
            if report.was_started() {
                result.attempted += 1;
            }
            match &report.outcome {
                DownloadOutcome::Completed { bytes } => {
                    result.completed += 1;
                    result.bytes_downloaded += bytes;
                }
                DownloadOutcome::Skipped(_) => result.skipped += 1,
                DownloadOutcome::Failed(_) => result.failed += 1,
                DownloadOutcome::Cancelled => result.cancelled_items += 1,
            }
        }

        result.any_failure = result.failed > 0;
        result.reports = reports;
        result
    }

    /// Failed items as `(url, message)` pairs
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reports.iter().filter_map(|report| match &report.outcome {
            DownloadOutcome::Failed(message) => Some((report.url.as_str(), message.as_str())),
            _ => None,
        })
    }

    /// Process exit code: 0 when nothing failed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.any_failure {
            1
        } else {
            0
        }
    }
}
