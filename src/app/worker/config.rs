//! Scheduler configuration
//!
//! The requested parallelism comes from user input and may be zero or
//! negative; it is normalized to at least one worker.

use serde::{Deserialize, Serialize};

use crate::constants::workers;
use crate::errors::{DownloadError, DownloadResult};

/// Configuration for the download scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of concurrent transfers (always at least 1)
    pub max_parallelism: usize,
    /// Channel buffer size for progress events
    pub progress_buffer_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_parallelism: workers::DEFAULT_MAX_PARALLELISM,
            progress_buffer_size: workers::PROGRESS_BUFFER_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration from a requested parallelism
    pub fn new(requested_parallelism: i64) -> Self {
        Self::default().with_max_parallelism(requested_parallelism)
    }

    /// Set the maximum parallelism; values of zero or less become 1
    pub fn with_max_parallelism(mut self, requested: i64) -> Self {
        self.max_parallelism = normalize_parallelism(requested);
        self
    }

    /// Set the progress channel buffer size
    pub fn with_progress_buffer_size(mut self, size: usize) -> Self {
        self.progress_buffer_size = size;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> DownloadResult<()> {
        if self.max_parallelism == 0 {
            return Err(DownloadError::ConfigurationError(
                "Maximum parallelism cannot be zero".to_string(),
            ));
        }

        if self.progress_buffer_size == 0 {
            return Err(DownloadError::ConfigurationError(
                "Progress buffer size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Coerce a requested degree of parallelism to a usable worker count
pub fn normalize_parallelism(requested: i64) -> usize {
    if requested <= 0 {
        1
    } else {
        usize::try_from(requested).unwrap_or(usize::MAX)
    }
}
