//! Download scheduler
//!
//! A bounded worker pool that drives per-URL transfers to completion.
//! Workers pull from a shared queue in submission order; completion order is
//! not guaranteed. Each item ends in exactly one [`DownloadOutcome`], and a
//! failure in one item never aborts another.
//!
//! # Module Organization
//!
//! - [`config`] - Scheduler configuration and parallelism normalization
//! - [`types`] - Outcomes, progress events and the aggregate run result
//! - [`core`] - Individual worker and the shared work queue
//! - [`pool`] - The scheduler that owns the workers for one run
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aerial_fetcher::app::client::AerialClient;
//! use aerial_fetcher::app::worker::{DownloadBatch, DownloadScheduler, SchedulerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(AerialClient::new()?);
//! let scheduler = DownloadScheduler::new(SchedulerConfig::new(4), client)?;
//!
//! let batch = DownloadBatch::new(vec!["https://example.com/a.mov".to_string()], "/tmp/videos");
//! let result = scheduler.run(batch, &CancellationToken::new(), None).await;
//! println!("{} completed, any failure: {}", result.completed, result.any_failure);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod pool;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{normalize_parallelism, SchedulerConfig};
pub use self::core::{DownloadWorker, WorkQueue};
pub use pool::{DownloadBatch, DownloadScheduler};
pub use types::{DownloadOutcome, ItemReport, ProgressEvent, RunResult, WorkerResult};
