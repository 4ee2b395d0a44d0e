//! Bounded-parallelism download scheduler
//!
//! The scheduler starts up to `max_parallelism` workers over a shared queue,
//! waits for all of them, then reduces the collected item reports into a
//! [`RunResult`]. URLs still queued when cancellation is observed are
//! reported as cancelled without being started.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SchedulerConfig;
use super::core::{DownloadWorker, WorkQueue, WorkerContext};
use super::types::{ItemReport, ProgressEvent, RunResult, WorkerResult};
use crate::app::client::AerialClient;

/// A set of URLs to download into one directory
#[derive(Debug, Clone)]
pub struct DownloadBatch {
    /// URLs in submission order
    pub urls: Vec<String>,
    /// Existing output directory
    pub target_dir: PathBuf,
    /// Re-check files that already exist instead of skipping them
    pub overwrite: bool,
}

impl DownloadBatch {
    pub fn new(urls: Vec<String>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            urls,
            target_dir: target_dir.into(),
            overwrite: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Drives a batch of downloads with bounded parallelism
#[derive(Debug, Clone)]
pub struct DownloadScheduler {
    config: SchedulerConfig,
    client: Arc<AerialClient>,
}

impl DownloadScheduler {
    /// Create a scheduler, validating its configuration
    pub fn new(config: SchedulerConfig, client: Arc<AerialClient>) -> WorkerResult<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Create a progress channel sized from the configuration
    pub fn progress_channel(&self) -> (mpsc::Sender<ProgressEvent>, mpsc::Receiver<ProgressEvent>) {
        mpsc::channel(self.config.progress_buffer_size)
    }

    /// Run every URL of `batch` to a terminal outcome
    ///
    /// Failures of individual items never abort their siblings. The returned
    /// result reports `any_failure` iff at least one item failed.
    pub async fn run(
        &self,
        batch: DownloadBatch,
        token: &CancellationToken,
        progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    ) -> RunResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let submitted = batch.urls.len();
        let worker_count = self.config.max_parallelism.max(1).min(submitted);

        info!(
            "Downloading {} urls into {} with {} workers",
            submitted,
            batch.target_dir.display(),
            worker_count
        );

        let queue = Arc::new(WorkQueue::new(batch.urls));
        let context = WorkerContext {
            client: Arc::clone(&self.client),
            queue: Arc::clone(&queue),
            target_dir: Arc::new(batch.target_dir),
            overwrite: batch.overwrite,
            token: token.clone(),
        };

        let (results_tx, mut results_rx) = mpsc::unbounded_channel();
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let worker = DownloadWorker::new(
                worker_id as u32,
                context.clone(),
                results_tx.clone(),
                progress_tx.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }
        drop(results_tx);

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Download worker terminated abnormally: {}", e);
            }
        }

        let mut reports = Vec::with_capacity(submitted);
        while let Some(report) = results_rx.recv().await {
            reports.push(report);
        }

        let abandoned = queue.drain().await;
        if !abandoned.is_empty() {
            debug!("Abandoning {} queued urls", abandoned.len());
        }
        for url in abandoned {
            let report = ItemReport::abandoned(url);
            if let Some(progress_tx) = &progress_tx {
                let _ = progress_tx.send(ProgressEvent::from(&report)).await;
            }
            reports.push(report);
        }

        let result = RunResult::from_reports(
            submitted,
            reports,
            token.is_cancelled(),
            started_at,
            start.elapsed(),
        );

        info!(
            "Run started at {} finished in {:.1}s: {} completed, {} skipped, {} failed, {} cancelled",
            result.started_at.to_rfc3339(),
            result.duration.as_secs_f64(),
            result.completed,
            result.skipped,
            result.failed,
            result.cancelled_items
        );

        result
    }
}
