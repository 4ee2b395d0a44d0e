//! Core download worker implementation
//!
//! Workers pull URLs from a shared queue until it is empty or the run is
//! cancelled. Each URL runs as its own task so a panic inside a transfer is
//! contained to that item, and every item yields exactly one [`ItemReport`].

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::types::{DownloadOutcome, ItemReport, ProgressEvent};
use crate::app::client::AerialClient;
use crate::errors::DownloadError;

/// Shared queue of URLs waiting for a worker
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<String>>,
}

impl WorkQueue {
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        Self {
            items: Mutex::new(urls.into_iter().collect()),
        }
    }

    /// Take the next URL in submission order
    pub async fn next(&self) -> Option<String> {
        self.items.lock().await.pop_front()
    }

    /// Remove every URL still waiting
    pub async fn drain(&self) -> Vec<String> {
        self.items.lock().await.drain(..).collect()
    }
}

/// Settings shared by all workers of one run
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub client: Arc<AerialClient>,
    pub queue: Arc<WorkQueue>,
    pub target_dir: Arc<PathBuf>,
    pub overwrite: bool,
    pub token: CancellationToken,
}

/// Individual download worker
#[derive(Debug)]
pub struct DownloadWorker {
    /// Unique worker identifier
    id: u32,
    context: WorkerContext,
    /// Item reports, reduced by the scheduler after the pool finishes
    results_tx: mpsc::UnboundedSender<ItemReport>,
    /// Optional progress channel for the caller
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl DownloadWorker {
    /// Create a new download worker
    pub fn new(
        id: u32,
        context: WorkerContext,
        results_tx: mpsc::UnboundedSender<ItemReport>,
        progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Self {
        Self {
            id,
            context,
            results_tx,
            progress_tx,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Start the worker loop
    pub async fn run(self) {
        debug!("Worker {} starting", self.id);

        loop {
            if self.context.token.is_cancelled() {
                debug!("Worker {} observed cancellation", self.id);
                break;
            }

            let Some(url) = self.context.queue.next().await else {
                break;
            };

            let report = self.process(url).await;
            self.report(report).await;
        }

        debug!("Worker {} finished", self.id);
    }

    /// Run one unit of work to a terminal outcome
    async fn process(&self, url: String) -> ItemReport {
        let start = Instant::now();
        debug!("Worker {} processing {}", self.id, url);

        let outcome = match Url::parse(&url) {
            Ok(parsed) => self.spawn_transfer(parsed).await,
            Err(e) => DownloadOutcome::failed(&DownloadError::InvalidUrl {
                url: url.clone(),
                error: e.to_string(),
            }),
        };

        match &outcome {
            DownloadOutcome::Failed(message) => {
                debug!("Worker {} failed {}: {}", self.id, url, message)
            }
            other => debug!("Worker {} {}: {}", self.id, url, other),
        }

        ItemReport {
            url,
            worker_id: Some(self.id),
            outcome,
            elapsed: start.elapsed(),
        }
    }

    /// Run the transfer on its own task and classify how it ended
    async fn spawn_transfer(&self, url: Url) -> DownloadOutcome {
        let client = Arc::clone(&self.context.client);
        let target_dir = Arc::clone(&self.context.target_dir);
        let overwrite = self.context.overwrite;
        let token = self.context.token.clone();
        let url_text = url.to_string();

        let handle = tokio::spawn(async move {
            client.transfer(&url, &target_dir, overwrite, &token).await
        });

        match handle.await {
            Ok(result) => DownloadOutcome::from_transfer(result),
            Err(e) => DownloadOutcome::failed(&DownloadError::TaskAborted {
                url: url_text,
                reason: e.to_string(),
            }),
        }
    }

    /// Publish a finished item to the scheduler and the progress channel
    async fn report(&self, report: ItemReport) {
        if let Some(progress_tx) = &self.progress_tx {
            // A closed receiver only means nobody renders progress
            let _ = progress_tx.send(ProgressEvent::from(&report)).await;
        }

        if self.results_tx.send(report).is_err() {
            debug!("Worker {} result receiver dropped", self.id);
        }
    }
}
