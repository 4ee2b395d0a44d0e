//! Download orchestration
//!
//! The coordinator wires the pipeline together: fetch the manifest, parse it,
//! select the URLs for the requested quality, and hand them to the
//! [`DownloadScheduler`]. Manifest problems degrade to "zero matching
//! videos"; only cancellation and configuration problems surface as errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aerial_fetcher::app::client::AerialClient;
//! use aerial_fetcher::app::coordinator::{Coordinator, DownloadRequest, RunOutcome};
//! use aerial_fetcher::app::models::VideoQuality;
//! use aerial_fetcher::app::worker::SchedulerConfig;
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(AerialClient::new()?);
//! let coordinator = Coordinator::new(client, SchedulerConfig::new(4));
//!
//! let request = DownloadRequest::new(
//!     Url::parse("https://example.com/entries.json")?,
//!     "/tmp/videos",
//! )
//! .with_quality(VideoQuality::ALL_SDR);
//!
//! match coordinator.run(&request, &CancellationToken::new(), None).await? {
//!     RunOutcome::NoMatchingVideos { .. } => println!("nothing to do"),
//!     RunOutcome::Finished(result) => println!("exit code {}", result.exit_code()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod signals;


use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::client::AerialClient;
use crate::app::manifest::{ManifestParser, ManifestStats};
use crate::app::models::{VideoAsset, VideoQuality};
use crate::app::selector::{select_urls, UrlSelection};
use crate::app::worker::{
    DownloadBatch, DownloadScheduler, ProgressEvent, RunResult, SchedulerConfig,
};
use crate::errors::{AppError, ConfigError, ConfigResult, ManifestError, Result};

pub use signals::SignalHandler;

/// Fully validated input for one run
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Absolute manifest URL
    pub json_url: Url,
    /// Existing output directory
    pub output_dir: PathBuf,
    /// Re-check existing files instead of skipping them
    pub overwrite: bool,
    /// Requested quality set
    pub quality: VideoQuality,
}

impl DownloadRequest {
    pub fn new(json_url: Url, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            json_url,
            output_dir: output_dir.into(),
            overwrite: false,
            quality: VideoQuality::SDR1080,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_quality(mut self, quality: VideoQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Check that the output directory exists and the quality is non-empty
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.output_dir.is_dir() {
            return Err(ConfigError::OutputDirectoryMissing {
                path: self.output_dir.clone(),
            });
        }

        if self.quality.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "quality".to_string(),
                value: self.quality.to_string(),
                reason: "At least one quality must be requested".to_string(),
            });
        }

        Ok(())
    }
}

/// Videos and URLs selected for a request
#[derive(Debug, Clone, Default)]
pub struct DownloadPlan {
    /// Parsed videos in display order
    pub videos: Vec<VideoAsset>,
    /// URLs matching the requested quality
    pub selection: UrlSelection,
    /// Parser statistics
    pub manifest_stats: ManifestStats,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing matched the requested quality; not an error
    NoMatchingVideos { videos: usize },
    /// The scheduler ran the selected URLs
    Finished(RunResult),
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::NoMatchingVideos { .. } => 0,
            RunOutcome::Finished(result) => result.exit_code(),
        }
    }
}

/// Main coordinator for orchestrating a run
pub struct Coordinator {
    client: Arc<AerialClient>,
    scheduler_config: SchedulerConfig,
}

impl Coordinator {
    /// Create a new coordinator
    pub fn new(client: Arc<AerialClient>, scheduler_config: SchedulerConfig) -> Self {
        Self {
            client,
            scheduler_config,
        }
    }

    /// Fetch and parse the manifest, then select the URLs for `quality`
    ///
    /// # Errors
    ///
    /// Only cancellation is an error; an unreachable or unrecognized manifest
    /// yields an empty plan.
    pub async fn plan(
        &self,
        json_url: &Url,
        quality: VideoQuality,
        token: &CancellationToken,
    ) -> Result<DownloadPlan> {
        let text = match self.client.fetch_manifest(json_url, token).await {
            Ok(text) => text,
            Err(ManifestError::Cancelled) => {
                return Err(AppError::Manifest(ManifestError::Cancelled))
            }
            Err(e) => {
                warn!("{}; continuing with an empty manifest", e);
                String::new()
            }
        };

        let mut parser = ManifestParser::new();
        let videos = parser.parse(&text);
        let selection = select_urls(&videos, quality);

        for video in &videos {
            debug!("Found video: {}", video);
        }
        info!(
            "Manifest lists {} videos, {} urls match quality {}",
            videos.len(),
            selection.len(),
            quality
        );

        Ok(DownloadPlan {
            videos,
            selection,
            manifest_stats: parser.stats().clone(),
        })
    }

    /// Run the complete pipeline for `request`
    ///
    /// Progress events for each finished item are sent to `progress_tx` if
    /// given.
    pub async fn run(
        &self,
        request: &DownloadRequest,
        token: &CancellationToken,
        progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<RunOutcome> {
        let plan = self.plan(&request.json_url, request.quality, token).await?;
        self.execute(plan, request, token, progress_tx).await
    }

    /// Download the URLs of an already computed plan
    pub async fn execute(
        &self,
        plan: DownloadPlan,
        request: &DownloadRequest,
        token: &CancellationToken,
        progress_tx: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<RunOutcome> {
        if plan.selection.is_empty() {
            return Ok(RunOutcome::NoMatchingVideos {
                videos: plan.videos.len(),
            });
        }

        let scheduler =
            DownloadScheduler::new(self.scheduler_config.clone(), Arc::clone(&self.client))?;
        let batch = DownloadBatch::new(plan.selection.urls, request.output_dir.clone())
            .with_overwrite(request.overwrite);

        let result = scheduler.run(batch, token, progress_tx).await;
        Ok(RunOutcome::Finished(result))
    }

    pub fn scheduler_config(&self) -> &SchedulerConfig {
        &self.scheduler_config
    }
}
