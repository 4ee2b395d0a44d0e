//! Core application logic for Aerial Fetcher
//!
//! This module contains the download pipeline: manifest parsing into the
//! normalized video model, quality-based URL selection, the HTTP client with
//! resume-aware transfers, the bounded worker pool, and the coordinator that
//! ties them together.
//!
//! # Examples
//!
//! ```rust
//! use aerial_fetcher::app::{parse_manifest, select_urls, VideoQuality};
//!
//! let json = r#"{"version":1,"assets":[{"id":"v1","accessibilityLabel":"L","url-4K-HDR":"https://x/b.mov"}]}"#;
//! let videos = parse_manifest(json);
//!
//! assert_eq!(select_urls(&videos, VideoQuality::HDR4K).urls, vec!["https://x/b.mov"]);
//! assert!(select_urls(&videos, VideoQuality::SDR1080).is_empty());
//! ```

pub mod client;
pub mod coordinator;
pub mod manifest;
pub mod models;
pub mod selector;
pub mod worker;

// Re-export main public API
pub use client::{AerialClient, ClientConfig, SkipReason, TransferOutcome};
pub use coordinator::{Coordinator, DownloadPlan, DownloadRequest, RunOutcome, SignalHandler};
pub use manifest::{parse_manifest, ManifestFormat, ManifestParser, ManifestStats, ParseAttempt};
pub use models::{DownloadCandidate, TimeOfDay, VideoAsset, VideoQuality};
pub use selector::{select_urls, UrlSelection};
pub use worker::{
    DownloadBatch, DownloadOutcome, DownloadScheduler, ItemReport, ProgressEvent, RunResult,
    SchedulerConfig,
};
