//! Command-line argument parsing for Aerial Fetcher
//!
//! This module defines the CLI structure using clap derive macros. Values
//! given here override the optional configuration file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::app::VideoQuality;

/// Aerial Fetcher - Download aerial screensaver videos
#[derive(Parser, Debug)]
#[command(
    name = "aerial_fetcher",
    version,
    about = "Download aerial screensaver videos listed in a JSON manifest",
    long_about = "Fetches a manifest of aerial videos, selects the download URLs matching the requested
qualities and downloads them into a local directory. Files already present with the same
length are skipped, so interrupted runs can simply be restarted."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the videos listed in a manifest
    Download(DownloadArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Absolute URL of the JSON manifest
    #[arg(long, value_name = "URL")]
    pub json_url: Url,

    /// Existing directory to download into
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Re-check files that already exist instead of skipping them
    #[arg(short, long)]
    pub force: bool,

    /// Maximum number of concurrent downloads (values below 1 mean 1)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_degree_of_parallelism: Option<i64>,

    /// Qualities to download, e.g. "SDR1080", "AllHDR" or "SDR4K|HDR4K"
    #[arg(long, value_name = "QUALITY")]
    pub quality: Option<VideoQuality>,

    /// List the selected URLs without downloading anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level requested by the verbosity flags
    ///
    /// Returns `None` when no flag was given, leaving the choice to the
    /// configuration file.
    pub fn requested_log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        self.requested_log_level().unwrap_or(tracing::Level::WARN)
    }
}
