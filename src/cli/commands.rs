//! Command handlers for Aerial Fetcher CLI
//!
//! This module implements the command handlers that turn CLI arguments and
//! configuration into a [`DownloadRequest`] and drive the [`Coordinator`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::{
    AerialClient, Coordinator, DownloadPlan, DownloadRequest, RunOutcome, SignalHandler,
};
use crate::cli::progress::{print_summary, ProgressReporter};
use crate::cli::DownloadArgs;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Printed when an interrupt signal is received
pub const INTERRUPT_NOTICE: &str =
    "CTRL+C pressed, waiting for pending actions and downloads to finish...";

/// Printed when a run ends because of cancellation
pub const CANCELLED_MESSAGE: &str = "The operation was cancelled.";

/// Handle the download command
///
/// Returns the process exit code: 0 when nothing failed (including runs
/// with nothing to download and cancelled runs), 1 when at least one item
/// failed.
pub async fn handle_download(args: DownloadArgs, config: &AppConfig, quiet: bool) -> Result<i32> {
    let request = build_request(&args, config)?;
    request.validate()?;

    let (client_config, mut scheduler_config) = config.to_runtime_config();
    if let Some(parallelism) = args.max_degree_of_parallelism {
        scheduler_config = scheduler_config.with_max_parallelism(parallelism);
    }
    info!(
        "Downloading {} into {} (quality {}, {} parallel, overwrite {})",
        request.json_url,
        request.output_dir.display(),
        request.quality,
        scheduler_config.max_parallelism,
        request.overwrite
    );

    let client = Arc::new(AerialClient::with_config(client_config)?);
    let coordinator = Coordinator::new(client, scheduler_config);

    let token = CancellationToken::new();
    let signal_handle = SignalHandler::new(token.clone())
        .with_notice(INTERRUPT_NOTICE)
        .setup();

    let result = run_download(&coordinator, &request, &args, &token, quiet).await;

    signal_handle.abort();

    match result {
        Err(e) if e.is_cancelled() => {
            println!("{}", CANCELLED_MESSAGE);
            Ok(0)
        }
        other => other,
    }
}

/// Plan the run, then either list or download the selected URLs
async fn run_download(
    coordinator: &Coordinator,
    request: &DownloadRequest,
    args: &DownloadArgs,
    token: &CancellationToken,
    quiet: bool,
) -> Result<i32> {
    let plan = coordinator
        .plan(&request.json_url, request.quality, token)
        .await?;
    debug!("Manifest statistics: {:?}", plan.manifest_stats);

    if plan.selection.is_empty() {
        println!("{}", no_videos_message(&request.json_url));
        return Ok(0);
    }

    if args.dry_run {
        print_dry_run(&plan);
        return Ok(0);
    }

    let total = plan.selection.len();
    let (progress_tx, progress_rx) =
        tokio::sync::mpsc::channel(coordinator.scheduler_config().progress_buffer_size);
    let display = tokio::spawn(ProgressReporter::new(total, !quiet).consume(progress_rx));

    let outcome = coordinator
        .execute(plan, request, token, Some(progress_tx))
        .await?;

    // The scheduler has dropped every sender once execute returns
    if let Err(e) = display.await {
        debug!("Progress display task ended abnormally: {}", e);
    }

    match outcome {
        RunOutcome::NoMatchingVideos { .. } => {
            println!("{}", no_videos_message(&request.json_url));
            Ok(0)
        }
        RunOutcome::Finished(result) => {
            if result.cancelled {
                println!("{}", CANCELLED_MESSAGE);
                return Ok(0);
            }

            if !quiet {
                print_summary(&result);
            }
            Ok(result.exit_code())
        }
    }
}

/// Merge CLI arguments over the configured defaults
fn build_request(args: &DownloadArgs, config: &AppConfig) -> Result<DownloadRequest> {
    let quality = match args.quality {
        Some(quality) => quality,
        None => config.download.quality()?,
    };

    Ok(DownloadRequest::new(args.json_url.clone(), resolve_output_dir(&args.output)?)
        .with_overwrite(args.force)
        .with_quality(quality))
}

/// Resolve a relative output directory against the working directory
fn resolve_output_dir(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().map_err(AppError::Io)?;
    Ok(cwd.join(path))
}

fn no_videos_message(json_url: &url::Url) -> String {
    format!(
        "The JSON file at '{}' does not contain any videos (either not at all or not matching the quality parameter)",
        json_url
    )
}

fn print_dry_run(plan: &DownloadPlan) {
    println!(
        "Dry run - would download {} files ({} of {} candidates from {} videos):",
        plan.selection.len(),
        plan.selection.matched_candidates,
        plan.selection.total_candidates,
        plan.videos.len()
    );
    for (i, url) in plan.selection.urls.iter().enumerate() {
        println!("  {}. {}", i + 1, url);
    }
}
