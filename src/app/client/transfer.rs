//! Resume-aware single file transfer
//!
//! Decides whether a video needs downloading and, if so, streams it straight
//! into the target directory. The resume heuristic compares byte lengths only:
//! a local file whose length equals the advertised remote length is treated as
//! complete. Cancellation is observed before each network call, before the
//! output file is opened and before every chunk is written. A transfer that
//! is cancelled or fails while streaming removes its partial file.

use std::fmt;
use std::future::Future;
use std::path::Path;

use futures::StreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::errors::{DownloadError, DownloadResult};

/// Why a transfer did not download anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The URL has no usable file name
    InvalidUrl,
    /// The file exists and overwriting is disabled
    AlreadyExists,
    /// The probe request returned a non-success status
    Unavailable { status: u16 },
    /// The local file already has the remote length
    SameLength { bytes: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidUrl => f.write_str("not a file url"),
            SkipReason::AlreadyExists => f.write_str("file already exists"),
            SkipReason::Unavailable { status } => write!(f, "unavailable (HTTP {})", status),
            SkipReason::SameLength { bytes } => write!(f, "already complete ({} bytes)", bytes),
        }
    }
}

/// Successful result of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    Skipped(SkipReason),
    Completed { bytes: u64 },
}

/// Derive the output file name from the final path segment of `url`
///
/// Returns `None` when there is no segment or it denotes a directory.
pub fn output_file_name(url: &Url) -> Option<String> {
    let path = url.path();
    if path.ends_with(['/', '\\']) {
        return None;
    }

    let name = url.path_segments()?.last()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(name.to_string())
}

/// Resume-aware transfer of single files
pub struct TransferHandler<'a> {
    http_handler: &'a HttpHandler,
}

impl<'a> TransferHandler<'a> {
    /// Creates a new TransferHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Transfer `url` into `target_dir` unless it is already present
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the video
    /// * `target_dir` - Existing directory to write into
    /// * `overwrite` - Re-check files that already exist instead of skipping them
    /// * `token` - Cancellation token observed at every checkpoint
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Cancelled` if cancelled. Network failures, a
    /// non-success status on the full request, and I/O failures are returned
    /// as the corresponding error. Any partial file is deleted first.
    pub async fn transfer(
        &self,
        url: &Url,
        target_dir: &Path,
        overwrite: bool,
        token: &CancellationToken,
    ) -> DownloadResult<TransferOutcome> {
        let Some(file_name) = output_file_name(url) else {
            trace!("Ignoring url without a file name: {}", url);
            return Ok(TransferOutcome::Skipped(SkipReason::InvalidUrl));
        };
        let destination = target_dir.join(&file_name);

        let local_length = local_length(&destination).await;
        if local_length.is_some() && !overwrite {
            debug!("Skipping existing file: {}", destination.display());
            return Ok(TransferOutcome::Skipped(SkipReason::AlreadyExists));
        }

        checkpoint(token)?;
        let probe = cancellable(token, self.http_handler.probe(url)).await?;
        if !probe.is_success() {
            debug!("Skipping {}: probe returned HTTP {}", url, probe.status);
            return Ok(TransferOutcome::Skipped(SkipReason::Unavailable {
                status: probe.status.as_u16(),
            }));
        }

        if let (Some(local), Some(remote)) = (local_length, probe.content_length) {
            if local == remote {
                debug!(
                    "Skipping {}: local file already has {} bytes",
                    destination.display(),
                    local
                );
                return Ok(TransferOutcome::Skipped(SkipReason::SameLength { bytes: local }));
            }
        }

        checkpoint(token)?;
        let response = cancellable(token, self.http_handler.get_response(url)).await?;
        if !response.status().is_success() {
            return Err(DownloadError::ServerError {
                status: response.status().as_u16(),
            });
        }

        checkpoint(token)?;
        let mut file = File::create(&destination).await?;
        match stream_to_file(response, &mut file, token).await {
            Ok(bytes) => {
                debug!("Downloaded {} ({} bytes)", destination.display(), bytes);
                Ok(TransferOutcome::Completed { bytes })
            }
            Err(e) => {
                // A truncated file would later pass the existence check
                drop(file);
                remove_partial(&destination).await;
                Err(e)
            }
        }
    }
}

/// Length of an existing regular file at `path`
async fn local_length(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        _ => None,
    }
}

/// Fail with `Cancelled` once the token has been triggered
fn checkpoint(token: &CancellationToken) -> DownloadResult<()> {
    if token.is_cancelled() {
        Err(DownloadError::Cancelled)
    } else {
        Ok(())
    }
}

/// Race `future` against cancellation
async fn cancellable<T>(
    token: &CancellationToken,
    future: impl Future<Output = DownloadResult<T>>,
) -> DownloadResult<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(DownloadError::Cancelled),
        result = future => result,
    }
}

/// Copy the response body into `file`, returning the number of bytes written
async fn stream_to_file(
    response: Response,
    file: &mut File,
    token: &CancellationToken,
) -> DownloadResult<u64> {
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        checkpoint(token)?;
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(DownloadError::Cancelled),
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = next else {
            break;
        };
        let chunk = chunk?;

        checkpoint(token)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Best-effort removal of a partially written file
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial file {}: {}", path.display(), e),
    }
}
