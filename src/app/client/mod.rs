//! HTTP client for manifest retrieval and video transfers
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations
//! - `transfer`: Resume-aware file transfer with cancellation cleanup

use std::path::Path;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::errors::{DownloadResult, ManifestError, ManifestResult};

pub mod config;
pub mod http;
pub mod transfer;

pub use config::ClientConfig;
pub use transfer::{output_file_name, SkipReason, TransferHandler, TransferOutcome};

use http::HttpHandler;

/// HTTP client shared by the manifest fetch and all download workers
#[derive(Debug, Clone)]
pub struct AerialClient {
    http_handler: HttpHandler,
}

impl AerialClient {
    /// Creates a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if HTTP client creation fails
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!("Created HTTP client (user agent: {})", config.user_agent);

        Ok(Self {
            http_handler: HttpHandler::new(client).with_response_timeout(config.response_timeout),
        })
    }

    /// Fetch the manifest text at `url`
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Cancelled` if the token fires first,
    /// `ManifestError::Status` for a non-success response and
    /// `ManifestError::Fetch` for transport failures.
    pub async fn fetch_manifest(
        &self,
        url: &Url,
        token: &CancellationToken,
    ) -> ManifestResult<String> {
        if token.is_cancelled() {
            return Err(ManifestError::Cancelled);
        }

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ManifestError::Cancelled),
            fetched = self.http_handler.get_text(url) => fetched,
        };

        let (status, text) = fetched.map_err(|e| ManifestError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ManifestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::info!("Fetched manifest from {} ({} bytes)", url, text.len());
        Ok(text)
    }

    /// Transfer one video into `target_dir`
    ///
    /// See [`TransferHandler::transfer`].
    pub async fn transfer(
        &self,
        url: &Url,
        target_dir: &Path,
        overwrite: bool,
        token: &CancellationToken,
    ) -> DownloadResult<TransferOutcome> {
        TransferHandler::new(&self.http_handler)
            .transfer(url, target_dir, overwrite, token)
            .await
    }
}
