//! Core HTTP operations
//!
//! Thin wrapper over a shared `reqwest::Client`. There is no retry or rate
//! limiting: a failed request is reported to the caller and never repeated.
//! Every request must deliver its response headers within the response
//! timeout; streaming the body afterwards is not limited.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::constants::http;
use crate::errors::{DownloadError, DownloadResult};

/// Response headers of a body-less probe request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// HTTP status of the probe
    pub status: StatusCode,
    /// Advertised content length, if the server sent one
    pub content_length: Option<u64>,
}

impl Probe {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
    response_timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            response_timeout: http::RESPONSE_TIMEOUT,
        }
    }

    /// Set how long a server may take to send response headers
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Fetches the HTTP response without checking its status
    ///
    /// The body is not read; callers can stream it with `bytes_stream()`.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Timeout` if no headers arrive within the
    /// response timeout.
    pub async fn get_response(&self, url: &Url) -> DownloadResult<Response> {
        let send = self.client.get(url.as_str()).send();
        let response = tokio::time::timeout(self.response_timeout, send)
            .await
            .map_err(|_| DownloadError::Timeout {
                url: url.to_string(),
                timeout: self.response_timeout,
            })??;
        tracing::debug!("Received HTTP {} from {}", response.status(), url);
        Ok(response)
    }

    /// Request `url` and read only the response headers
    ///
    /// The response is dropped before its body is consumed, so no content is
    /// transferred beyond what the connection already buffered.
    pub async fn probe(&self, url: &Url) -> DownloadResult<Probe> {
        let response = self.get_response(url).await?;
        let probe = Probe {
            status: response.status(),
            content_length: response.content_length(),
        };
        drop(response);

        tracing::trace!(
            "Probed {}: status {}, length {:?}",
            url,
            probe.status,
            probe.content_length
        );
        Ok(probe)
    }

    /// Fetches the body of `url` as text, with status checking left to the caller
    pub async fn get_text(&self, url: &Url) -> DownloadResult<(StatusCode, String)> {
        let response = self.get_response(url).await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}
