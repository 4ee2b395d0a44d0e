//! Error types for Aerial Fetcher
//!
//! This module defines the error types for all components of the application.
//! Errors are split by concern (download, manifest, configuration) and wrapped
//! by [`AppError`] at the application boundary.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Download and HTTP client errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error during file operations
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Server returned error status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Server accepted the request but sent no response headers in time
    #[error("No response from {url} within {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// The operation was cancelled before it could finish
    #[error("The operation was cancelled")]
    Cancelled,

    /// A download unit terminated abnormally
    #[error("Download task for {url} terminated unexpectedly: {reason}")]
    TaskAborted { url: String, reason: String },

    /// Invalid scheduler or client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl DownloadError {
    /// Check whether this error represents cooperative cancellation rather than a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}

/// Manifest fetching and parsing errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest could not be fetched
    #[error("Failed to fetch manifest from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Manifest endpoint returned a non-success status
    #[error("Manifest request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Manifest fetch was cancelled
    #[error("Manifest fetch was cancelled")]
    Cancelled,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Output directory missing
    #[error("Output directory ({path}) must exist")]
    OutputDirectoryMissing { path: PathBuf },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Download error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is a cancellation that should be reported as benign
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            AppError::Download(DownloadError::Cancelled) | AppError::Manifest(ManifestError::Cancelled)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Download(_) => "download",
            AppError::Manifest(_) => "manifest",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
