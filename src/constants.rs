//! Application constants for Aerial Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Overrides the HTTP user agent sent with every request
    pub const USER_AGENT: &str = "AERIAL_FETCHER_USER_AGENT";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("Aerial-Fetcher/", env!("CARGO_PKG_VERSION"));

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Time allowed for a server to send response headers
    pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(100);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 8;

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;
}

/// Manifest schema constants
pub mod manifest {
    /// Asset type that marks a legacy entry as a downloadable video
    pub const LEGACY_VIDEO_TYPE: &str = "video";

    /// Legacy time-of-day literal for daytime footage
    pub const TIME_OF_DAY_DAY: &str = "day";

    /// Legacy time-of-day literal for night footage
    pub const TIME_OF_DAY_NIGHT: &str = "night";

    /// The only versioned manifest format this tool understands
    pub const SUPPORTED_VERSION: i64 = 1;

    /// Versioned field names, one per quality tier
    pub const URL_1080_SDR: &str = "url-1080-SDR";
    pub const URL_1080_HDR: &str = "url-1080-HDR";
    pub const URL_4K_SDR: &str = "url-4K-SDR";
    pub const URL_4K_HDR: &str = "url-4K-HDR";

    /// Placeholders used by the composite video label
    pub const NO_LABEL: &str = "<No Label>";
    pub const NO_TIME_OF_DAY: &str = "<No Time of Day>";
    pub const NO_ID: &str = "<No Id>";
}

/// File operation constants
pub mod files {
    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "aerial-fetcher.toml";

    /// Directory under the user config dir holding our configuration
    pub const CONFIG_DIR_NAME: &str = "aerial-fetcher";

    /// Configuration file name inside [`CONFIG_DIR_NAME`]
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Worker and concurrency configuration
pub mod workers {
    /// Default maximum number of concurrent transfers
    pub const DEFAULT_MAX_PARALLELISM: usize = 1;

    /// Channel buffer size for progress events
    pub const PROGRESS_BUFFER_SIZE: usize = 100;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Target used in the tracing filter directive
    pub const LOG_TARGET: &str = "aerial_fetcher";
}

pub use http::USER_AGENT;
pub use workers::DEFAULT_MAX_PARALLELISM;
