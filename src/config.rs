//! Configuration management for Aerial Fetcher
//!
//! Configuration is optional. When present it is read from TOML, with
//! precedence (lowest first):
//! 1. Default values
//! 2. Config file (`--config`, `./aerial-fetcher.toml`, or the user config dir)
//! 3. Environment variables
//! 4. CLI arguments (applied by the caller)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, SchedulerConfig, VideoQuality};
use crate::constants::{env, files, http, logging, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Download scheduler settings
    pub scheduler: SchedulerConfigToml,
    /// Defaults for the download command
    pub download: DownloadDefaultsToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// User agent override
    pub user_agent: Option<String>,
    /// TCP keep-alive interval (None = disabled)
    #[serde(with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout (None = no timeout)
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host
    pub pool_max_per_host: usize,
    /// Whole-request timeout (None = unbounded)
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Time allowed for response headers
    #[serde(with = "humantime_serde")]
    pub response_timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            user_agent: None,
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: None,
            connect_timeout: http::CONNECT_TIMEOUT,
            response_timeout: http::RESPONSE_TIMEOUT,
            max_redirects: http::MAX_REDIRECTS,
        }
    }
}

/// TOML-friendly scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfigToml {
    /// Maximum concurrent transfers; values of zero or less become 1
    pub max_degree_of_parallelism: i64,
    /// Channel buffer size for progress events
    pub progress_buffer_size: usize,
}

impl Default for SchedulerConfigToml {
    fn default() -> Self {
        Self {
            max_degree_of_parallelism: workers::DEFAULT_MAX_PARALLELISM as i64,
            progress_buffer_size: workers::PROGRESS_BUFFER_SIZE,
        }
    }
}

/// Defaults for the download command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadDefaultsToml {
    /// Quality names, e.g. `"SDR1080"` or `"AllSDR|HDR4K"`
    pub quality: String,
}

impl Default for DownloadDefaultsToml {
    fn default() -> Self {
        Self {
            quality: VideoQuality::SDR1080.to_string(),
        }
    }
}

impl DownloadDefaultsToml {
    /// Parse the configured quality
    pub fn quality(&self) -> ConfigResult<VideoQuality> {
        self.quality
            .parse()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "download.quality".to_string(),
                value: self.quality.clone(),
                reason,
            })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level
    pub fn level(&self) -> ConfigResult<tracing::Level> {
        self.level
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.level.clone(),
                reason: "Expected one of error, warn, info, debug, trace".to_string(),
            })
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, SchedulerConfig) {
        (
            self.client.to_runtime_config(),
            self.scheduler.to_runtime_config(),
        )
    }

    /// Check values that can be wrong independently of any run
    pub fn validate(&self) -> ConfigResult<()> {
        self.download.quality()?;
        self.logging.level()?;

        let (client, scheduler) = self.to_runtime_config();
        client.validate().map_err(|e| ConfigError::InvalidValue {
            field: "client".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;
        scheduler.validate().map_err(|e| ConfigError::InvalidValue {
            field: "scheduler".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Load configuration from the first available source
    ///
    /// An explicitly given file must exist; missing default files are not an
    /// error and yield the built-in defaults.
    pub async fn load(config_file_override: Option<&Path>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(user_agent) = std::env::var(env::USER_AGENT) {
            if !user_agent.trim().is_empty() {
                debug!("Using user agent from {}", env::USER_AGENT);
                self.client.user_agent = Some(user_agent);
            }
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Some(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        for path in search_paths {
            if path.is_file() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(files::CONFIG_DIR_NAME).join(files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| http::USER_AGENT.to_string()),
            tcp_keepalive: self.tcp_keepalive,
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout,
            pool_max_per_host: self.pool_max_per_host,
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            response_timeout: self.response_timeout,
            max_redirects: self.max_redirects,
        }
    }
}

impl SchedulerConfigToml {
    /// Convert to runtime SchedulerConfig
    pub fn to_runtime_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.max_degree_of_parallelism)
            .with_progress_buffer_size(self.progress_buffer_size)
    }
}
