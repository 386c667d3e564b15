//! Configuration types for webpage-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Download behavior configuration (content location, concurrency, timeouts)
///
/// Groups settings consumed by the fetcher and the batch coordinator.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Directory where fetched page bodies are stored (default: "./downloads")
    #[serde(default = "default_content_dir")]
    #[schema(value_type = String)]
    pub content_dir: PathBuf,

    /// Maximum concurrent fetches within one batch (default: 4)
    ///
    /// The limit applies per batch call; two simultaneous batches each get
    /// their own budget.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,

    /// Per-attempt HTTP timeout (default: 20 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            max_concurrent_downloads: default_max_concurrent(),
            timeout: default_timeout(),
        }
    }
}

/// Retry configuration for transient fetch failures
///
/// The delay before retry `n` (1-based) is
/// `initial_delay * backoff_multiplier^(n-1)`, capped at `max_delay`.
/// With the defaults this yields 2s, 4s, 8s.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Number of retries after the first attempt (default: 3, i.e. up to 4 attempts)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// SQLite database path (default: "./webpage-dl.db")
    #[serde(default = "default_database_path")]
    #[schema(value_type = String)]
    pub database_path: PathBuf,

    /// Persist the body of every downloaded page into the database (default: true)
    #[serde(default = "default_true")]
    pub record_downloaded_content: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            record_downloaded_content: true,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind the API server to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser clients (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

/// Server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for [`WebPageDownloader`](crate::WebPageDownloader)
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior (content location, concurrency, timeout)
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retry and backoff behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Persistence settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// API server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Directory where fetched page bodies are stored
    pub fn content_dir(&self) -> &PathBuf {
        &self.download.content_dir
    }

    /// Check configuration values that serde defaults cannot guard
    pub fn validate(&self) -> crate::Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(crate::Error::Config {
                message: "max_concurrent_downloads must be at least 1".to_string(),
                key: Some("download.max_concurrent_downloads".to_string()),
            });
        }
        if self.download.timeout.is_zero() {
            return Err(crate::Error::Config {
                message: "timeout must be greater than zero".to_string(),
                key: Some("download.timeout".to_string()),
            });
        }
        if !(self.retry.backoff_multiplier >= 1.0) {
            return Err(crate::Error::Config {
                message: "backoff_multiplier must be >= 1.0".to_string(),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }
        Ok(())
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_concurrent() -> usize {
    4
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./webpage-dl.db")
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
