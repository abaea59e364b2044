//! Configuration types for zeit-archive-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Name of the log file written under the base path
pub const LOG_FILE_NAME: &str = "zeit-archive-downloader.log";

/// Main configuration for one archive run
///
/// The CLI fills `auth_cookie`, `base_path`, `years` and `sources`; the remaining
/// sections are tuning knobs that may come from a TOML file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Cookie header value sent with every request
    #[serde(default)]
    pub auth_cookie: String,

    /// Root directory for downloaded files and the log file (required)
    #[serde(default)]
    pub base_path: PathBuf,

    /// Year tokens to restrict the run to (empty = all years)
    #[serde(default)]
    pub years: Vec<String>,

    /// Which source categories to mirror
    #[serde(default)]
    pub sources: SourceToggles,

    /// HTTP client settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry behavior for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Site endpoints
    #[serde(default)]
    pub endpoints: SourceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_cookie: String::new(),
            base_path: PathBuf::new(),
            years: Vec::new(),
            sources: SourceToggles::default(),
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            endpoints: SourceConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a TOML file
    ///
    /// Missing keys take their defaults, so a file containing only `[retry]`
    /// settings is valid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file '{}': {}", path.display(), e),
            key: None,
        })
    }

    /// Check the settings a run cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.auth_cookie.trim().is_empty() {
            return Err(Error::Config {
                message: "auth cookie must not be empty".to_string(),
                key: Some("auth_cookie".to_string()),
            });
        }
        if self.base_path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "base path must be set".to_string(),
                key: Some("base_path".to_string()),
            });
        }
        if self.fetch.chunk_size == 0 {
            return Err(Error::Config {
                message: "chunk size must be at least 1".to_string(),
                key: Some("fetch.chunk_size".to_string()),
            });
        }
        Ok(())
    }

    /// Path of the log file for this run
    pub fn log_file(&self) -> PathBuf {
        self.base_path.join(LOG_FILE_NAME)
    }
}

/// Feature toggles for the two source categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToggles {
    /// Mirror audio episodes (default: true)
    #[serde(default = "default_true")]
    pub audio: bool,

    /// Mirror e-paper issues (default: true)
    #[serde(default = "default_true")]
    pub epaper: bool,
}

impl Default for SourceToggles {
    fn default() -> Self {
        Self {
            audio: true,
            epaper: true,
        }
    }
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Number of requests fetched concurrently per batch (default: 100)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Time allowed for connecting and receiving response headers (default: 600 seconds)
    ///
    /// Reading the body has no deadline.
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Site endpoints
///
/// Overridable so a run can be pointed at a mirror or a local mock server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Origin of the audio archive listing
    #[serde(default = "default_audio_base_url")]
    pub audio_base_url: String,

    /// Origin of the e-paper archive
    #[serde(default = "default_epaper_base_url")]
    pub epaper_base_url: String,

    /// URL prefix identifying audio asset links on any page
    #[serde(default = "default_asset_host_prefix")]
    pub asset_host_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            audio_base_url: default_audio_base_url(),
            epaper_base_url: default_epaper_base_url(),
            asset_host_prefix: default_asset_host_prefix(),
        }
    }
}

impl SourceConfig {
    /// Point every endpoint at a single origin (audio assets under `/media/`)
    pub fn with_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            audio_base_url: origin.to_string(),
            epaper_base_url: origin.to_string(),
            asset_host_prefix: format!("{}/media/", origin),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    100
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_user_agent() -> String {
    format!("zeit-archive-dl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_audio_base_url() -> String {
    "https://premium.zeit.de".to_string()
}

fn default_epaper_base_url() -> String {
    "https://epaper.zeit.de".to_string()
}

fn default_asset_host_prefix() -> String {
    "https://media-delivery.zeit.de/".to_string()
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
