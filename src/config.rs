use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_STATE_DIR: &str = ".compass";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const LOG_FILE: &str = "compass-quiz.log";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Url,
    pub state_dir: PathBuf,
    pub timeout: Duration,
    /// Default tracing level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    pub fn new(
        api_url: &str,
        state_dir: impl Into<PathBuf>,
        timeout_secs: u64,
        log_level: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            url: api_url.to_string(),
            reason,
        };
        let parsed = Url::parse(api_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            api_url: parsed,
            state_dir: state_dir.into(),
            timeout: Duration::from_secs(timeout_secs),
            log_level: log_level.into(),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE)
    }
}
