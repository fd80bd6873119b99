//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so the CLI works against a local backend with
//! no environment at all. Poll timing lives here too because the render
//! poller is the only long-running piece of the client.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 1200;
pub const DEFAULT_POLL_RETRY_LIMIT: u32 = 5;
pub const DEFAULT_POLL_BACKOFF_BASE_MS: u64 = 1000;
pub const DEFAULT_POLL_BACKOFF_MAX_MS: u64 = 30_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL: {0} (expected http:// or https://)")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Render polling cadence and failure budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between successful status polls.
    pub interval: Duration,
    /// Upper bound on status requests for a single render job.
    pub max_attempts: u32,
    /// Consecutive transient failures tolerated before giving up.
    pub retry_limit: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            retry_limit: DEFAULT_POLL_RETRY_LIMIT,
            backoff_base: Duration::from_millis(DEFAULT_POLL_BACKOFF_BASE_MS),
            backoff_max: Duration::from_millis(DEFAULT_POLL_BACKOFF_MAX_MS),
        }
    }
}

impl PollPolicy {
    /// Delay before the next attempt after `failures` consecutive transient
    /// failures (1-based). Doubles from `backoff_base`, capped at `backoff_max`.
    #[must_use]
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.backoff_base
            .saturating_mul(1_u32 << exponent)
            .min(self.backoff_max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub poll: PollPolicy,
    pub token_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `STONES_API_URL`: backend base URL, default `http://localhost:8000`
    /// - `STONES_REQUEST_TIMEOUT_SECS`: default 60
    /// - `STONES_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STONES_POLL_INTERVAL_MS`: default 3000
    /// - `STONES_POLL_MAX_ATTEMPTS`: default 1200
    /// - `STONES_POLL_RETRY_LIMIT`: default 5
    /// - `STONES_POLL_BACKOFF_BASE_MS` / `STONES_POLL_BACKOFF_MAX_MS`
    /// - `STONES_TOKEN_FILE`: default `$HOME/.stones/token`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("STONES_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse("STONES_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("STONES_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let poll = PollPolicy {
            interval: Duration::from_millis(env_parse("STONES_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)),
            max_attempts: env_parse("STONES_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS),
            retry_limit: env_parse("STONES_POLL_RETRY_LIMIT", DEFAULT_POLL_RETRY_LIMIT),
            backoff_base: Duration::from_millis(env_parse(
                "STONES_POLL_BACKOFF_BASE_MS",
                DEFAULT_POLL_BACKOFF_BASE_MS,
            )),
            backoff_max: Duration::from_millis(env_parse("STONES_POLL_BACKOFF_MAX_MS", DEFAULT_POLL_BACKOFF_MAX_MS)),
        };
        let token_file = std::env::var("STONES_TOKEN_FILE")
            .ok()
            .map(PathBuf::from)
            .or_else(default_token_file);

        Ok(Self { base_url, timeouts, poll, token_file })
    }

    /// Config pointing at `base_url` with default timings and no token file.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            poll: PollPolicy::default(),
            token_file: None,
        })
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for any other scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn default_token_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".stones").join("token"))
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
