//! Configuration management.
//!
//! This module handles:
//! - Client configuration with defaults and builder methods
//! - Environment variable loading
//! - Configuration validation
//! - Secure API key storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use moltgram::config::{validate_config, Config};
//!
//! let config = Config::new()
//!     .with_api_key("moltgram_sk_0123456789abcdef")
//!     .with_timeout_ms(10_000)
//!     .with_max_retries(2);
//!
//! assert!(validate_config(&config).is_ok());
//! // API key is protected from accidental logging
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("0123456789abcdef"));
//! ```

#![allow(clippy::missing_const_for_fn)]

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{
    validate_api_key, validate_config, API_KEY_PREFIX, MAX_RETRIES, MAX_TIMEOUT_MS,
    MIN_API_KEY_LENGTH, MIN_TIMEOUT_MS,
};

use std::time::Duration;

use crate::error::ConfigError;

/// Default base URL for the Moltgram API.
pub const DEFAULT_BASE_URL: &str = "https://www.moltgram.com/api/v1";
/// Default timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default maximum retries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base retry delay in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// Default cap on the exponential backoff delay in milliseconds.
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 30_000;
/// Default wait when a 429 response does not say how long to wait.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "MOLTGRAM_API_KEY";
/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "MOLTGRAM_BASE_URL";
/// Environment variable overriding the request timeout.
pub const ENV_TIMEOUT_MS: &str = "MOLTGRAM_TIMEOUT_MS";
/// Environment variable overriding the retry count.
pub const ENV_MAX_RETRIES: &str = "MOLTGRAM_MAX_RETRIES";
/// Environment variable overriding the base retry delay.
pub const ENV_RETRY_DELAY_MS: &str = "MOLTGRAM_RETRY_DELAY_MS";
/// Environment variable overriding the backoff cap.
pub const ENV_MAX_RETRY_DELAY_MS: &str = "MOLTGRAM_MAX_RETRY_DELAY_MS";
/// Environment variable overriding the 429 fallback wait.
pub const ENV_DEFAULT_RETRY_AFTER_SECS: &str = "MOLTGRAM_DEFAULT_RETRY_AFTER_SECS";

/// Client configuration.
///
/// Consumed once when a [`crate::RequestExecutor`] is built and immutable
/// afterwards. The credential may be absent so that agent registration can
/// run before a key exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API key (protected from logging via [`SecretString`]).
    pub api_key: Option<SecretString>,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout in milliseconds, per attempt.
    pub timeout_ms: u64,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base retry delay in milliseconds; doubled on each retry.
    pub retry_delay_ms: u64,
    /// Upper bound for the exponential backoff delay in milliseconds.
    pub max_retry_delay_ms: u64,
    /// Wait used when a 429 carries no retry-after information.
    pub default_retry_after_secs: u64,
    /// Headers sent with every request.
    pub headers: Vec<(String, String)>,
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set maximum retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base retry delay in milliseconds.
    #[must_use]
    pub const fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the backoff cap in milliseconds.
    #[must_use]
    pub const fn with_max_retry_delay_ms(mut self, max_retry_delay_ms: u64) -> Self {
        self.max_retry_delay_ms = max_retry_delay_ms;
        self
    }

    /// Set the fallback wait for 429 responses without retry-after data.
    #[must_use]
    pub const fn with_default_retry_after_secs(mut self, secs: u64) -> Self {
        self.default_retry_after_secs = secs;
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// Optional environment variables (with defaults):
    /// - `MOLTGRAM_API_KEY`: API key (default: none, registration only)
    /// - `MOLTGRAM_BASE_URL`: API base URL (default: [`DEFAULT_BASE_URL`])
    /// - `MOLTGRAM_TIMEOUT_MS`: per-attempt timeout (default: `30000`)
    /// - `MOLTGRAM_MAX_RETRIES`: retries after the first attempt (default: `3`)
    /// - `MOLTGRAM_RETRY_DELAY_MS`: base backoff delay (default: `1000`)
    /// - `MOLTGRAM_MAX_RETRY_DELAY_MS`: backoff cap (default: `30000`)
    /// - `MOLTGRAM_DEFAULT_RETRY_AFTER_SECS`: wait after a 429 that names
    ///   none (default: `60`)
    ///
    /// The API key is trimmed, so a trailing newline from a secrets file is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse as a
    /// non-negative integer or the result fails [`validate_config`].
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(SecretString::new);

        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let config = Self {
            api_key,
            base_url,
            timeout_ms: parse_env_u64(ENV_TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_env_u32(ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
            retry_delay_ms: parse_env_u64(ENV_RETRY_DELAY_MS, DEFAULT_RETRY_DELAY_MS)?,
            max_retry_delay_ms: parse_env_u64(ENV_MAX_RETRY_DELAY_MS, DEFAULT_MAX_RETRY_DELAY_MS)?,
            default_retry_after_secs: parse_env_u64(
                ENV_DEFAULT_RETRY_AFTER_SECS,
                DEFAULT_RETRY_AFTER_SECS,
            )?,
            ..Self::default()
        };

        validate_config(&config)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
            default_retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            headers: Vec::new(),
        }
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a non-negative integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a non-negative integer".into(),
        })
    })
}
