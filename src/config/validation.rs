//! Configuration validation.
//!
//! Runs before any network activity so that a bad key or timeout fails at
//! construction instead of on the first request.

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;

use super::{Config, SecretString, ENV_API_KEY, ENV_BASE_URL, ENV_MAX_RETRIES, ENV_TIMEOUT_MS};
use crate::error::ConfigError;

/// Literal prefix every Moltgram API key starts with.
pub const API_KEY_PREFIX: &str = "moltgram_";

/// Minimum API key length in characters, prefix included.
pub const MIN_API_KEY_LENGTH: usize = 20;

/// Minimum allowed timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Maximum allowed timeout in milliseconds (5 minutes).
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Maximum allowed retry count.
pub const MAX_RETRIES: u32 = 10;

/// Validate an API key.
///
/// Empty keys are accepted and mean "no credential".
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the key lacks the
/// [`API_KEY_PREFIX`], is shorter than [`MIN_API_KEY_LENGTH`], or cannot be
/// sent in an `Authorization` header.
pub fn validate_api_key(key: &SecretString) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Ok(());
    }

    if !key.expose().starts_with(API_KEY_PREFIX) {
        return Err(ConfigError::InvalidValue {
            var: ENV_API_KEY.into(),
            reason: format!("must start with '{API_KEY_PREFIX}'"),
        });
    }

    if key.char_len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InvalidValue {
            var: ENV_API_KEY.into(),
            reason: format!("must be at least {MIN_API_KEY_LENGTH} characters"),
        });
    }

    if HeaderValue::from_str(&format!("Bearer {}", key.expose())).is_err() {
        return Err(ConfigError::InvalidValue {
            var: ENV_API_KEY.into(),
            reason: "contains characters not allowed in an HTTP header".into(),
        });
    }

    Ok(())
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `MOLTGRAM_API_KEY`, when set, must match the key format
/// - `MOLTGRAM_BASE_URL` must be an absolute http(s) URL
/// - `MOLTGRAM_TIMEOUT_MS` must be between 1 and 300000
/// - `MOLTGRAM_MAX_RETRIES` must be between 0 and 10
/// - static headers must be valid HTTP header names and values
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(key) = &config.api_key {
        validate_api_key(key)?;
    }

    match Url::parse(&config.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => {
            return Err(ConfigError::InvalidValue {
                var: ENV_BASE_URL.into(),
                reason: format!("'{}' is not an absolute http(s) URL", config.base_url),
            });
        }
    }

    if config.timeout_ms < MIN_TIMEOUT_MS || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::InvalidValue {
            var: ENV_TIMEOUT_MS.into(),
            reason: format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        });
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::InvalidValue {
            var: ENV_MAX_RETRIES.into(),
            reason: format!("must be between 0 and {MAX_RETRIES}"),
        });
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err()
            || HeaderValue::from_str(value).is_err()
        {
            return Err(ConfigError::InvalidValue {
                var: "headers".into(),
                reason: format!("'{name}' is not a valid HTTP header"),
            });
        }
    }

    Ok(())
}
