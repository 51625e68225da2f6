//! Error types for the Moltgram client.
//!
//! This module defines a closed error taxonomy:
//! - [`MoltgramError`]: every failure an API call can surface
//! - [`ErrorDetails`]: the payload shared by all kinds (message, status, code, hint)
//! - [`ErrorKind`]: a fieldless discriminant for matching and logging
//! - [`ConfigError`]: configuration loading and validation failures
//!
//! Service failures are mapped from HTTP status and body by [`mapper`].
//! All errors implement `Send + Sync + Clone` for async compatibility.

pub mod mapper;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use mapper::{map_error, ServiceErrorBody};

/// Machine code for authentication failures.
pub const CODE_UNAUTHORIZED: &str = "UNAUTHORIZED";
/// Machine code for permission failures.
pub const CODE_FORBIDDEN: &str = "FORBIDDEN";
/// Machine code for missing resources.
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
/// Machine code for rejected input.
pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";
/// Machine code for rate limiting.
pub const CODE_RATE_LIMITED: &str = "RATE_LIMITED";
/// Machine code for conflicts.
pub const CODE_CONFLICT: &str = "CONFLICT";
/// Machine code for transport failures.
pub const CODE_NETWORK: &str = "NETWORK_ERROR";
/// Machine code for deadline expiry.
pub const CODE_TIMEOUT: &str = "TIMEOUT";
/// Machine code for invalid client configuration.
pub const CODE_CONFIGURATION: &str = "CONFIGURATION_ERROR";
/// Machine code for a request that could not be built.
pub const CODE_INVALID_REQUEST: &str = "INVALID_REQUEST";
/// Machine code for a success response that could not be decoded.
pub const CODE_INVALID_RESPONSE: &str = "INVALID_RESPONSE";
/// Machine code for any other service error.
pub const CODE_API_ERROR: &str = "API_ERROR";

/// Payload shared by every error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
    /// Human readable message.
    pub message: String,
    /// HTTP status code, `0` for failures where no response was received.
    pub status: u16,
    /// Machine readable code.
    pub code: Option<String>,
    /// Suggestion suitable for display to the user.
    pub hint: Option<String>,
}

impl ErrorDetails {
    /// Create details with a message and status.
    #[must_use]
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            code: None,
            hint: None,
        }
    }

    /// Set the machine code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

/// Discriminant of [`MoltgramError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 401.
    Authentication,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 400.
    Validation,
    /// 429.
    RateLimited,
    /// 409.
    Conflict,
    /// The endpoint could not be reached.
    Network,
    /// No response within the configured timeout.
    Timeout,
    /// Client-side configuration or request construction problem.
    Configuration,
    /// Any other status.
    Generic,
}

/// Errors returned by the Moltgram client.
///
/// The executor never panics on expected failures; it returns one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoltgramError {
    /// Credential missing or rejected.
    #[error("Authentication failed: {0}")]
    Authentication(ErrorDetails),

    /// Credential valid but not allowed to perform the action.
    #[error("Forbidden: {0}")]
    Forbidden(ErrorDetails),

    /// Resource does not exist.
    #[error("Not found: {0}")]
    NotFound(ErrorDetails),

    /// The service rejected the request payload.
    #[error("Validation failed: {0}")]
    Validation(ErrorDetails),

    /// Request was rate limited.
    #[error("Rate limited: {details} (retry after {retry_after_seconds}s)")]
    RateLimited {
        /// Shared payload.
        details: ErrorDetails,
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
        /// When the quota window resets.
        reset_at: DateTime<Utc>,
    },

    /// The request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(ErrorDetails),

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(ErrorDetails),

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(ErrorDetails),

    /// Invalid client configuration. Never produced from a response.
    #[error("Configuration error: {0}")]
    Configuration(ErrorDetails),

    /// Any other service failure.
    #[error("API error ({status}): {0}", status = .0.status)]
    Generic(ErrorDetails),
}

impl MoltgramError {
    /// Build a network error for a failure that produced no response.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(
            ErrorDetails::new(message, 0)
                .with_code(CODE_NETWORK)
                .with_hint("Check your connection and the configured base URL."),
        )
    }

    /// Build a timeout error.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout(
            ErrorDetails::new(format!("no response within {timeout_ms}ms"), 0)
                .with_code(CODE_TIMEOUT)
                .with_hint("Retry later or raise the request timeout."),
        )
    }

    /// Build a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(
            ErrorDetails::new(message, 0)
                .with_code(CODE_CONFIGURATION)
                .with_hint("Fix the client configuration before making requests."),
        )
    }

    /// Build an error for a request that could not be constructed.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Configuration(
            ErrorDetails::new(message, 0)
                .with_code(CODE_INVALID_REQUEST)
                .with_hint("Check the path, query and headers passed to the request."),
        )
    }

    /// Build an error for a success response whose body could not be decoded.
    #[must_use]
    pub fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self::Generic(
            ErrorDetails::new(message, status)
                .with_code(CODE_INVALID_RESPONSE)
                .with_hint("The service returned an unexpected payload shape."),
        )
    }

    /// Get the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Generic(_) => ErrorKind::Generic,
        }
    }

    /// Get the shared payload.
    #[must_use]
    pub const fn details(&self) -> &ErrorDetails {
        match self {
            Self::Authentication(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::Validation(d)
            | Self::Conflict(d)
            | Self::Network(d)
            | Self::Timeout(d)
            | Self::Configuration(d)
            | Self::Generic(d)
            | Self::RateLimited { details: d, .. } => d,
        }
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.details().message
    }

    /// HTTP status, `0` for transport-level and client-side failures.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.details().status
    }

    /// Machine readable code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.details().code.as_deref()
    }

    /// Display hint.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.details().hint.as_deref()
    }

    /// How long the service asked us to wait, for rate limit errors.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
                ..
            } => Some(Duration::from_secs(*retry_after_seconds)),
            _ => None,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Network failures, 5xx service errors and rate limits are retryable.
    /// Everything else, including timeouts, is terminal.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Generic(d) => d.status >= 500 && d.status <= 599,
            _ => false,
        }
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

impl From<ConfigError> for MoltgramError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}
