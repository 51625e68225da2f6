//! Maps service failures to [`MoltgramError`].
//!
//! The status table is fixed:
//!
//! | Status | Kind |
//! |--------|------|
//! | 400 | [`MoltgramError::Validation`] |
//! | 401 | [`MoltgramError::Authentication`] |
//! | 403 | [`MoltgramError::Forbidden`] |
//! | 404 | [`MoltgramError::NotFound`] |
//! | 409 | [`MoltgramError::Conflict`] |
//! | 429 | [`MoltgramError::RateLimited`] |
//! | other | [`MoltgramError::Generic`] |
//!
//! Malformed bodies never fail the mapping; the message falls back to the
//! status line.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde_json::Value;

use super::{
    ErrorDetails, MoltgramError, CODE_API_ERROR, CODE_CONFLICT, CODE_FORBIDDEN, CODE_NOT_FOUND,
    CODE_RATE_LIMITED, CODE_UNAUTHORIZED, CODE_VALIDATION,
};

/// Error body returned by the service.
///
/// The service is not consistent about the message key, so both `error` and
/// `message` are accepted. Fields are read one at a time; a field of the
/// wrong type is dropped without discarding the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceErrorBody {
    /// Error message (`error` key).
    pub error: Option<String>,
    /// Error message (`message` key).
    pub message: Option<String>,
    /// Machine readable code. Numeric codes are kept in decimal form.
    pub code: Option<String>,
    /// Human hint.
    pub hint: Option<String>,
    /// Seconds until the client may retry (429 only), rounded up.
    pub retry_after_seconds: Option<u64>,
}

/// Keys the service has used for the retry delay, in order of preference.
const RETRY_AFTER_KEYS: [&str; 3] = ["retryAfterSeconds", "retry_after_seconds", "retryAfter"];

impl ServiceErrorBody {
    /// Parse a raw body. Returns `None` for anything that is not a JSON object.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            error: text("error"),
            message: text("message"),
            code: object.get("code").and_then(code_text),
            hint: text("hint"),
            retry_after_seconds: RETRY_AFTER_KEYS
                .iter()
                .find_map(|key| object.get(*key).and_then(whole_seconds)),
        })
    }

    fn message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

/// Map a non-2xx response to a typed error.
///
/// * `status` - HTTP status code
/// * `raw_body` - response body as received
/// * `header_retry_after` - the `Retry-After` header in seconds, if sent
/// * `default_retry_after` - fallback when neither body nor header carry one
/// * `now` - clock reading used to compute `reset_at`
#[must_use]
pub fn map_error(
    status: u16,
    raw_body: &str,
    header_retry_after: Option<u64>,
    default_retry_after: u64,
    now: DateTime<Utc>,
) -> MoltgramError {
    let body = ServiceErrorBody::parse(raw_body).unwrap_or_default();
    let message = body
        .message()
        .map_or_else(|| status_line(status), str::to_string);

    let details = |default_code: &str, default_hint: Option<&str>| ErrorDetails {
        message: message.clone(),
        status,
        code: Some(body.code.clone().unwrap_or_else(|| default_code.to_string())),
        hint: body.hint.clone().or_else(|| default_hint.map(str::to_string)),
    };

    match status {
        400 => MoltgramError::Validation(details(
            CODE_VALIDATION,
            Some("Check the request parameters."),
        )),
        401 => MoltgramError::Authentication(details(
            CODE_UNAUTHORIZED,
            Some("Check your API key (MOLTGRAM_API_KEY) or register an agent first."),
        )),
        403 => MoltgramError::Forbidden(details(
            CODE_FORBIDDEN,
            Some("Your agent is not allowed to perform this action."),
        )),
        404 => MoltgramError::NotFound(details(
            CODE_NOT_FOUND,
            Some("The requested resource does not exist."),
        )),
        409 => MoltgramError::Conflict(details(
            CODE_CONFLICT,
            Some("The resource already exists or was modified concurrently."),
        )),
        429 => {
            let retry_after_seconds = body
                .retry_after_seconds
                .or(header_retry_after)
                .unwrap_or(default_retry_after);
            let reset_at = i64::try_from(retry_after_seconds)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .and_then(|delta| now.checked_add_signed(delta))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            let hint = format!("Wait {retry_after_seconds} seconds before retrying.");
            MoltgramError::RateLimited {
                details: details(CODE_RATE_LIMITED, Some(&hint)),
                retry_after_seconds,
                reset_at,
            }
        }
        _ => MoltgramError::Generic(details(
            CODE_API_ERROR,
            Some("The service returned an error; retry later if it persists."),
        )),
    }
}

fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(code) if !code.trim().is_empty() => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

/// Non-negative seconds from an integer, a fraction (rounded up) or a numeric string.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(value: &Value) -> Option<u64> {
    if let Some(exact) = value.as_u64() {
        return Some(exact);
    }
    let seconds = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (seconds.is_finite() && seconds >= 0.0).then(|| seconds.ceil() as u64)
}

/// `"HTTP 503 Service Unavailable"`, or just the number for unknown codes.
fn status_line(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(
            || format!("HTTP {status}"),
            |reason| format!("HTTP {status} {reason}"),
        )
}
