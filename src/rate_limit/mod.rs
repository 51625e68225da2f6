//! Rate limit tracking.
//!
//! The service reports its quota window on every response through three
//! headers:
//! - `x-ratelimit-limit`: requests allowed in the current window
//! - `x-ratelimit-remaining`: requests left in the window
//! - `x-ratelimit-reset`: Unix timestamp (seconds) when the window resets
//!
//! [`RateLimitTracker`] keeps the most recent [`RateLimitSnapshot`]. Writers
//! replace the snapshot wholesale and readers get a copy, so a reader never
//! sees a half-updated window. Concurrent responses race; the last one to be
//! recorded wins.
//!
//! # Example
//!
//! ```
//! use moltgram::rate_limit::RateLimitTracker;
//! use reqwest::header::{HeaderMap, HeaderValue};
//!
//! let tracker = RateLimitTracker::new();
//! assert!(tracker.snapshot().is_none());
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-ratelimit-limit", HeaderValue::from_static("100"));
//! headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
//! headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
//! tracker.record_headers(&headers);
//!
//! assert_eq!(tracker.remaining(), Some(0));
//! assert!(tracker.is_exhausted());
//! ```

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Serialize;

/// Header carrying the window's total quota.
pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
/// Header carrying the quota left.
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
/// Header carrying the reset time in Unix seconds.
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Point-in-time copy of the quota window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    /// Total quota for the window.
    pub limit: u64,
    /// Quota left. Can be reported as negative by the service.
    pub remaining: i64,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitSnapshot {
    /// Parse a snapshot from response headers.
    ///
    /// Returns `None` unless all three headers are present and well formed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_str(headers, HEADER_LIMIT)?.parse().ok()?;
        let remaining = header_str(headers, HEADER_REMAINING)?.parse().ok()?;
        let reset_secs: i64 = header_str(headers, HEADER_RESET)?.parse().ok()?;
        let reset_at = DateTime::from_timestamp(reset_secs, 0)?;
        Some(Self {
            limit,
            remaining,
            reset_at,
        })
    }

    /// True when no quota is left.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

/// Holder of the latest observed [`RateLimitSnapshot`].
///
/// Reading never blocks on a request and never triggers one.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    snapshot: RwLock<Option<RateLimitSnapshot>>,
}

impl RateLimitTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot.
    pub fn record(&self, snapshot: RateLimitSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Rate limit lock poisoned, overwriting recovered snapshot"
                );
                *poison_error.into_inner() = Some(snapshot);
            }
        }
    }

    /// Record the snapshot carried by `headers`, if any.
    ///
    /// Returns the recorded snapshot. Responses without complete rate limit
    /// headers leave the tracker untouched.
    pub fn record_headers(&self, headers: &HeaderMap) -> Option<RateLimitSnapshot> {
        let snapshot = RateLimitSnapshot::from_headers(headers)?;
        self.record(snapshot);
        Some(snapshot)
    }

    /// Copy of the latest snapshot; `None` until a response carried one.
    #[must_use]
    pub fn snapshot(&self) -> Option<RateLimitSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poison_error) => *poison_error.into_inner(),
        }
    }

    /// Quota left in the latest window.
    #[must_use]
    pub fn remaining(&self) -> Option<i64> {
        self.snapshot().map(|s| s.remaining)
    }

    /// True when a snapshot exists and its quota is used up.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_exhausted())
    }
}
