//! Retry policy and per-call retry state.
//!
//! [`RetryState`] is the explicit state machine driven by the executor loop:
//! it tracks the attempt index, the last classified error and the total time
//! spent waiting, and decides after each failure whether to try again.

use std::time::Duration;

use crate::config::Config;
use crate::error::MoltgramError;

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap applied to computed backoff. Rate limit waits are not capped.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy taken from client configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
            max_delay: Duration::from_millis(config.max_retry_delay_ms),
        }
    }

    /// Exponential backoff for the retry at `retry_index` (0 for the first
    /// retry): `base_delay * 2^retry_index`, capped at `max_delay`.
    #[must_use]
    pub fn backoff(&self, retry_index: u32) -> Duration {
        let factor = 2u32.checked_pow(retry_index).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Wait before retrying after `error`.
    ///
    /// A rate limit waits exactly as long as the service asked.
    #[must_use]
    pub fn delay_for(&self, error: &MoltgramError, retry_index: u32) -> Duration {
        error
            .retry_after()
            .unwrap_or_else(|| self.backoff(retry_index))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given duration, then attempt again.
    Retry(Duration),
    /// Surface this error to the caller.
    GiveUp(MoltgramError),
}

/// Retry bookkeeping for one `execute` call.
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempt: u32,
    last_error: Option<MoltgramError>,
    waited: Duration,
}

impl RetryState {
    /// Fresh state, positioned at the first attempt.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            last_error: None,
            waited: Duration::ZERO,
        }
    }

    /// Zero-based index of the current attempt.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Attempts started so far, the current one included.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempt + 1
    }

    /// Retries still available after the current attempt.
    #[must_use]
    pub const fn retries_left(&self) -> u32 {
        self.policy.max_retries.saturating_sub(self.attempt)
    }

    /// Error from the most recent failed attempt.
    #[must_use]
    pub const fn last_error(&self) -> Option<&MoltgramError> {
        self.last_error.as_ref()
    }

    /// Total backoff requested so far.
    #[must_use]
    pub const fn waited(&self) -> Duration {
        self.waited
    }

    /// Record a failed attempt and decide what happens next.
    ///
    /// Retries only retryable errors and only while budget remains. On
    /// [`RetryDecision::Retry`] the state advances to the next attempt.
    pub fn on_failure(&mut self, error: MoltgramError) -> RetryDecision {
        if !error.is_retryable() || self.retries_left() == 0 {
            self.last_error = Some(error.clone());
            return RetryDecision::GiveUp(error);
        }

        let delay = self.policy.delay_for(&error, self.attempt);
        self.last_error = Some(error);
        self.waited = self.waited.saturating_add(delay);
        self.attempt += 1;
        RetryDecision::Retry(delay)
    }
}
