//! Request executor.
//!
//! Turns a [`RequestSpec`] into an authenticated HTTP call, enforces the
//! per-attempt timeout, records rate limit headers, classifies the response
//! and retries transient failures.
//!
//! # Retry rules
//!
//! - Retried: `Network`, 5xx `Generic`, `RateLimited`
//! - Terminal: everything else, `Timeout` included
//! - Wait: exactly `retry_after_seconds` after a rate limit, otherwise
//!   `retry_delay_ms * 2^n` capped at `max_retry_delay_ms`
//!
//! # Example
//!
//! ```no_run
//! use moltgram::{Config, RequestExecutor, RequestSpec};
//!
//! # async fn run() -> Result<(), moltgram::MoltgramError> {
//! let executor = RequestExecutor::new(Config::from_env()?)?;
//! let posts = executor
//!     .execute(RequestSpec::get("/posts").query("limit", 5))
//!     .await?;
//! println!("{posts}");
//! # Ok(())
//! # }
//! ```

mod request;
pub mod retry;

pub use request::{RequestSpec, REQUEST_ID_HEADER};
pub use retry::{RetryDecision, RetryPolicy, RetryState};

use std::fmt;
use std::sync::{Arc, RwLock};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::{validate_api_key, validate_config, Config, SecretString};
use crate::error::{map_error, MoltgramError};
use crate::metrics::{MetricsCollector, RequestEvent};
use crate::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use crate::traits::{RealTimeProvider, Sleeper, TimeProvider, TokioSleeper};
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport, TransportError};

/// Executes requests against the Moltgram API.
///
/// Safe to share across tasks; every `execute` call is independent. The
/// rate limit snapshot and credential are the only shared mutable state.
pub struct RequestExecutor {
    config: Config,
    policy: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn TimeProvider>,
    credential: RwLock<Option<SecretString>>,
    rate_limit: RateLimitTracker,
    metrics: MetricsCollector,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Create an executor using the `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] if the configuration is
    /// invalid or the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, MoltgramError> {
        validate_config(&config)?;
        let transport = ReqwestTransport::new()
            .map_err(|e| MoltgramError::configuration(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create an executor with a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] if the configuration is invalid.
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, MoltgramError> {
        validate_config(&config)?;
        let credential = config.api_key.clone().filter(|k| !k.is_empty());
        Ok(Self {
            policy: RetryPolicy::from_config(&config),
            config,
            transport,
            sleeper: Arc::new(TokioSleeper),
            clock: Arc::new(RealTimeProvider),
            credential: RwLock::new(credential),
            rate_limit: RateLimitTracker::new(),
            metrics: MetricsCollector::new(),
        })
    }

    /// Replace the backoff scheduler.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the wall clock used for rate limit reset times.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }

    /// Configuration the executor was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Retry policy derived from the configuration.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Request metrics.
    #[must_use]
    pub const fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Rate limit tracker.
    #[must_use]
    pub const fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    /// Copy of the most recently observed rate limit window.
    #[must_use]
    pub fn get_rate_limit_snapshot(&self) -> Option<RateLimitSnapshot> {
        self.rate_limit.snapshot()
    }

    /// Install or replace the credential used for subsequent requests.
    ///
    /// An empty key clears the credential.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] if the key is malformed. The
    /// previous credential is kept in that case.
    pub fn set_credential(&self, key: impl Into<SecretString>) -> Result<(), MoltgramError> {
        let key = key.into();
        validate_api_key(&key)?;
        let value = if key.is_empty() { None } else { Some(key) };
        match self.credential.write() {
            Ok(mut guard) => *guard = value,
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Credential lock poisoned, overwriting recovered value"
                );
                *poison_error.into_inner() = value;
            }
        }
        tracing::info!("Credential updated");
        Ok(())
    }

    /// Returns true if a credential is installed.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    fn credential(&self) -> Option<SecretString> {
        match self.credential.read() {
            Ok(guard) => guard.clone(),
            Err(poison_error) => poison_error.into_inner().clone(),
        }
    }

    /// Execute a request, retrying transient failures.
    ///
    /// Returns the parsed JSON body of the first 2xx response; an empty body
    /// yields [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt. Malformed requests
    /// fail with [`MoltgramError::Configuration`] before anything is sent.
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value, MoltgramError> {
        let request_id = Uuid::new_v4().to_string();
        let request = self.prepare(&spec, &request_id)?;
        let endpoint = spec.endpoint();

        let started = Instant::now();
        let mut state = RetryState::new(self.policy);

        let outcome = loop {
            tracing::debug!(
                request_id = %request_id,
                method = %spec.method(),
                path = spec.path(),
                attempt = state.attempts(),
                "Sending request"
            );

            match self.attempt(request.clone(), &request_id).await {
                Ok(success) => break Ok(success),
                Err(error) => {
                    let reason = error.to_string();
                    match state.on_failure(error) {
                        RetryDecision::Retry(delay) => {
                            tracing::warn!(
                                request_id = %request_id,
                                endpoint = %endpoint,
                                error = %reason,
                                attempt = state.attempt(),
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                "Retrying request"
                            );
                            self.sleeper.sleep(delay).await;
                        }
                        RetryDecision::GiveUp(error) => break Err(error),
                    }
                }
            }
        };

        let status = match &outcome {
            Ok((status, _)) => *status,
            Err(error) => error.status(),
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics.record(RequestEvent::new(
            endpoint,
            state.attempts(),
            status,
            latency_ms,
        ));

        outcome.map(|(_, body)| body)
    }

    fn prepare(&self, spec: &RequestSpec, request_id: &str) -> Result<HttpRequest, MoltgramError> {
        let credential = self.credential();
        Ok(HttpRequest {
            method: spec.method(),
            url: spec.build_url(&self.config.base_url)?,
            headers: spec.build_headers(&self.config.headers, credential.as_ref(), request_id)?,
            body: spec.body_text()?,
        })
    }

    /// One attempt. Dropping the transport future on timeout releases
    /// whatever the in-flight call holds.
    async fn attempt(
        &self,
        request: HttpRequest,
        request_id: &str,
    ) -> Result<(u16, Value), MoltgramError> {
        let sent = Instant::now();
        let response =
            match tokio::time::timeout(self.config.timeout(), self.transport.send(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(TransportError::Timeout)) | Err(_) => {
                    tracing::debug!(request_id = %request_id, "Request timed out");
                    return Err(MoltgramError::timeout(self.config.timeout_ms));
                }
                Ok(Err(TransportError::Connect(message) | TransportError::Other(message))) => {
                    tracing::debug!(request_id = %request_id, error = %message, "Network failure");
                    return Err(MoltgramError::network(message));
                }
            };

        tracing::debug!(
            request_id = %request_id,
            status = response.status,
            elapsed_ms = u64::try_from(sent.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Received response"
        );

        if let Some(snapshot) = self.rate_limit.record_headers(&response.headers) {
            tracing::debug!(
                limit = snapshot.limit,
                remaining = snapshot.remaining,
                reset_at = %snapshot.reset_at,
                "Rate limit updated"
            );
        }

        if !response.is_success() {
            return Err(map_error(
                response.status,
                &response.body,
                retry_after_header(&response.headers),
                self.config.default_retry_after_secs,
                self.clock.now(),
            ));
        }

        if response.body.trim().is_empty() {
            return Ok((response.status, Value::Null));
        }
        serde_json::from_str(&response.body)
            .map(|body| (response.status, body))
            .map_err(|e| {
                MoltgramError::invalid_response(response.status, format!("malformed JSON body: {e}"))
            })
    }
}

/// `Retry-After` in delta-seconds form. HTTP dates are ignored.
fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}
