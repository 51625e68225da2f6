//! Request metrics.
//!
//! The executor records one [`RequestEvent`] per `execute` call, after the
//! final attempt. Intermediate attempts only show up as the `attempts` count.
//!
//! # Example
//!
//! ```
//! use moltgram::metrics::{MetricsCollector, RequestEvent};
//!
//! let metrics = MetricsCollector::new();
//! metrics.record(RequestEvent::new("GET /posts", 1, 200, 120));
//! metrics.record(RequestEvent::new("GET /posts", 3, 503, 900));
//! metrics.record(RequestEvent::new("POST /posts", 1, 201, 80));
//!
//! let summary = metrics.summary();
//! assert_eq!(summary.total_requests, 3);
//! assert_eq!(summary.total_retries, 2);
//! assert!((summary.overall_success_rate - 0.666).abs() < 0.01);
//! assert!(summary.by_endpoint.contains_key("GET /posts"));
//! ```

#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Outcome of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    /// `METHOD path`.
    pub endpoint: String,
    /// Attempts made, at least 1.
    pub attempts: u32,
    /// Whether the call returned a 2xx result.
    pub success: bool,
    /// Final HTTP status, 0 when no response was received.
    pub status: u16,
    /// Wall time across all attempts and backoff, in milliseconds.
    pub latency_ms: u64,
    /// Timestamp of the event (Unix epoch seconds).
    pub timestamp: u64,
}

impl RequestEvent {
    /// Create an event. Success is derived from `status`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, attempts: u32, status: u16, latency_ms: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            attempts,
            success: (200..300).contains(&status),
            status,
            latency_ms,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Retries beyond the first attempt.
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Summary statistics for one endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EndpointSummary {
    /// Total calls.
    pub count: u64,
    /// Successful calls.
    pub successful: u64,
    /// Failed calls.
    pub failed: u64,
    /// Retries across all calls.
    pub retries: u64,
    /// Average latency in milliseconds.
    pub avg_latency_ms: f64,
    /// Minimum latency in milliseconds.
    pub min_latency_ms: u64,
    /// Maximum latency in milliseconds.
    pub max_latency_ms: u64,
    /// Success rate (0.0-1.0).
    pub success_rate: f64,
}

/// Overall metrics summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    /// Total calls across all endpoints.
    pub total_requests: u64,
    /// Overall success rate; 1.0 when nothing was recorded.
    pub overall_success_rate: f64,
    /// Retries across all calls.
    pub total_retries: u64,
    /// Per-endpoint summaries.
    pub by_endpoint: HashMap<String, EndpointSummary>,
}

/// Thread-safe metrics collector.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    events: RwLock<Vec<RequestEvent>>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request event.
    pub fn record(&self, event: RequestEvent) {
        match self.events.write() {
            Ok(mut events) => {
                events.push(event);
            }
            Err(poison_error) => {
                tracing::error!(
                    endpoint = %event.endpoint,
                    error = %poison_error,
                    "Failed to record request event: RwLock poisoned"
                );
            }
        }
    }

    fn snapshot(&self) -> Vec<RequestEvent> {
        match self.events.read() {
            Ok(e) => e.clone(),
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Reading events from poisoned lock, using recovered data"
                );
                poison_error.into_inner().clone()
            }
        }
    }

    /// Get summary statistics.
    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let events = self.snapshot();

        let mut by_endpoint: HashMap<String, Vec<&RequestEvent>> = HashMap::new();
        for event in &events {
            by_endpoint
                .entry(event.endpoint.clone())
                .or_default()
                .push(event);
        }

        let endpoint_summaries: HashMap<String, EndpointSummary> = by_endpoint
            .into_iter()
            .map(|(endpoint, endpoint_events)| {
                let count = endpoint_events.len() as u64;
                let successful = endpoint_events.iter().filter(|e| e.success).count() as u64;
                let retries = endpoint_events
                    .iter()
                    .map(|e| u64::from(e.retries()))
                    .sum();
                let latencies: Vec<u64> = endpoint_events.iter().map(|e| e.latency_ms).collect();
                let avg_latency = if latencies.is_empty() {
                    0.0
                } else {
                    latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
                };

                (
                    endpoint,
                    EndpointSummary {
                        count,
                        successful,
                        failed: count - successful,
                        retries,
                        avg_latency_ms: avg_latency,
                        min_latency_ms: latencies.iter().copied().min().unwrap_or(0),
                        max_latency_ms: latencies.iter().copied().max().unwrap_or(0),
                        success_rate: if count > 0 {
                            successful as f64 / count as f64
                        } else {
                            0.0
                        },
                    },
                )
            })
            .collect();

        let total_requests = events.len() as u64;
        let total_successful = events.iter().filter(|e| e.success).count() as u64;

        MetricsSummary {
            total_requests,
            overall_success_rate: if total_requests > 0 {
                total_successful as f64 / total_requests as f64
            } else {
                1.0
            },
            total_retries: events.iter().map(|e| u64::from(e.retries())).sum(),
            by_endpoint: endpoint_summaries,
        }
    }

    /// Events recorded for one endpoint, oldest first.
    #[must_use]
    pub fn events_for(&self, endpoint: &str) -> Vec<RequestEvent> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.endpoint == endpoint)
            .collect()
    }

    /// Most recent event, if any.
    #[must_use]
    pub fn last(&self) -> Option<RequestEvent> {
        self.events.read().ok().and_then(|e| e.last().cloned())
    }

    /// Clear all metrics.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}
