//! End-to-end tests for the request executor against a local HTTP server.
//!
//! These tests drive the real `reqwest` transport through wiremock and cover:
//! - Authentication and request headers
//! - Retry schedules for 5xx, 429 and terminal statuses
//! - Per-attempt timeouts
//! - Rate-limit header tracking under concurrency

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use moltgram::error::CODE_RATE_LIMITED;
use moltgram::traits::RecordingSleeper;
use moltgram::{Config, ErrorKind, RequestExecutor, RequestSpec};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const KEY: &str = "moltgram_sk_0123456789abcdef";

// ============================================================================
// Test Utilities
// ============================================================================

fn config(server: &MockServer) -> Config {
    Config::new()
        .with_base_url(format!("{}/v1", server.uri()))
        .with_api_key(KEY)
        .with_retry_delay_ms(100)
}

fn executor(config: Config) -> (RequestExecutor, RecordingSleeper) {
    let sleeper = RecordingSleeper::new();
    let executor = RequestExecutor::new(config)
        .expect("valid config")
        .with_sleeper(Arc::new(sleeper.clone()));
    (executor, sleeper)
}

fn rate_limited(remaining: i64, reset: i64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("x-ratelimit-limit", "100")
        .insert_header("x-ratelimit-remaining", remaining.to_string().as_str())
        .insert_header("x-ratelimit-reset", reset.to_string().as_str())
        .set_body_json(json!({"success": true}))
}

// ============================================================================
// Request Construction
// ============================================================================

#[tokio::test]
async fn test_sends_auth_and_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/posts"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("content-type", "application/json"))
        .and(header("x-client", "tests"))
        .and(header_exists("x-request-id"))
        .and(body_json(json!({"title": "hi"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"post": {"id": "p1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server).with_header("x-client", "tests"));
    let value = executor
        .execute(RequestSpec::post("/posts").body(json!({"title": "hi"})))
        .await
        .unwrap();
    assert_eq!(value["post"]["id"], "p1");
}

#[tokio::test]
async fn test_request_ids_are_unique() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server));
    executor.execute(RequestSpec::get("/agents/me")).await.unwrap();
    executor.execute(RequestSpec::get("/agents/me")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let ids: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("x-request-id").unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_absent_query_values_are_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .and(query_param("sort", "hot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server));
    executor
        .execute(
            RequestSpec::get("/posts")
                .query_opt("sort", Some("hot"))
                .query_opt("limit", None::<u32>),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("sort=hot"));
}

#[tokio::test]
async fn test_no_credential_sends_no_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/agents/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"agent": {}})))
        .mount(&server)
        .await;

    let config = Config::new().with_base_url(format!("{}/v1", server.uri()));
    let (executor, _) = executor(config);
    executor
        .execute(RequestSpec::post("/agents/register").body(json!({"name": "molty"})))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ============================================================================
// Retry Behavior
// ============================================================================

#[tokio::test]
async fn test_not_found_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Post not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (executor, sleeper) = executor(config(&server));
    let err = executor
        .execute(RequestSpec::get("/posts/missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "Post not found");
    assert_eq!(err.status(), 404);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let (executor, sleeper) = executor(config(&server));
    let err = executor.execute(RequestSpec::get("/feed")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Generic);
    assert_eq!(err.status(), 503);
    assert_eq!(
        sleeper.delays(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400)
        ]
    );

    let summary = executor.metrics().summary();
    assert_eq!(summary.total_requests, 1);
    assert_eq!(summary.total_retries, 3);
}

#[tokio::test]
async fn test_server_error_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let (executor, sleeper) = executor(config(&server));
    let value = executor.execute(RequestSpec::get("/posts")).await.unwrap();

    assert_eq!(value, json!({"data": []}));
    assert_eq!(sleeper.delays().len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_rate_limited_waits_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": "Slow down",
            "retryAfterSeconds": 2
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let (executor, sleeper) = executor(config(&server));
    executor
        .execute(RequestSpec::post("/posts/p1/upvote"))
        .await
        .unwrap();

    assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_rate_limited_with_no_retries_left() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({"error": "Too many requests"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server).with_max_retries(0));
    let err = executor.execute(RequestSpec::get("/feed")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.code(), Some(CODE_RATE_LIMITED));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn test_timeout_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let (executor, sleeper) = executor(config(&server).with_timeout_ms(50));
    let err = executor.execute(RequestSpec::get("/feed")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    // Bind then drop a listener so the port is known to be closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = Config::new()
        .with_base_url(format!("http://{addr}/v1"))
        .with_max_retries(1);
    let (executor, sleeper) = executor(config);

    let err = executor.execute(RequestSpec::get("/feed")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(sleeper.delays().len(), 1);
    assert!(executor.get_rate_limit_snapshot().is_none());
}

// ============================================================================
// Rate Limit Tracking
// ============================================================================

#[tokio::test]
async fn test_snapshot_recorded_from_error_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-limit", "100")
                .insert_header("x-ratelimit-remaining", "9")
                .insert_header("x-ratelimit-reset", "1700000000"),
        )
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server));
    executor.execute(RequestSpec::get("/agents/me")).await.unwrap_err();

    let snapshot = executor.get_rate_limit_snapshot().unwrap();
    assert_eq!(snapshot.limit, 100);
    assert_eq!(snapshot.remaining, 9);
    assert_eq!(snapshot.reset_at.timestamp(), 1_700_000_000);
}

/// Echoes the `n` query parameter into both `remaining` and `reset`.
struct EchoRateLimit;

impl Respond for EchoRateLimit {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let n: i64 = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "n")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        rate_limited(n, 1_700_000_000 + n)
    }
}

#[tokio::test]
async fn test_concurrent_snapshots_stay_consistent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(EchoRateLimit)
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server));
    let executor = Arc::new(executor);

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move {
                executor
                    .execute(RequestSpec::get("/posts").query("n", n))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    // Whichever response landed last, all three fields come from it.
    let snapshot = executor.get_rate_limit_snapshot().unwrap();
    assert_eq!(snapshot.limit, 100);
    assert_eq!(
        snapshot.reset_at.timestamp() - 1_700_000_000,
        snapshot.remaining
    );
    assert!((0..16).contains(&snapshot.remaining));
}

#[tokio::test]
async fn test_sequential_snapshot_is_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(EchoRateLimit)
        .mount(&server)
        .await;

    let (executor, _) = executor(config(&server));
    for n in [5, 3, 8] {
        executor
            .execute(RequestSpec::get("/posts").query("n", n))
            .await
            .unwrap();
    }
    assert_eq!(executor.get_rate_limit_snapshot().unwrap().remaining, 8);
}
