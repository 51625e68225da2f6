//! Workflow tests for the client facades against a local HTTP server.
//!
//! These tests verify end-to-end flows including:
//! - Registration followed by authenticated calls
//! - Posting, commenting and voting
//! - Pagination over listings
//! - Configuration loading from the environment

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use futures_util::StreamExt;
use moltgram::traits::RecordingSleeper;
use moltgram::types::{CreateComment, CreatePost, ListPostsOptions, PostSort, SearchOptions, SearchType};
use moltgram::{Config, ErrorKind, MoltgramClient, RequestExecutor};
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const KEY: &str = "moltgram_sk_0123456789abcdef";

// ============================================================================
// Test Utilities
// ============================================================================

fn client(server: &MockServer, api_key: Option<&str>) -> MoltgramClient {
    let mut config = Config::new().with_base_url(format!("{}/api/v1", server.uri()));
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    let executor = RequestExecutor::new(config)
        .expect("valid config")
        .with_sleeper(Arc::new(RecordingSleeper::new()));
    MoltgramClient::with_executor(executor)
}

fn offset_of(request: &Request) -> usize {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "offset")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0)
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[tokio::test]
async fn test_register_then_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/agents/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "agent": {
                "api_key": KEY,
                "claim_url": "https://moltgram.test/claim/abc",
                "verification_code": "reef-42"
            },
            "important": "SAVE YOUR API KEY!"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/posts"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "post": {"id": "p1", "title": "Hello", "community": "general"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, None);
    let registration = client.register("molty", "A test agent").await.unwrap();
    assert_eq!(registration.verification_code.as_deref(), Some("reef-42"));

    let post = client
        .posts()
        .create(&CreatePost::text("general", "Hello", "First post"))
        .await
        .unwrap();
    assert_eq!(post.id, "p1");
}

#[tokio::test]
async fn test_comment_thread() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/posts/p1/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "comment": {"id": "c2", "post_id": "p1", "parent_id": "c1", "content": "+1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/comments/c2/upvote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Upvoted!",
            "author": {"name": "molty"}
        })))
        .mount(&server)
        .await;

    let client = client(&server, Some(KEY));
    let reply = client
        .comments()
        .create("p1", &CreateComment::new("+1").reply_to("c1"))
        .await
        .unwrap();
    assert_eq!(reply.parent_id.as_deref(), Some("c1"));

    let vote = client.comments().upvote(&reply.id).await.unwrap();
    assert_eq!(vote.author.unwrap().name, "molty");
}

#[tokio::test]
async fn test_post_listing_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts"))
        .and(query_param("sort", "new"))
        .and(query_param("limit", "3"))
        .respond_with(|request: &Request| {
            let start = offset_of(request);
            let posts: Vec<_> = (start..7.min(start + 3))
                .map(|i| json!({"id": format!("p{i}")}))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "posts": posts}))
        })
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server, Some(KEY));
    let pages: Vec<_> = client
        .posts()
        .paginate(ListPostsOptions::default().sort(PostSort::New), 3)
        .into_stream()
        .collect()
        .await;

    let sizes: Vec<_> = pages.into_iter().map(|p| p.unwrap().len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
}

#[tokio::test]
async fn test_search_and_missing_post() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "crabs"))
        .and(query_param("type", "agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "agents": [{"name": "ferris", "karma": 99}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/posts/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Post not found",
            "hint": "It may have been deleted."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Some(KEY));
    let results = client
        .search()
        .query(&SearchOptions::new("crabs").kind(SearchType::Agents))
        .await
        .unwrap();
    assert_eq!(results.agents[0].karma, Some(99));

    let err = client.posts().get("gone").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.hint(), Some("It may have been deleted."));
}

#[tokio::test]
async fn test_community_feed_and_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/communities/rust/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "p1"}, {"id": "p2"}]})),
        )
        .mount(&server)
        .await;

    let client = client(&server, Some(KEY));
    let posts = client
        .communities()
        .feed("rust", Some(PostSort::Hot), None, None)
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);

    let summary = client.metrics().summary();
    let endpoint = summary.by_endpoint.get("GET /communities/rust/feed").unwrap();
    assert_eq!(endpoint.count, 1);
    assert_eq!(endpoint.successful, 1);
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
#[serial]
fn test_client_from_env() {
    std::env::set_var("MOLTGRAM_API_KEY", KEY);
    std::env::set_var("MOLTGRAM_BASE_URL", "http://127.0.0.1:9/api/v1");
    std::env::set_var("MOLTGRAM_MAX_RETRIES", "2");

    let client = MoltgramClient::from_env().unwrap();
    assert!(client.executor().has_credential());
    assert_eq!(client.executor().config().max_retries, 2);

    std::env::remove_var("MOLTGRAM_API_KEY");
    std::env::remove_var("MOLTGRAM_BASE_URL");
    std::env::remove_var("MOLTGRAM_MAX_RETRIES");
}

#[test]
#[serial]
fn test_client_from_env_rejects_bad_key() {
    std::env::set_var("MOLTGRAM_API_KEY", "sk-not-moltgram");

    let err = MoltgramClient::from_env().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    std::env::remove_var("MOLTGRAM_API_KEY");
}
