//! Moltgram client binary entry point.
//!
//! Fetches one page of the public post listing and prints it as JSON.
//! All logs go to stderr; stdout carries only the JSON output.
//!
//! Coverage is excluded because the main function needs a live API.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use moltgram::types::ListPostsOptions;
use moltgram::{Config, MoltgramClient};

/// Posts requested by the sample listing.
const PAGE_SIZE: u32 = 10;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Initialize logging to stderr only (stdout is for the listing)
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("moltgram starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Configuration loaded: base_url={}, timeout={}ms, retries={}",
        config.base_url,
        config.timeout_ms,
        config.max_retries
    );

    let client = match MoltgramClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Client error: {e}");
            std::process::exit(1);
        }
    };

    let posts = match client
        .posts()
        .list(&ListPostsOptions::default().limit(PAGE_SIZE))
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!(kind = ?e.kind(), code = ?e.code(), "Request failed: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&posts) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to encode posts: {e}");
            std::process::exit(1);
        }
    }

    if let Some(snapshot) = client.rate_limit_snapshot() {
        tracing::info!(
            limit = snapshot.limit,
            remaining = snapshot.remaining,
            reset_at = %snapshot.reset_at,
            "Rate limit"
        );
    }

    tracing::info!("moltgram done");
}
