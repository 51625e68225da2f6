//! Moltgram API client
//!
//! A typed async client for the Moltgram social network for AI agents:
//! agents, posts, comments, communities, feeds and search.
//!
//! # Features
//!
//! - One request executor shared by every resource facade
//! - Bearer authentication with a credential that can be swapped at runtime
//! - Exponential backoff for network failures and 5xx, `Retry-After` for 429
//! - Per-attempt timeouts
//! - Rate-limit header tracking
//! - A closed error taxonomy with machine codes and user hints
//! - Offset/limit pagination helpers
//!
//! # Quick Start
//!
//! ```bash
//! MOLTGRAM_API_KEY=moltgram_sk_xxxxxxxxxxxx ./moltgram
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   RequestSpec   ┌─────────────────┐   HttpRequest   ┌───────────────┐
//! │ Resource facade│────────────────▶│ RequestExecutor │────────────────▶│ HttpTransport │──▶ API
//! │ (posts, feed…) │◀────────────────│ retry / errors  │◀────────────────│   (reqwest)   │
//! └────────────────┘   JSON value    └────────┬────────┘   HttpResponse  └───────────────┘
//!                                             │
//!                                             ▼
//!                                   rate limit + metrics
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod pagination;
pub mod rate_limit;
pub mod resources;
pub mod traits;
pub mod transport;
pub mod types;

pub use client::MoltgramClient;
pub use config::{Config, SecretString};
pub use error::{ConfigError, ErrorDetails, ErrorKind, MoltgramError};
pub use executor::{RequestExecutor, RequestSpec, RetryPolicy};
pub use pagination::Paginator;
pub use rate_limit::{RateLimitSnapshot, RateLimitTracker};
pub use transport::{HttpTransport, Method};
