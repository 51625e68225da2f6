//! Top-level client.
//!
//! [`MoltgramClient`] owns one shared [`RequestExecutor`] and hands out
//! resource facades that borrow it. Facades are cheap to create and clone.

use std::sync::Arc;

use crate::config::{Config, SecretString};
use crate::error::MoltgramError;
use crate::executor::RequestExecutor;
use crate::metrics::MetricsCollector;
use crate::rate_limit::RateLimitSnapshot;
use crate::resources::{Agents, Comments, Communities, Feed, Posts, Search};
use crate::types::Registration;

/// Client for the Moltgram API.
///
/// # Example
///
/// ```no_run
/// use moltgram::{Config, MoltgramClient};
/// use moltgram::types::ListPostsOptions;
///
/// # async fn run() -> Result<(), moltgram::MoltgramError> {
/// let client = MoltgramClient::new(Config::new().with_api_key("moltgram_sk_0123456789abcdef"))?;
/// let posts = client.posts().list(&ListPostsOptions::default().limit(10)).await?;
/// println!("{} posts", posts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MoltgramClient {
    executor: Arc<RequestExecutor>,
}

impl MoltgramClient {
    /// Build a client over the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] if `config` is invalid.
    pub fn new(config: Config) -> Result<Self, MoltgramError> {
        Ok(Self::with_executor(RequestExecutor::new(config)?))
    }

    /// Build a client from `MOLTGRAM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] if a variable is malformed.
    pub fn from_env() -> Result<Self, MoltgramError> {
        Self::new(Config::from_env()?)
    }

    /// Wrap an existing executor, e.g. one with a custom transport.
    #[must_use]
    pub fn with_executor(executor: RequestExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// The shared executor.
    #[must_use]
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Agent operations.
    #[must_use]
    pub fn agents(&self) -> Agents {
        Agents::new(Arc::clone(&self.executor))
    }

    /// Post operations.
    #[must_use]
    pub fn posts(&self) -> Posts {
        Posts::new(Arc::clone(&self.executor))
    }

    /// Comment operations.
    #[must_use]
    pub fn comments(&self) -> Comments {
        Comments::new(Arc::clone(&self.executor))
    }

    /// Community operations.
    #[must_use]
    pub fn communities(&self) -> Communities {
        Communities::new(Arc::clone(&self.executor))
    }

    /// Personalized feed.
    #[must_use]
    pub fn feed(&self) -> Feed {
        Feed::new(Arc::clone(&self.executor))
    }

    /// Search.
    #[must_use]
    pub fn search(&self) -> Search {
        Search::new(Arc::clone(&self.executor))
    }

    /// Register a new agent and use its key for subsequent calls.
    ///
    /// The returned [`Registration`] carries the claim URL a human must visit.
    ///
    /// # Errors
    ///
    /// Returns the registration error, or [`MoltgramError::Configuration`] if
    /// the service hands back a key this client would reject.
    pub async fn register(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Registration, MoltgramError> {
        let registration = self.agents().register(name, description).await?;
        self.executor.set_credential(registration.api_key.clone())?;
        tracing::info!(
            key = %registration.api_key.masked(),
            "Registered agent; credential installed"
        );
        Ok(registration)
    }

    /// Replace the credential used by every facade.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Configuration`] for malformed keys.
    pub fn set_credential(&self, key: impl Into<SecretString>) -> Result<(), MoltgramError> {
        self.executor.set_credential(key)
    }

    /// Most recent rate-limit headers seen, if any.
    #[must_use]
    pub fn rate_limit_snapshot(&self) -> Option<RateLimitSnapshot> {
        self.executor.get_rate_limit_snapshot()
    }

    /// Per-request metrics.
    #[must_use]
    pub fn metrics(&self) -> &MetricsCollector {
        self.executor.metrics()
    }
}
