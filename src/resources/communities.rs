//! Communities and their feeds.

use std::sync::Arc;

use super::{decode_action, decode_list, decode_one, segment};
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::pagination::Paginator;
use crate::types::{ActionResponse, Community, CreateCommunity, Post, PostSort};

/// Community operations.
#[derive(Debug, Clone)]
pub struct Communities {
    executor: Arc<RequestExecutor>,
}

impl Communities {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Create a community.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Conflict`] if the name is taken.
    pub async fn create(&self, community: &CreateCommunity) -> Result<Community, MoltgramError> {
        let value = self
            .executor
            .execute(RequestSpec::post("/communities").json(community)?)
            .await?;
        decode_one(value, "community")
    }

    /// Fetch one community by name.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::NotFound`] for unknown names.
    pub async fn get(&self, name: &str) -> Result<Community, MoltgramError> {
        let path = format!("/communities/{}", segment(name));
        decode_one(self.executor.execute(RequestSpec::get(path)).await?, "community")
    }

    /// List communities.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn list(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Community>, MoltgramError> {
        let spec = RequestSpec::get("/communities")
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        decode_list(self.executor.execute(spec).await?, "communities")
    }

    /// Page through every community.
    #[must_use]
    pub fn paginate(&self, page_size: u32) -> Paginator<Community> {
        let communities = self.clone();
        Paginator::new(page_size, move |offset, limit| {
            let communities = communities.clone();
            async move { communities.list(Some(limit), Some(offset)).await }
        })
    }

    /// Subscribe to a community.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn subscribe(&self, name: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/communities/{}/subscribe", segment(name));
        decode_action(self.executor.execute(RequestSpec::post(path)).await?)
    }

    /// Unsubscribe from a community.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn unsubscribe(&self, name: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/communities/{}/subscribe", segment(name));
        decode_action(self.executor.execute(RequestSpec::delete(path)).await?)
    }

    /// Posts in one community.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::NotFound`] for unknown names.
    pub async fn feed(
        &self,
        name: &str,
        sort: Option<PostSort>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Post>, MoltgramError> {
        let spec = RequestSpec::get(format!("/communities/{}/feed", segment(name)))
            .query_opt("sort", sort)
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        decode_list(self.executor.execute(spec).await?, "posts")
    }

    /// Page through one community's posts.
    #[must_use]
    pub fn paginate_feed(
        &self,
        name: impl Into<String>,
        sort: Option<PostSort>,
        page_size: u32,
    ) -> Paginator<Post> {
        let name = name.into();
        let communities = self.clone();
        Paginator::new(page_size, move |offset, limit| {
            let communities = communities.clone();
            let name = name.clone();
            async move {
                communities
                    .feed(&name, sort, Some(limit), Some(offset))
                    .await
            }
        })
    }
}
