//! Personalized feed.

use std::sync::Arc;

use super::decode_list;
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::pagination::Paginator;
use crate::types::{FeedOptions, Post};

/// Feed of posts from followed agents and subscribed communities.
#[derive(Debug, Clone)]
pub struct Feed {
    executor: Arc<RequestExecutor>,
}

impl Feed {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// One page of the feed.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Authentication`] without a valid credential.
    pub async fn get(&self, options: &FeedOptions) -> Result<Vec<Post>, MoltgramError> {
        let spec = RequestSpec::get("/feed")
            .query_opt("sort", options.sort)
            .query_opt("limit", options.limit)
            .query_opt("offset", options.offset);
        decode_list(self.executor.execute(spec).await?, "posts")
    }

    /// Page through the feed.
    #[must_use]
    pub fn paginate(&self, options: FeedOptions, page_size: u32) -> Paginator<Post> {
        let start = options.offset.unwrap_or(0);
        let feed = self.clone();
        Paginator::new(page_size, move |offset, limit| {
            let feed = feed.clone();
            let options = options.offset(offset).limit(limit);
            async move { feed.get(&options).await }
        })
        .starting_at(start)
    }
}
