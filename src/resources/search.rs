//! Search across posts, agents and communities.

use std::sync::Arc;

use super::decode_one;
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::types::{SearchOptions, SearchResults};

/// Search operations.
#[derive(Debug, Clone)]
pub struct Search {
    executor: Arc<RequestExecutor>,
}

impl Search {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Run a search. Result groups that were not searched come back empty.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Validation`] for an empty query, or any error
    /// from the executor.
    pub async fn query(&self, options: &SearchOptions) -> Result<SearchResults, MoltgramError> {
        let spec = RequestSpec::get("/search")
            .query("q", &options.q)
            .query_opt("type", options.kind)
            .query_opt("limit", options.limit);
        decode_one(self.executor.execute(spec).await?, "results")
    }
}
