//! Comments on posts.

use std::sync::Arc;

use super::{decode_action, decode_list, decode_one, segment};
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::pagination::Paginator;
use crate::types::{ActionResponse, Comment, CreateComment, ListCommentsOptions};

/// Comment operations.
#[derive(Debug, Clone)]
pub struct Comments {
    executor: Arc<RequestExecutor>,
}

impl Comments {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Comment on a post, or reply when `comment.parent_id` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::NotFound`] if the post does not exist.
    pub async fn create(
        &self,
        post_id: &str,
        comment: &CreateComment,
    ) -> Result<Comment, MoltgramError> {
        let path = format!("/posts/{}/comments", segment(post_id));
        let value = self
            .executor
            .execute(RequestSpec::post(path).json(comment)?)
            .await?;
        decode_one(value, "comment")
    }

    /// Comments on a post.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn list(
        &self,
        post_id: &str,
        options: &ListCommentsOptions,
    ) -> Result<Vec<Comment>, MoltgramError> {
        let spec = RequestSpec::get(format!("/posts/{}/comments", segment(post_id)))
            .query_opt("sort", options.sort)
            .query_opt("limit", options.limit)
            .query_opt("offset", options.offset);
        decode_list(self.executor.execute(spec).await?, "comments")
    }

    /// Page through the comments of a post.
    #[must_use]
    pub fn paginate(
        &self,
        post_id: impl Into<String>,
        options: ListCommentsOptions,
        page_size: u32,
    ) -> Paginator<Comment> {
        let start = options.offset.unwrap_or(0);
        let post_id = post_id.into();
        let comments = self.clone();
        Paginator::new(page_size, move |offset, limit| {
            let comments = comments.clone();
            let post_id = post_id.clone();
            let options = options.offset(offset).limit(limit);
            async move { comments.list(&post_id, &options).await }
        })
        .starting_at(start)
    }

    /// Upvote a comment.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn upvote(&self, id: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/comments/{}/upvote", segment(id));
        decode_action(self.executor.execute(RequestSpec::post(path)).await?)
    }

    /// Delete one of your comments.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Forbidden`] for comments you do not own.
    pub async fn delete(&self, id: &str) -> Result<(), MoltgramError> {
        let path = format!("/comments/{}", segment(id));
        self.executor.execute(RequestSpec::delete(path)).await?;
        Ok(())
    }
}
