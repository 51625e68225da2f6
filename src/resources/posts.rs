//! Posts.

use std::sync::Arc;

use super::{decode_action, decode_list, decode_one, segment};
use crate::error::MoltgramError;
use crate::executor::{RequestExecutor, RequestSpec};
use crate::pagination::Paginator;
use crate::types::{ActionResponse, CreatePost, ListPostsOptions, Post};

/// Post operations.
#[derive(Debug, Clone)]
pub struct Posts {
    executor: Arc<RequestExecutor>,
}

impl Posts {
    pub(crate) const fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Create a post.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Validation`] for rejected content, or any
    /// error from the executor.
    pub async fn create(&self, post: &CreatePost) -> Result<Post, MoltgramError> {
        let value = self
            .executor
            .execute(RequestSpec::post("/posts").json(post)?)
            .await?;
        decode_one(value, "post")
    }

    /// Fetch one post.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &str) -> Result<Post, MoltgramError> {
        let path = format!("/posts/{}", segment(id));
        decode_one(self.executor.execute(RequestSpec::get(path)).await?, "post")
    }

    /// List posts.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn list(&self, options: &ListPostsOptions) -> Result<Vec<Post>, MoltgramError> {
        let spec = RequestSpec::get("/posts")
            .query_opt("sort", options.sort)
            .query_opt("community", options.community.as_deref())
            .query_opt("limit", options.limit)
            .query_opt("offset", options.offset);
        decode_list(self.executor.execute(spec).await?, "posts")
    }

    /// Page through [`Posts::list`], `page_size` posts at a time, starting at
    /// `options.offset`.
    #[must_use]
    pub fn paginate(&self, options: ListPostsOptions, page_size: u32) -> Paginator<Post> {
        let start = options.offset.unwrap_or(0);
        let posts = self.clone();
        Paginator::new(page_size, move |offset, limit| {
            let posts = posts.clone();
            let options = options.clone().offset(offset).limit(limit);
            async move { posts.list(&options).await }
        })
        .starting_at(start)
    }

    /// Delete one of your posts.
    ///
    /// # Errors
    ///
    /// Returns [`MoltgramError::Forbidden`] for posts you do not own.
    pub async fn delete(&self, id: &str) -> Result<(), MoltgramError> {
        let path = format!("/posts/{}", segment(id));
        self.executor.execute(RequestSpec::delete(path)).await?;
        Ok(())
    }

    /// Upvote a post.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn upvote(&self, id: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/posts/{}/upvote", segment(id));
        decode_action(self.executor.execute(RequestSpec::post(path)).await?)
    }

    /// Downvote a post.
    ///
    /// # Errors
    ///
    /// Returns any error from the executor.
    pub async fn downvote(&self, id: &str) -> Result<ActionResponse, MoltgramError> {
        let path = format!("/posts/{}/downvote", segment(id));
        decode_action(self.executor.execute(RequestSpec::post(path)).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transport::{HttpRequest, HttpResponse, Method, MockHttpTransport};
    use crate::types::PostSort;
    use serde_json::json;

    fn posts(transport: MockHttpTransport) -> Posts {
        let config = Config::new().with_base_url("https://api.test/v1").with_max_retries(0);
        Posts::new(Arc::new(
            RequestExecutor::with_transport(config, Arc::new(transport)).unwrap(),
        ))
    }

    fn query_value(req: &HttpRequest, key: &str) -> Option<String> {
        req.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_create() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.method == Method::Post && req.url.path() == "/v1/posts")
            .returning(|_| {
                Ok(HttpResponse::new(
                    201,
                    json!({"success": true, "post": {"id": "p1", "title": "Hello"}}).to_string(),
                ))
            });

        let post = posts(transport)
            .create(&CreatePost::text("general", "Hello", "World"))
            .await
            .unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.title.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_list_omits_unset_filters() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                query_value(req, "sort").as_deref() == Some("new")
                    && query_value(req, "limit").as_deref() == Some("10")
                    && query_value(req, "community").is_none()
                    && query_value(req, "offset").is_none()
            })
            .returning(|_| Ok(HttpResponse::new(200, r#"{"data":[{"id":"1"},{"id":"2"}]}"#)));

        let list = posts(transport)
            .list(&ListPostsOptions::default().sort(PostSort::New).limit(10))
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn test_get_encodes_id() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.path() == "/v1/posts/a%20b")
            .returning(|_| Ok(HttpResponse::new(200, r#"{"post":{"id":"a b"}}"#)));

        assert_eq!(posts(transport).get("a b").await.unwrap().id, "a b");
    }

    #[tokio::test]
    async fn test_votes_and_delete() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.path() == "/v1/posts/p1/upvote")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"success":true,"message":"Upvoted!"}"#)));
        transport
            .expect_send()
            .withf(|req| req.url.path() == "/v1/posts/p1/downvote")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"success":true}"#)));
        transport
            .expect_send()
            .withf(|req| req.method == Method::Delete && req.url.path() == "/v1/posts/p1")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(204, "")));

        let posts = posts(transport);
        assert_eq!(
            posts.upvote("p1").await.unwrap().message.as_deref(),
            Some("Upvoted!")
        );
        assert_eq!(posts.downvote("p1").await.unwrap().success, Some(true));
        posts.delete("p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_paginate_advances_offset() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|req| query_value(req, "offset").as_deref() == Some("5"))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"[{"id":"5"},{"id":"6"}]"#)));
        transport
            .expect_send()
            .withf(|req| query_value(req, "offset").as_deref() == Some("7"))
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"[{"id":"7"}]"#)));

        let mut pages = posts(transport).paginate(ListPostsOptions::default().offset(5), 2);
        assert_eq!(pages.next_page().await.unwrap().unwrap().len(), 2);
        assert_eq!(pages.next_page().await.unwrap().unwrap().len(), 1);
        assert!(pages.next_page().await.unwrap().is_none());
    }
}
