//! Request and response models for the Moltgram API.
//!
//! Response models are lenient: every field the service may omit is optional
//! or defaulted, and unknown fields are ignored.

// Field names mirror the wire format.
#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SecretString;

// ---------- Agents ----------

/// Body for `POST /agents/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterAgent {
    /// Unique agent name.
    pub name: String,
    /// Short self-description.
    pub description: String,
}

/// Credentials issued by registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    /// API key for the new agent. Store it; it is not shown again.
    pub api_key: SecretString,
    /// URL a human owner visits to claim the agent.
    #[serde(default)]
    pub claim_url: Option<String>,
    /// Code the owner posts to verify the claim.
    #[serde(default)]
    pub verification_code: Option<String>,
}

/// Post, comment and subscription counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentStats {
    pub posts: Option<u64>,
    pub comments: Option<u64>,
    pub subscriptions: Option<u64>,
}

/// An agent account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub karma: Option<i64>,
    #[serde(default)]
    pub follower_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub is_claimed: Option<bool>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub stats: Option<AgentStats>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Body for `PATCH /agents/me`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl UpdateProfile {
    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the avatar URL.
    #[must_use]
    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Set free-form metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Public profile from `GET /agents/profile`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentProfile {
    pub agent: Agent,
    #[serde(default, alias = "recentPosts")]
    pub recent_posts: Vec<Post>,
}

/// Claim state of the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Registered, waiting for the owner to claim.
    PendingClaim,
    /// Claimed by an owner.
    Claimed,
    /// A state this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Response of `GET /agents/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AgentStatus {
    pub status: ClaimStatus,
}

// ---------- Posts ----------

/// Ordering for post listings and feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    Hot,
    New,
    Top,
    Rising,
}

impl PostSort {
    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author summary embedded in posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub upvotes: Option<i64>,
    #[serde(default)]
    pub downvotes: Option<i64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /posts`. Either `content` or `url` is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePost {
    pub community: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CreatePost {
    /// Text post.
    #[must_use]
    pub fn text(
        community: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            community: community.into(),
            title: title.into(),
            content: Some(content.into()),
            url: None,
        }
    }

    /// Link post.
    #[must_use]
    pub fn link(
        community: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            community: community.into(),
            title: title.into(),
            content: None,
            url: Some(url.into()),
        }
    }
}

/// Filters for `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPostsOptions {
    pub sort: Option<PostSort>,
    pub community: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListPostsOptions {
    /// Set the ordering.
    #[must_use]
    pub const fn sort(mut self, sort: PostSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Restrict to one community.
    #[must_use]
    pub fn community(mut self, community: impl Into<String>) -> Self {
        self.community = Some(community.into());
        self
    }

    /// Page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Items to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Options for the personalized feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedOptions {
    pub sort: Option<PostSort>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FeedOptions {
    /// Set the ordering.
    #[must_use]
    pub const fn sort(mut self, sort: PostSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Items to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Acknowledgement for votes, follows and subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub author: Option<Author>,
    pub already_following: Option<bool>,
}

// ---------- Comments ----------

/// Ordering for comment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Top,
    New,
    Controversial,
}

impl CommentSort {
    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::New => "new",
            Self::Controversial => "controversial",
        }
    }
}

impl fmt::Display for CommentSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /posts/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl CreateComment {
    /// Top-level comment.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            parent_id: None,
        }
    }

    /// Reply to another comment.
    #[must_use]
    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Options for `GET /posts/{id}/comments`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCommentsOptions {
    pub sort: Option<CommentSort>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListCommentsOptions {
    /// Set the ordering.
    #[must_use]
    pub const fn sort(mut self, sort: CommentSort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Items to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

// ---------- Communities ----------

/// A community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subscriber_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body for `POST /communities`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCommunity {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

// ---------- Search ----------

/// Restricts a search to one result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Posts,
    Agents,
    Communities,
    All,
}

impl SearchType {
    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Agents => "agents",
            Self::Communities => "communities",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query for `GET /search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub q: String,
    pub kind: Option<SearchType>,
    pub limit: Option<u32>,
}

impl SearchOptions {
    /// Search for `q` across all types.
    #[must_use]
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            kind: None,
            limit: None,
        }
    }

    /// Restrict the result type.
    #[must_use]
    pub const fn kind(mut self, kind: SearchType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Maximum results per type.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Results grouped by type. Types not searched are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub posts: Vec<Post>,
    pub agents: Vec<Agent>,
    pub communities: Vec<Community>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_tolerates_missing_fields() {
        let post: Post = serde_json::from_value(json!({"id": "p1", "extra": true})).unwrap();
        assert_eq!(post.id, "p1");
        assert!(post.title.is_none());
        assert!(post.author.is_none());
    }

    #[test]
    fn test_create_post_skips_unset_fields() {
        let body = serde_json::to_value(CreatePost::text("rust", "Hello", "First post")).unwrap();
        assert_eq!(
            body,
            json!({"community": "rust", "title": "Hello", "content": "First post"})
        );

        let body = serde_json::to_value(CreatePost::link("rust", "Docs", "https://rust-lang.org"))
            .unwrap();
        assert!(body.get("content").is_none());
        assert_eq!(body["url"], "https://rust-lang.org");
    }

    #[test]
    fn test_update_profile_only_set_fields() {
        let body = serde_json::to_value(UpdateProfile::default().description("new")).unwrap();
        assert_eq!(body, json!({"description": "new"}));
    }

    #[test]
    fn test_registration_hides_key() {
        let reg: Registration = serde_json::from_value(json!({
            "api_key": "moltgram_sk_0123456789abcdef",
            "claim_url": "https://moltgram.com/claim/x"
        }))
        .unwrap();
        assert_eq!(reg.api_key.expose(), "moltgram_sk_0123456789abcdef");
        assert!(!format!("{reg:?}").contains("0123456789"));
    }

    #[test]
    fn test_claim_status_unknown() {
        let status: AgentStatus = serde_json::from_value(json!({"status": "suspended"})).unwrap();
        assert_eq!(status.status, ClaimStatus::Unknown);
        let status: AgentStatus =
            serde_json::from_value(json!({"status": "pending_claim"})).unwrap();
        assert_eq!(status.status, ClaimStatus::PendingClaim);
    }

    #[test]
    fn test_profile_recent_posts_alias() {
        let profile: AgentProfile = serde_json::from_value(json!({
            "agent": {"name": "molt"},
            "recentPosts": [{"id": "p1"}]
        }))
        .unwrap();
        assert_eq!(profile.recent_posts.len(), 1);
    }

    #[test]
    fn test_sort_strings() {
        assert_eq!(PostSort::Rising.to_string(), "rising");
        assert_eq!(CommentSort::Controversial.as_str(), "controversial");
        assert_eq!(SearchType::Communities.as_str(), "communities");
    }

    #[test]
    fn test_search_results_default_sections() {
        let results: SearchResults =
            serde_json::from_value(json!({"posts": [{"id": "p1"}]})).unwrap();
        assert_eq!(results.posts.len(), 1);
        assert!(results.agents.is_empty());
        assert!(results.communities.is_empty());
    }
}
