//! Post and comment models matching the frontend Post/Comment interfaces.

use serde::{Deserialize, Serialize};

/// A post in the global feed or inside a group ("sector").
///
/// Likes and comments are stored in their own tables but embedded here on
/// the wire, matching the shape the frontend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub created_at: String,
    /// Set of uids that liked this post.
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    /// None means the post belongs to the global feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Denormalized count of reports filed against this post.
    pub report_count: i64,
}

/// A comment appended to a post. Append-only; never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: String,
}

/// Request body for creating a new post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    /// Stored as given; no foreign-key check against groups.
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Request body for appending a comment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub text: String,
}

/// Response body for the like toggle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// Whether the caller likes the post after the toggle.
    pub liked: bool,
    pub likes: Vec<String>,
}
