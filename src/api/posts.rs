//! Post API endpoints: feed, creation, likes, comments, reporting.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::{self, CurrentUser};
use crate::errors::AppError;
use crate::models::{
    Comment, CreateCommentRequest, CreatePostRequest, CreateReportRequest, LikeResponse, Post,
    Report,
};
use crate::AppState;

/// Feed query parameters.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Substring filter on post content or author name.
    #[serde(default)]
    pub search: Option<String>,
    /// Maximum number of results (default: 50).
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// Maximum page size for feed queries.
const MAX_PAGE_LIMIT: i64 = 100;

/// GET /api/posts - Global feed: posts without a group, newest first.
pub async fn list_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> ApiResult<Vec<Post>> {
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let posts = state
        .repo
        .list_feed_posts(params.search.as_deref(), limit, offset)
        .await?;

    success(posts)
}

/// POST /api/posts - Create a post, optionally inside a group.
///
/// Group membership is not checked; any authenticated user can post into
/// any group.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<Post> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    let post = state
        .repo
        .create_post(
            &user.uid,
            &user.display_name,
            content,
            request.group_id.as_deref(),
        )
        .await?;

    success(post)
}

/// GET /api/posts/:id - Single post with likes and comments.
pub async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    match state.repo.get_post(&id).await? {
        Some(post) => success(post),
        None => Err(AppError::NotFound(format!("Post {} not found", id))),
    }
}

/// DELETE /api/posts/:id - Delete a post. Admin only.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    auth::require_admin(&user)?;

    state.repo.delete_post(&id).await?;
    tracing::info!("Admin {} deleted post {}", user.email, id);

    success(())
}

/// POST /api/posts/:id/like - Toggle the caller's like on a post.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<LikeResponse> {
    let (liked, likes) = state.repo.toggle_like(&id, &user.uid).await?;
    success(LikeResponse { liked, likes })
}

/// GET /api/posts/:id/comments - List comments on a post, oldest first.
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Comment>> {
    if state.repo.get_post(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    }
    success(state.repo.list_comments(&id).await?)
}

/// POST /api/posts/:id/comments - Append a comment to a post.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Vec<Comment>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }

    state
        .repo
        .add_comment(&id, &user.uid, &user.display_name, text)
        .await?;

    success(state.repo.list_comments(&id).await?)
}

/// POST /api/posts/:id/report - File a report against a post.
///
/// Admins moderate rather than report. Repeat reports from the same user
/// are allowed.
pub async fn report_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<CreateReportRequest>,
) -> ApiResult<Report> {
    if user.is_admin {
        return Err(AppError::Forbidden(
            "Administrators cannot file reports".to_string(),
        ));
    }

    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Reason is required".to_string()));
    }

    let report = state.repo.create_report(&id, &user.email, reason).await?;
    tracing::info!("Report {} filed against post {}", report.id, id);

    success(report)
}
