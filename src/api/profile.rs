//! Profile API endpoint: the caller's posts plus derived stats.

use axum::{extract::State, Extension};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{Post, UserProfile};
use crate::AppState;

/// Profile response with derived stats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: UserProfile,
    pub posts: Vec<Post>,
    pub post_count: usize,
    /// Total likes received across all of the user's posts.
    pub total_likes: usize,
}

/// GET /api/profile - The caller's posts, newest first, with stats.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<ProfileResponse> {
    let account = state
        .repo
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;

    let posts = state.repo.list_user_posts(&user.uid).await?;
    let post_count = posts.len();
    let total_likes = posts.iter().map(|p| p.likes.len()).sum();

    success(ProfileResponse {
        user: account.profile(),
        posts,
        post_count,
        total_likes,
    })
}
