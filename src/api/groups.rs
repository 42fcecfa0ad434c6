//! Group ("sector") API endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::auth::{self, CurrentUser};
use crate::errors::AppError;
use crate::models::{CreateGroupRequest, Group, Post};
use crate::AppState;

/// Group list query parameters.
#[derive(Debug, Deserialize)]
pub struct GroupsQuery {
    /// Substring filter on group name.
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /api/groups - List all groups sorted by name.
pub async fn list_groups(
    State(state): State<AppState>,
    Query(params): Query<GroupsQuery>,
) -> ApiResult<Vec<Group>> {
    success(state.repo.list_groups(params.search.as_deref()).await?)
}

/// POST /api/groups - Create a group with the caller as sole member.
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<Group> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Group name is required".to_string()));
    }

    let description = request.description.as_deref().unwrap_or("").trim();

    let group = state.repo.create_group(name, description, &user.uid).await?;
    success(group)
}

/// GET /api/groups/:id - Single group with its member list.
pub async fn get_group(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Group> {
    match state.repo.get_group(&id).await? {
        Some(group) => success(group),
        None => Err(AppError::NotFound(format!("Group {} not found", id))),
    }
}

/// GET /api/groups/:id/posts - Posts scoped to a group, newest first.
///
/// Deliberately does not check that the group exists: posts orphaned by a
/// group deletion remain retrievable.
pub async fn list_group_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Post>> {
    success(state.repo.list_group_posts(&id).await?)
}

/// DELETE /api/groups/:id - Delete a group. Admin only; posts are not
/// cascaded.
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    auth::require_admin(&user)?;

    state.repo.delete_group(&id).await?;
    tracing::info!("Admin {} deleted group {}", user.email, id);

    success(())
}
