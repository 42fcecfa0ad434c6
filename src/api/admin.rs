//! Admin moderation API endpoints.
//!
//! Every handler here is gated by the stored admin role flag.

use axum::{
    extract::{Path, State},
    Extension,
};

use super::{success, ApiResult};
use crate::auth::{self, CurrentUser};
use crate::models::{Post, Report, UserProfile};
use crate::AppState;

/// GET /api/admin/reports - All reports, newest first.
pub async fn admin_list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Report>> {
    auth::require_admin(&user)?;
    success(state.repo.list_reports().await?)
}

/// GET /api/admin/posts - Every post, global and group, newest first.
pub async fn admin_list_posts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Post>> {
    auth::require_admin(&user)?;
    success(state.repo.list_all_posts().await?)
}

/// GET /api/admin/users - All registered users, newest first.
pub async fn admin_list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<UserProfile>> {
    auth::require_admin(&user)?;
    success(state.repo.list_users().await?)
}

/// DELETE /api/admin/reports/:id - Dismiss a report; the post stays.
pub async fn admin_dismiss_report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    auth::require_admin(&user)?;

    state.repo.delete_report(&id).await?;
    tracing::info!("Admin {} dismissed report {}", user.email, id);

    success(())
}

/// POST /api/admin/reports/:id/purge - Delete the reported post and the
/// report together in one transaction.
pub async fn admin_purge_report(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    auth::require_admin(&user)?;

    state.repo.purge_report(&id).await?;
    tracing::info!("Admin {} purged report {}", user.email, id);

    success(())
}
