//! Authentication API endpoints.

use axum::{extract::State, Extension, Json};

use super::{success, ApiResult};
use crate::auth::{self, CurrentUser};
use crate::errors::AppError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use crate::AppState;

/// POST /api/auth/register - Create an account and open a session.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let display_name = request.display_name.trim();
    let email = request.email.trim();

    if display_name.is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let password_hash = auth::hash_password(&request.password)?;
    // The admin role is assigned from configuration at registration time and
    // honored everywhere via the stored flag.
    let is_admin = state.config.is_admin_email(email);

    let user = state
        .repo
        .create_user(display_name, email, &password_hash, is_admin)
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);

    let session = state.repo.create_session(&user.id).await?;

    success(AuthResponse {
        token: auth::format_token(&session.id, &session.secret),
        user: user.profile(),
    })
}

/// POST /api/auth/login - Verify credentials and open a session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let user = state
        .repo
        .get_user_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let session = state.repo.create_session(&user.id).await?;

    success(AuthResponse {
        token: auth::format_token(&session.id, &session.secret),
        user: user.profile(),
    })
}

/// POST /api/auth/logout - Delete the caller's session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<()> {
    state.repo.delete_session(&user.session_id).await?;
    success(())
}

/// GET /api/auth/me - Current user profile.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<UserProfile> {
    let account = state
        .repo
        .get_user(&user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.uid)))?;

    success(account.profile())
}
