//! Session-token authentication module.
//!
//! Passwords are hashed with Argon2. Bearer tokens are `"<session-id>.<secret>"`;
//! the secret is verified with a constant-time comparison to mitigate timing attacks.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::db::Repository;
use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};

/// The authenticated caller, inserted into request extensions by the
/// session middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Assemble a bearer token from a session.
pub fn format_token(session_id: &str, secret: &str) -> String {
    format!("{}.{}", session_id, secret)
}

/// Split a bearer token into session id and secret.
fn parse_token(token: &str) -> Option<(&str, &str)> {
    token.split_once('.')
}

/// Session authentication layer. Resolves the bearer token to a user and
/// inserts a [`CurrentUser`] extension for downstream handlers.
pub async fn session_auth_layer(repo: Arc<Repository>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string());

    let Some(token) = token else {
        return unauthorized_response("Missing bearer token");
    };

    let Some((session_id, secret)) = parse_token(&token) else {
        return unauthorized_response("Malformed bearer token");
    };

    let session = match repo.get_session(session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return unauthorized_response("Invalid or expired session"),
        Err(e) => return e.into_response(),
    };

    // Constant-time comparison of the token secret
    if !constant_time_compare(secret, &session.secret) {
        return unauthorized_response("Invalid or expired session");
    }

    let user = match repo.get_user(&session.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized_response("Invalid or expired session"),
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(CurrentUser {
        session_id: session.id,
        uid: user.id,
        email: user.email,
        display_name: user.display_name,
        is_admin: user.is_admin,
    });

    next.run(request).await
}

/// Reject callers whose stored role flag is not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Administrator role required".to_string(),
        ))
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
