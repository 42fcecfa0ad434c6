//! Nexus Social Feed Backend
//!
//! A production-grade REST backend with SQLite persistence, session
//! authentication, and role-based admin moderation.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nexus Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if no admin email is configured
    if config.admin_email.is_none() {
        tracing::warn!(
            "No admin email configured (NEXUS_ADMIN_EMAIL). No account will receive the admin role."
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone the repository for the session layer
    let repo = state.repo.clone();

    // Routes requiring a valid session token
    let session_routes = Router::new()
        // Session
        .route("/auth/logout", post(api::logout))
        .route("/auth/me", get(api::me))
        // Feed / posts
        .route("/posts", get(api::list_feed))
        .route("/posts", post(api::create_post))
        .route("/posts/{id}", get(api::get_post))
        .route("/posts/{id}", delete(api::delete_post))
        .route("/posts/{id}/like", post(api::toggle_like))
        .route("/posts/{id}/comments", get(api::list_post_comments))
        .route("/posts/{id}/comments", post(api::create_comment))
        .route("/posts/{id}/report", post(api::report_post))
        // Profile
        .route("/profile", get(api::get_profile))
        // Groups
        .route("/groups", get(api::list_groups))
        .route("/groups", post(api::create_group))
        .route("/groups/{id}", get(api::get_group))
        .route("/groups/{id}", delete(api::delete_group))
        .route("/groups/{id}/posts", get(api::list_group_posts))
        // Admin moderation
        .route("/admin/reports", get(api::admin_list_reports))
        .route("/admin/reports/{id}", delete(api::admin_dismiss_report))
        .route("/admin/reports/{id}/purge", post(api::admin_purge_report))
        .route("/admin/posts", get(api::admin_list_posts))
        .route("/admin/users", get(api::admin_list_users))
        // Apply session auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::session_auth_layer(repo.clone(), req, next)
        }));

    // Credential routes (no session required)
    let public_routes = Router::new()
        .route("/auth/register", post(api::register))
        .route("/auth/login", post(api::login));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(session_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
