//! HTTP surface of the dashboard.
//!
//! The router exposes the OAuth routes under `/api/auth`, the authenticated
//! REST endpoints under `/api`, a health probe, and the built frontend as a
//! single-page application.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

use axum::routing::{get, post};
use axum::{Json, Router};
use http::Method;
use http::header::CONTENT_TYPE;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use auth::{AuthError, GitHubOAuthClient, OAuthExchange};
pub use error::ApiError;
pub use session::{CookieSettings, SessionId, SessionStore};
pub use state::{AppState, Credential, ServerError, ServerSettings};

use crate::config::ReviewDeckConfig;

/// Builds the application router.
///
/// # Example
///
/// ```no_run
/// use reviewdeck::ReviewDeckConfig;
/// use reviewdeck::server::{AppState, router};
///
/// let state = AppState::from_config(&ReviewDeckConfig::default())
///     .expect("state should build");
/// let app = router(state);
/// ```
#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.settings().frontend_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);
    let static_dir = state.settings().static_dir.clone();
    let frontend =
        ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/auth/github", get(auth::login))
        .route("/api/auth/github/callback", get(auth::callback))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/user", get(handlers::user))
        .route("/api/repositories", get(handlers::repositories))
        .route("/api/pull-requests", get(handlers::pull_requests))
        .route(
            "/api/pull-requests/{owner}/{repo}/{number}/reviews",
            get(handlers::reviews),
        )
        .route("/api/stats", get(handlers::stats))
        .route("/api/analytics", get(handlers::analytics))
        .route("/health", get(health))
        .with_state(state)
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Validates `config`, binds the listener, and serves until the process
/// stops.
///
/// # Errors
///
/// Returns [`ServerError`] when configuration is invalid, a client cannot
/// be built, or the listener fails.
pub async fn serve(config: &ReviewDeckConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(config)?;
    let port = config.resolve_port()?;
    let address = format!("{}:{port}", config.bind_address);
    let io_error = |error: std::io::Error| ServerError::Io {
        message: error.to_string(),
    };

    let listener = TcpListener::bind(&address).await.map_err(io_error)?;
    tracing::info!("reviewdeck listening on http://{address}");
    axum::serve(listener, router(state))
        .await
        .map_err(io_error)
}
