//! GitHub OAuth login, callback, session check, and logout.
//!
//! The browser is sent to GitHub's authorize page, comes back to the
//! callback with a `code`, and the code is exchanged for a token that is
//! stored in a fresh session. Nothing beyond the standard
//! authorization-code exchange is implemented.

use std::time::Duration;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use http::header::{ACCEPT, SET_COOKIE};
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::config::OAuthClientSettings;
use crate::github::{AccessToken, AuthenticatedUser};
use crate::telemetry::TelemetryEvent;

use super::error::ApiError;
use super::state::{AppState, Credential};

/// Scopes requested from GitHub.
const OAUTH_SCOPES: &str = "repo,user";

/// Upper bound on a single token exchange.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised by the OAuth flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Client id or redirect URI is missing, so no login can start.
    #[error("GitHub OAuth is not configured.")]
    NotConfigured,

    /// A credential needed for the token exchange is missing.
    #[error("OAuth configuration incomplete.")]
    IncompleteConfiguration,

    /// GitHub redirected back without a `code` parameter.
    #[error("Missing 'code' parameter from GitHub OAuth.")]
    MissingCode,

    /// GitHub answered the exchange without an access token.
    #[error("GitHub OAuth token exchange failed.")]
    NoAccessToken,

    /// The exchange request itself failed.
    #[error("GitHub OAuth failed during token exchange: {message}")]
    Exchange {
        /// Transport or decoding failure.
        message: String,
    },
}

impl AuthError {
    /// Status code reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::NoAccessToken => StatusCode::UNAUTHORIZED,
            Self::NotConfigured | Self::IncompleteConfiguration | Self::Exchange { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Exchanges an authorization code for an access token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    /// Trades `code` for the user's access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Token exchange against GitHub's OAuth endpoint over `reqwest`.
#[derive(Debug, Clone)]
pub struct GitHubOAuthClient {
    http: reqwest::Client,
    settings: OAuthClientSettings,
}

impl GitHubOAuthClient {
    /// Creates a client for the given application settings.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Exchange`] when the HTTP client cannot be built.
    pub fn new(settings: OAuthClientSettings) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("reviewdeck/", env!("CARGO_PKG_VERSION")))
            .timeout(EXCHANGE_TIMEOUT)
            .build()
            .map_err(|error| AuthError::Exchange {
                message: error.to_string(),
            })?;
        Ok(Self { http, settings })
    }
}

#[async_trait]
impl OAuthExchange for GitHubOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError> {
        let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
            self.settings.client_id.as_deref(),
            self.settings.client_secret.as_deref(),
            self.settings.redirect_uri.as_deref(),
        ) else {
            return Err(AuthError::IncompleteConfiguration);
        };
        let exchange_failed = |error: reqwest::Error| AuthError::Exchange {
            message: error.to_string(),
        };

        let response = self
            .http
            .post(format!(
                "{}/login/oauth/access_token",
                self.settings.oauth_base
            ))
            .header(ACCEPT, "application/json")
            .json(&TokenRequest {
                client_id,
                client_secret,
                code,
                redirect_uri,
            })
            .send()
            .await
            .map_err(exchange_failed)?
            .error_for_status()
            .map_err(exchange_failed)?;
        let body: TokenResponse = response.json().await.map_err(exchange_failed)?;

        if let Some(error) = body.error.as_deref() {
            tracing::warn!("GitHub refused the OAuth code: {error}");
        }
        body.access_token
            .and_then(|token| AccessToken::new(token).ok())
            .ok_or(AuthError::NoAccessToken)
    }
}

/// URL of GitHub's authorize page for this application.
///
/// # Errors
///
/// Returns [`AuthError::NotConfigured`] when the client id or redirect URI
/// is missing or the OAuth base is not a URL.
pub fn authorize_url(settings: &OAuthClientSettings) -> Result<Url, AuthError> {
    let (Some(client_id), Some(redirect_uri)) = (
        settings.client_id.as_deref(),
        settings.redirect_uri.as_deref(),
    ) else {
        return Err(AuthError::NotConfigured);
    };
    Url::parse_with_params(
        &format!("{}/login/oauth/authorize", settings.oauth_base),
        [
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", OAUTH_SCOPES),
            ("prompt", "consent"),
            ("force_verify", "true"),
        ],
    )
    .map_err(|_| AuthError::NotConfigured)
}

/// Query GitHub appends to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    #[serde(default)]
    pub code: Option<String>,
}

/// `GET /api/auth/github`: redirect to GitHub's authorize page.
///
/// # Errors
///
/// Returns 500 when the OAuth application is not configured.
pub async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = authorize_url(&state.settings().oauth)?;
    Ok(Redirect::to(url.as_str()))
}

/// `GET /api/auth/github/callback`: exchange the code and start a session.
///
/// A session already named by the request's cookie is replaced.
///
/// # Errors
///
/// Returns 500 for incomplete configuration or a failed exchange, 400
/// without a code, and 401 when GitHub grants no token.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let oauth = &state.settings().oauth;
    if oauth.client_id.is_none() || oauth.client_secret.is_none() || oauth.redirect_uri.is_none()
    {
        return Err(AuthError::IncompleteConfiguration.into());
    }
    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or(AuthError::MissingCode)?;

    let token = state.oauth().exchange_code(&code).await?;
    let login = session_login(&state, &token).await;
    if let Some(previous) = state.settings().cookies.session_id(&headers) {
        state.sessions().destroy(&previous).await;
    }
    let session = state.sessions().create(token).await;
    state
        .telemetry()
        .record(TelemetryEvent::SessionEstablished { login });

    let cookie = state.settings().cookies.session_cookie(&session);
    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(&state.settings().frontend_url),
    ))
}

async fn session_login(state: &AppState, token: &AccessToken) -> Option<String> {
    let gateway = state.gateway_for_token(token).ok()?;
    match gateway.authenticated_user().await {
        Ok(user) => Some(user.login),
        Err(error) => {
            tracing::debug!("could not look up the new session's login: {error}");
            None
        }
    }
}

/// `GET /api/auth/me`: the signed-in user, or 401.
///
/// # Errors
///
/// Returns 401 without a token, and ends the session with 401 when GitHub
/// rejects it.
pub async fn me(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<Json<AuthenticatedUser>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    match gateway.authenticated_user().await {
        Ok(user) => Ok(Json(user)),
        Err(error) if error.is_authentication() => {
            state.invalidate(&credential, "check session").await;
            Err(ApiError::TokenRejected)
        }
        Err(error) => Err(error.into()),
    }
}

/// `POST /api/auth/logout`: forget the session and expire its cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookies = &state.settings().cookies;
    if let Some(session) = cookies.session_id(&headers) {
        state.sessions().destroy(&session).await;
    }
    (
        [(SET_COOKIE, cookies.expired_cookie())],
        Json(json!({ "message": "Logged out" })),
    )
}
