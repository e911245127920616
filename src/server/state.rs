//! Shared application state handed to every handler.

use std::path::PathBuf;
use std::sync::Arc;

use http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, OAuthClientSettings, ReviewDeckConfig};
use crate::github::{
    AccessToken, DashboardIntake, GatewayFactory, GitHubError, GitHubGateway, IntakeSettings,
    OctocrabGatewayFactory,
};
use crate::telemetry::{TelemetryEvent, TelemetrySink, TracingTelemetrySink};

use super::auth::{AuthError, GitHubOAuthClient, OAuthExchange};
use super::error::ApiError;
use super::session::{CookieSettings, SessionId, SessionStore};

/// Errors raised while assembling the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration values are inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The GitHub gateway factory could not be built.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The OAuth client could not be built.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The frontend URL does not name an origin.
    #[error("frontend_url is not a valid origin: {value}")]
    InvalidFrontendUrl {
        /// Configured value.
        value: String,
    },

    /// Binding or serving the listener failed.
    #[error("server I/O error: {message}")]
    Io {
        /// Error description.
        message: String,
    },
}

/// Settings the HTTP layer reads on every request.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Intake tunables.
    pub intake: IntakeSettings,
    /// Session cookie attributes.
    pub cookies: CookieSettings,
    /// OAuth client credentials and endpoints.
    pub oauth: OAuthClientSettings,
    /// Where the OAuth callback sends the browser.
    pub frontend_url: String,
    /// Origin admitted by CORS.
    pub frontend_origin: HeaderValue,
    /// Directory holding the built frontend.
    pub static_dir: PathBuf,
}

impl ServerSettings {
    /// Derives the HTTP settings from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidFrontendUrl`] when `frontend_url` has
    /// no usable origin.
    pub fn from_config(config: &ReviewDeckConfig) -> Result<Self, ServerError> {
        Ok(Self {
            intake: config.intake_settings(),
            cookies: CookieSettings {
                name: config.session_cookie_name.trim().to_owned(),
                secure: config.cookie_secure,
            },
            oauth: config.oauth_client(),
            frontend_url: config.frontend_url.clone(),
            frontend_origin: frontend_origin(&config.frontend_url)?,
            static_dir: PathBuf::from(&config.static_dir),
        })
    }
}

fn frontend_origin(frontend_url: &str) -> Result<HeaderValue, ServerError> {
    let invalid = || ServerError::InvalidFrontendUrl {
        value: frontend_url.to_owned(),
    };
    let origin = Url::parse(frontend_url).map_err(|_| invalid())?.origin();
    if !origin.is_tuple() {
        return Err(invalid());
    }
    HeaderValue::from_str(&origin.ascii_serialization()).map_err(|_| invalid())
}

struct Shared {
    settings: ServerSettings,
    sessions: SessionStore,
    gateways: Arc<dyn GatewayFactory>,
    oauth: Arc<dyn OAuthExchange>,
    telemetry: Arc<dyn TelemetrySink>,
}

/// Cheaply cloneable handle to the server's collaborators.
#[derive(Clone)]
pub struct AppState {
    shared: Arc<Shared>,
}

impl AppState {
    /// Assembles state from explicit collaborators.
    #[must_use]
    pub fn new(
        settings: ServerSettings,
        gateways: Arc<dyn GatewayFactory>,
        oauth: Arc<dyn OAuthExchange>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                settings,
                sessions: SessionStore::default(),
                gateways,
                oauth,
                telemetry,
            }),
        }
    }

    /// Assembles production state: Octocrab gateways, the reqwest OAuth
    /// client, and telemetry forwarded to `tracing`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a client
    /// cannot be built.
    pub fn from_config(config: &ReviewDeckConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let settings = ServerSettings::from_config(config)?;
        let gateways = OctocrabGatewayFactory::new(&config.github_api_base)?;
        let oauth = GitHubOAuthClient::new(settings.oauth.clone())?;
        Ok(Self::new(
            settings,
            Arc::new(gateways),
            Arc::new(oauth),
            Arc::new(TracingTelemetrySink),
        ))
    }

    /// HTTP settings.
    #[must_use]
    pub fn settings(&self) -> &ServerSettings {
        &self.shared.settings
    }

    /// Session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.shared.sessions
    }

    /// OAuth code exchange.
    #[must_use]
    pub fn oauth(&self) -> &dyn OAuthExchange {
        self.shared.oauth.as_ref()
    }

    /// Telemetry sink.
    #[must_use]
    pub fn telemetry(&self) -> &dyn TelemetrySink {
        self.shared.telemetry.as_ref()
    }

    /// Builds a gateway authenticated with the session's token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::GitHub`] when the gateway cannot be built.
    pub fn gateway_for(&self, credential: &Credential) -> Result<Arc<dyn GitHubGateway>, ApiError> {
        self.gateway_for_token(credential.token())
    }

    /// Builds a gateway authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::GitHub`] when the gateway cannot be built.
    pub fn gateway_for_token(
        &self,
        token: &AccessToken,
    ) -> Result<Arc<dyn GitHubGateway>, ApiError> {
        self.shared.gateways.connect(token).map_err(ApiError::from)
    }

    /// Builds an intake over `gateway` with the configured settings.
    #[must_use]
    pub fn intake<'state>(
        &'state self,
        gateway: &'state dyn GitHubGateway,
    ) -> DashboardIntake<'state, dyn GitHubGateway + 'state> {
        DashboardIntake::new(
            gateway,
            &self.shared.settings.intake,
            self.shared.telemetry.as_ref(),
        )
    }

    /// Forgets the session after GitHub rejected its token.
    pub async fn invalidate(&self, credential: &Credential, operation: &str) {
        if self.sessions().destroy(&credential.session).await {
            tracing::warn!("GitHub rejected the session token during {operation}");
            self.telemetry().record(TelemetryEvent::SessionInvalidated {
                operation: operation.to_owned(),
            });
        }
    }

    /// Passes `result` through, invalidating the session first when the
    /// failure means GitHub rejected its token.
    ///
    /// # Errors
    ///
    /// Returns the failure converted to [`ApiError`].
    pub async fn settle<T>(
        &self,
        credential: &Credential,
        operation: &str,
        result: Result<T, GitHubError>,
    ) -> Result<T, ApiError> {
        if result.as_ref().is_err_and(GitHubError::is_authentication) {
            self.invalidate(credential, operation).await;
        }
        result.map_err(ApiError::from)
    }
}

/// The session id and token of an authenticated request.
///
/// Extracting it fails with [`ApiError::NotAuthenticated`] when the request
/// has no session cookie or the session is no longer live.
#[derive(Debug, Clone)]
pub struct Credential {
    session: SessionId,
    token: AccessToken,
}

impl Credential {
    /// Session the token belongs to.
    #[must_use]
    pub const fn session(&self) -> SessionId {
        self.session
    }

    /// Token used for GitHub calls.
    #[must_use]
    pub const fn token(&self) -> &AccessToken {
        &self.token
    }
}

impl axum::extract::FromRequestParts<AppState> for Credential {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state
            .settings()
            .cookies
            .session_id(&parts.headers)
            .ok_or(ApiError::NotAuthenticated)?;
        let token = state
            .sessions()
            .token(&session)
            .await
            .ok_or(ApiError::NotAuthenticated)?;
        Ok(Self { session, token })
    }
}
