//! Server configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.reviewdeck.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `REVIEWDECK_*`, with the legacy `PORT`,
//!    `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET`, and `GITHUB_REDIRECT_URI`
//!    consulted only when nothing else sets those values
//! 4. **Command-line arguments** – `--port`/`-p`, `--frontend-url`, and so on
//!
//! # Configuration File
//!
//! ```toml
//! port = 5000
//! frontend_url = "http://localhost:3000"
//! github_client_id = "Iv1.example"
//! github_redirect_uri = "http://localhost:5000/api/auth/github/callback"
//! max_repositories = 20
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::{AiReviewMarker, IntakeSettings};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_GITHUB_OAUTH_BASE: &str = "https://github.com";
const DEFAULT_STATIC_DIR: &str = "client-dist";
const DEFAULT_MAX_REPOSITORIES: usize = 20;
const DEFAULT_SESSION_COOKIE_NAME: &str = "reviewdeck.sid";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// ortho-config could not parse arguments or read a source.
    #[error("configuration error: {message}")]
    Load {
        /// Loader error description.
        message: String,
    },

    /// The listening port resolved to zero.
    #[error("port must be greater than zero")]
    ZeroPort,

    /// A legacy environment value could not be parsed.
    #[error("{variable} is not a valid port: {value}")]
    InvalidLegacyPort {
        /// Environment variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
    },

    /// Collections would examine no repositories.
    #[error("max_repositories must be greater than zero")]
    ZeroRepositoryLimit,

    /// The AI review marker is empty or whitespace.
    #[error("ai_review_marker must not be blank")]
    BlankMarker,

    /// The session cookie name is empty or whitespace.
    #[error("session_cookie_name must not be blank")]
    BlankCookieName,
}

/// Server configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use reviewdeck::ReviewDeckConfig;
///
/// let config = ReviewDeckConfig::load().expect("failed to load configuration");
/// config.validate().expect("configuration should be consistent");
/// let port = config.resolve_port().expect("port should resolve");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEWDECK",
    discovery(
        dotfile_name = ".reviewdeck.toml",
        config_file_name = "reviewdeck.toml",
        app_name = "reviewdeck"
    )
)]
pub struct ReviewDeckConfig {
    /// Address the HTTP listener binds to.
    #[ortho_config(cli_short = 'b')]
    pub bind_address: String,

    /// Port the HTTP listener binds to.
    ///
    /// Can be provided via:
    /// - CLI: `--port <PORT>` or `-p <PORT>`
    /// - Environment: `REVIEWDECK_PORT` or `PORT` (legacy)
    /// - Config file: `port = 5000`
    #[ortho_config(cli_short = 'p')]
    pub port: Option<u16>,

    /// Origin of the dashboard frontend. CORS admits only this origin and
    /// the OAuth callback redirects here.
    #[ortho_config()]
    pub frontend_url: String,

    /// OAuth application client id.
    ///
    /// Falls back to the legacy `GITHUB_CLIENT_ID` variable.
    #[ortho_config()]
    pub github_client_id: Option<String>,

    /// OAuth application client secret.
    ///
    /// Falls back to the legacy `GITHUB_CLIENT_SECRET` variable.
    #[ortho_config()]
    pub github_client_secret: Option<String>,

    /// Callback URL registered with the OAuth application.
    ///
    /// Falls back to the legacy `GITHUB_REDIRECT_URI` variable.
    #[ortho_config()]
    pub github_redirect_uri: Option<String>,

    /// Base URL of the GitHub REST API.
    #[ortho_config()]
    pub github_api_base: String,

    /// Base URL of the GitHub OAuth endpoints.
    #[ortho_config()]
    pub github_oauth_base: String,

    /// Directory holding the built frontend.
    #[ortho_config()]
    pub static_dir: String,

    /// Case-insensitive comment text that flags a pull request as
    /// AI-reviewed.
    #[ortho_config()]
    pub ai_review_marker: String,

    /// Repositories examined by pull request collections.
    #[ortho_config()]
    pub max_repositories: usize,

    /// Name of the session cookie.
    #[ortho_config()]
    pub session_cookie_name: String,

    /// Adds the `Secure` attribute to the session cookie.
    ///
    /// Note: ortho-config does not load booleans from the environment, so
    /// set this through the CLI (`--cookie-secure`) or a config file.
    #[ortho_config()]
    pub cookie_secure: bool,
}

impl Default for ReviewDeckConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            port: None,
            frontend_url: DEFAULT_FRONTEND_URL.to_owned(),
            github_client_id: None,
            github_client_secret: None,
            github_redirect_uri: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_owned(),
            github_oauth_base: DEFAULT_GITHUB_OAUTH_BASE.to_owned(),
            static_dir: DEFAULT_STATIC_DIR.to_owned(),
            ai_review_marker: crate::github::ai_review::DEFAULT_AI_REVIEW_MARKER.to_owned(),
            max_repositories: DEFAULT_MAX_REPOSITORIES,
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_owned(),
            cookie_secure: false,
        }
    }
}

/// Client credentials and endpoints for the OAuth exchange, each
/// possibly absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OAuthClientSettings {
    /// OAuth application client id.
    pub client_id: Option<String>,
    /// OAuth application client secret.
    pub client_secret: Option<String>,
    /// Registered callback URL.
    pub redirect_uri: Option<String>,
    /// Base URL of the OAuth endpoints, without a trailing slash.
    pub oauth_base: String,
}

impl std::fmt::Debug for OAuthClientSettings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("OAuthClientSettings")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("oauth_base", &self.oauth_base)
            .finish()
    }
}

impl ReviewDeckConfig {
    /// Resolves the listening port from configuration or the legacy `PORT`
    /// environment variable, falling back to 5000.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLegacyPort`] when `PORT` is set but is
    /// not a valid port number.
    pub fn resolve_port(&self) -> Result<u16, ConfigError> {
        if let Some(port) = self.port {
            return Ok(port);
        }
        match env::var("PORT") {
            Ok(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidLegacyPort {
                    variable: "PORT",
                    value,
                }),
            Err(_) => Ok(DEFAULT_PORT),
        }
    }

    /// Resolves the OAuth client settings, consulting the legacy `GITHUB_*`
    /// variables for values left unset. Blank values count as unset.
    #[must_use]
    pub fn oauth_client(&self) -> OAuthClientSettings {
        OAuthClientSettings {
            client_id: resolve_legacy(self.github_client_id.as_deref(), "GITHUB_CLIENT_ID"),
            client_secret: resolve_legacy(
                self.github_client_secret.as_deref(),
                "GITHUB_CLIENT_SECRET",
            ),
            redirect_uri: resolve_legacy(
                self.github_redirect_uri.as_deref(),
                "GITHUB_REDIRECT_URI",
            ),
            oauth_base: self.github_oauth_base.trim_end_matches('/').to_owned(),
        }
    }

    /// Builds the intake tunables described by this configuration.
    #[must_use]
    pub fn intake_settings(&self) -> IntakeSettings {
        IntakeSettings {
            marker: AiReviewMarker::new(self.ai_review_marker.trim()),
            repository_limit: self.max_repositories,
        }
    }

    /// Validates values that ortho-config cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a zero or unparseable port, a zero
    /// repository limit, a blank AI review marker, or a blank cookie name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolve_port()? == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.max_repositories == 0 {
            return Err(ConfigError::ZeroRepositoryLimit);
        }
        if self.ai_review_marker.trim().is_empty() {
            return Err(ConfigError::BlankMarker);
        }
        if self.session_cookie_name.trim().is_empty() {
            return Err(ConfigError::BlankCookieName);
        }
        Ok(())
    }
}

fn resolve_legacy(configured: Option<&str>, variable: &str) -> Option<String> {
    configured
        .map(str::to_owned)
        .or_else(|| env::var(variable).ok())
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests;
