//! Octocrab client construction for gateway implementations.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GitHubError;
use crate::github::locator::AccessToken;

use super::error_mapping::map_octocrab_error;

/// Parses and checks the configured API base URL.
///
/// # Errors
///
/// Returns `GitHubError::InvalidUrl` when the URL cannot be parsed or lacks
/// a scheme or host.
pub(super) fn parse_api_base(api_base: &str) -> Result<Uri, GitHubError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;
    if base_uri.scheme().is_none() || base_uri.host().is_none() {
        return Err(GitHubError::InvalidUrl(format!(
            "`{api_base}` must be an absolute URL"
        )));
    }
    Ok(base_uri)
}

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns `GitHubError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &AccessToken,
    base_uri: Uri,
) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.value())
        .base_uri(base_uri)
        .map_err(|error| GitHubError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
