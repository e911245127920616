//! Translation of Octocrab failures into [`GitHubError`].
//!
//! Only a 401 means the token itself is unusable. A 403 is either a spent
//! quota or a permission gap on one repository, and the latter must not sign
//! the user out.

use http::StatusCode;

use crate::github::error::GitHubError;

/// What an Octocrab failure means for whoever holds the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailureKind {
    /// GitHub refused the token.
    TokenRejected,
    /// The quota for the token is spent.
    RateLimited,
    /// GitHub was not reached or the connection broke.
    Transport,
    /// GitHub answered with some other failure.
    Upstream,
}

pub(super) fn classify(error: &octocrab::Error) -> FailureKind {
    match error {
        octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
            FailureKind::RateLimited
        }
        octocrab::Error::GitHub { source, .. }
            if source.status_code == StatusCode::UNAUTHORIZED =>
        {
            FailureKind::TokenRejected
        }
        octocrab::Error::Http { .. }
        | octocrab::Error::Hyper { .. }
        | octocrab::Error::Service { .. } => FailureKind::Transport,
        _ => FailureKind::Upstream,
    }
}

/// Quota exhaustion arrives as 403 or 429 and names the rate limit in either
/// the message or the documentation link.
fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    if !matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) {
        return false;
    }
    source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"))
}

pub(super) fn describe(operation: &str, error: &octocrab::Error) -> String {
    match error {
        octocrab::Error::GitHub { source, .. } => format!(
            "{operation} failed: GitHub returned {status} {message}",
            status = source.status_code,
            message = source.message
        ),
        _ => format!("{operation} failed: {error}"),
    }
}

/// Maps an Octocrab failure onto the gateway taxonomy.
///
/// Rate limit errors carry no reset window here; the gateway fills it in
/// with a follow-up request.
pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GitHubError {
    let message = describe(operation, error);
    match classify(error) {
        FailureKind::TokenRejected => GitHubError::Authentication { message },
        FailureKind::RateLimited => GitHubError::RateLimitExceeded {
            rate_limit: None,
            message,
        },
        FailureKind::Transport => GitHubError::Network { message },
        FailureKind::Upstream => GitHubError::Api { message },
    }
}
