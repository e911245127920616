//! HTTP error responses.
//!
//! Every failure a handler can return funnels through [`ApiError`], which
//! picks the status code and renders `{"error": message}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::header::RETRY_AFTER;
use http::{HeaderValue, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::github::GitHubError;

use super::auth::AuthError;

/// Failure returned by an HTTP handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carried no session, or the session has no token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// GitHub rejected the session's token while checking the login.
    #[error("Token invalid, please log in again.")]
    TokenRejected,

    /// A GitHub call or path parameter failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The OAuth flow failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    /// Status code reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated | Self::TokenRejected => StatusCode::UNAUTHORIZED,
            Self::GitHub(error) => github_status(error),
            Self::Auth(error) => error.status(),
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            Self::GitHub(GitHubError::RateLimitExceeded {
                rate_limit: Some(info),
                ..
            }) => Some(info.seconds_until_reset()),
            _ => None,
        }
    }
}

const fn github_status(error: &GitHubError) -> StatusCode {
    match error {
        GitHubError::Authentication { .. } | GitHubError::MissingToken => {
            StatusCode::UNAUTHORIZED
        }
        GitHubError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        GitHubError::Api { .. } | GitHubError::Network { .. } => StatusCode::BAD_GATEWAY,
        GitHubError::InvalidIdentifier { .. }
        | GitHubError::InvalidPullRequestNumber
        | GitHubError::InvalidPagination { .. } => StatusCode::BAD_REQUEST,
        GitHubError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }

        let body = Json(json!({ "error": self.to_string() }));
        let mut response = (status, body).into_response();
        if let Some(seconds) = self.retry_after() {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::github::rate_limit::RateLimitInfo;

    async fn body_json(response: Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[rstest]
    #[case::missing_session(ApiError::NotAuthenticated, StatusCode::UNAUTHORIZED)]
    #[case::rejected_token(ApiError::TokenRejected, StatusCode::UNAUTHORIZED)]
    #[case::bad_credentials(
        ApiError::GitHub(GitHubError::Authentication { message: "Bad credentials".to_owned() }),
        StatusCode::UNAUTHORIZED
    )]
    #[case::upstream_failure(
        ApiError::GitHub(GitHubError::Api { message: "boom".to_owned() }),
        StatusCode::BAD_GATEWAY
    )]
    #[case::network(
        ApiError::GitHub(GitHubError::Network { message: "reset".to_owned() }),
        StatusCode::BAD_GATEWAY
    )]
    #[case::bad_number(
        ApiError::GitHub(GitHubError::InvalidPullRequestNumber),
        StatusCode::BAD_REQUEST
    )]
    #[case::bad_base(
        ApiError::GitHub(GitHubError::InvalidUrl("relative".to_owned())),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::missing_code(ApiError::Auth(AuthError::MissingCode), StatusCode::BAD_REQUEST)]
    #[case::no_token(ApiError::Auth(AuthError::NoAccessToken), StatusCode::UNAUTHORIZED)]
    #[case::unconfigured(ApiError::Auth(AuthError::NotConfigured), StatusCode::INTERNAL_SERVER_ERROR)]
    fn errors_map_to_status_codes(#[case] error: ApiError, #[case] expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }

    #[tokio::test]
    async fn body_carries_the_error_message() {
        let response = ApiError::NotAuthenticated.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Not authenticated" })
        );
    }

    #[tokio::test]
    async fn rate_limit_sets_retry_after() {
        let error = ApiError::GitHub(GitHubError::RateLimitExceeded {
            rate_limit: Some(RateLimitInfo::new(5000, 0, u64::MAX)),
            message: "API rate limit exceeded".to_owned(),
        });

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .expect("Retry-After should be set");
        assert_ne!(retry_after, "0");
    }

    #[tokio::test]
    async fn rate_limit_without_reset_info_omits_retry_after() {
        let error = ApiError::GitHub(GitHubError::RateLimitExceeded {
            rate_limit: None,
            message: "secondary rate limit".to_owned(),
        });

        let response = error.into_response();

        assert!(response.headers().get(RETRY_AFTER).is_none());
    }
}
