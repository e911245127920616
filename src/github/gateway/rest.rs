//! Octocrab implementation of the dashboard gateway.

use std::sync::Arc;

use async_trait::async_trait;
use http::Uri;
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;

use crate::github::error::GitHubError;
use crate::github::locator::{AccessToken, PullRequestLocator, RepositoryLocator};
use crate::github::models::{
    ApiAuthenticatedUser, ApiComment, ApiPullRequest, ApiRepository, ApiReview, AuthenticatedUser,
    IssueComment, PullRequest, Repository, Review,
};
use crate::github::rate_limit::RateLimitInfo;

use super::client::{build_octocrab_client, parse_api_base};
use super::error_mapping::{FailureKind, classify, describe, map_octocrab_error};
use super::params::{ListPullRequestsParams, ListRepositoriesParams};
use super::{GatewayFactory, GitHubGateway};

/// Octocrab-backed gateway bound to one access token.
pub struct OctocrabGateway {
    client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URL cannot be parsed
    /// or `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &AccessToken, api_base: &str) -> Result<Self, GitHubError> {
        let base_uri = parse_api_base(api_base)?;
        Ok(Self::new(build_octocrab_client(token, base_uri)?))
    }

    async fn get_page<T>(
        &self,
        operation: &str,
        route: String,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>, GitHubError>
    where
        T: DeserializeOwned,
    {
        match self.client.get(route, Some(&query)).await {
            Ok(page) => Ok(page),
            Err(error) => Err(self.map_error(operation, &error).await),
        }
    }

    async fn get_all_pages<T>(&self, operation: &str, route: String) -> Result<Vec<T>, GitHubError>
    where
        T: DeserializeOwned,
    {
        let first: Page<T> = match self.client.get(route, None::<&()>).await {
            Ok(page) => page,
            Err(error) => return Err(self.map_error(operation, &error).await),
        };
        match self.client.all_pages(first).await {
            Ok(items) => Ok(items),
            Err(error) => Err(self.map_error(operation, &error).await),
        }
    }

    async fn map_error(&self, operation: &str, error: &octocrab::Error) -> GitHubError {
        if classify(error) != FailureKind::RateLimited {
            return map_octocrab_error(operation, error);
        }
        let rate_limit = self.fetch_rate_limit_info().await;
        let base_message = describe(operation, error);
        let message = match &rate_limit {
            Some(info) => format!(
                "{base_message} (resets at {reset})",
                reset = info.reset_at()
            ),
            None => base_message,
        };
        GitHubError::RateLimitExceeded {
            rate_limit,
            message,
        }
    }

    async fn fetch_rate_limit_info(&self) -> Option<RateLimitInfo> {
        let rate = self.client.ratelimit().get().await.ok()?.rate;
        RateLimitInfo::from_rate(rate.limit, rate.remaining, rate.reset)
    }
}

#[async_trait]
impl GitHubGateway for OctocrabGateway {
    async fn authenticated_user(&self) -> Result<AuthenticatedUser, GitHubError> {
        match self
            .client
            .get::<ApiAuthenticatedUser, _, _>("/user", None::<&()>)
            .await
        {
            Ok(user) => Ok(user.into()),
            Err(error) => Err(self.map_error("authenticated user", &error).await),
        }
    }

    async fn list_repositories(
        &self,
        params: &ListRepositoriesParams,
    ) -> Result<Vec<Repository>, GitHubError> {
        params.validate()?;
        let page: Page<ApiRepository> = self
            .get_page("list repositories", "/user/repos".to_owned(), &params.query())
            .await?;
        Ok(page.items.into_iter().map(ApiRepository::into).collect())
    }

    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &ListPullRequestsParams,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        params.validate()?;
        let page: Page<ApiPullRequest> = self
            .get_page("list pulls", locator.pulls_path(), &params.query())
            .await?;
        Ok(page.items.into_iter().map(ApiPullRequest::into).collect())
    }

    async fn list_issue_comments(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        let comments: Vec<ApiComment> = self
            .get_all_pages("issue comments", locator.comments_path())
            .await?;
        Ok(comments.into_iter().map(ApiComment::into).collect())
    }

    async fn list_reviews(&self, locator: &PullRequestLocator) -> Result<Vec<Review>, GitHubError> {
        let reviews: Vec<ApiReview> = self
            .get_all_pages("pull request reviews", locator.reviews_path())
            .await?;
        Ok(reviews.into_iter().map(ApiReview::into).collect())
    }
}

/// Creates [`OctocrabGateway`] instances against a fixed API base URL.
///
/// # Example
///
/// ```
/// use reviewdeck::github::gateway::OctocrabGatewayFactory;
///
/// let factory = OctocrabGatewayFactory::new("https://api.github.com")
///     .expect("the public API URL is valid");
/// assert_eq!(factory.api_base().host(), Some("api.github.com"));
/// ```
#[derive(Debug, Clone)]
pub struct OctocrabGatewayFactory {
    api_base: Uri,
}

impl OctocrabGatewayFactory {
    /// Validates the API base URL up front so per-request construction only
    /// fails for client-level reasons.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when `api_base` is not an absolute
    /// URL.
    pub fn new(api_base: &str) -> Result<Self, GitHubError> {
        Ok(Self {
            api_base: parse_api_base(api_base)?,
        })
    }

    /// The API base URL gateways are built against.
    #[must_use]
    pub const fn api_base(&self) -> &Uri {
        &self.api_base
    }
}

impl GatewayFactory for OctocrabGatewayFactory {
    fn connect(&self, token: &AccessToken) -> Result<Arc<dyn GitHubGateway>, GitHubError> {
        let client = build_octocrab_client(token, self.api_base.clone())?;
        Ok(Arc::new(OctocrabGateway::new(client)))
    }
}
