//! Gateways for loading dashboard data through Octocrab.
//!
//! The trait-based design lets handlers and the intake run against mocks in
//! tests while [`OctocrabGateway`] performs the real HTTP requests. Gateways
//! are created per request from an explicit [`AccessToken`] by a
//! [`GatewayFactory`]; nothing here reads ambient credentials.

mod client;
mod error_mapping;
mod params;
mod rest;


use std::sync::Arc;

use async_trait::async_trait;

pub use params::{
    ListPullRequestsParams, ListRepositoriesParams, PullRequestSort, RepositorySort,
    SortDirection, StateFilter,
};
pub use rest::{OctocrabGateway, OctocrabGatewayFactory};

use crate::github::error::GitHubError;
use crate::github::locator::{AccessToken, PullRequestLocator, RepositoryLocator};
use crate::github::models::{AuthenticatedUser, IssueComment, PullRequest, Repository, Review};

/// Read-only GitHub operations the dashboard needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubGateway: Send + Sync {
    /// Fetch the user the token belongs to.
    async fn authenticated_user(&self) -> Result<AuthenticatedUser, GitHubError>;

    /// List one page of repositories visible to the user.
    async fn list_repositories(
        &self,
        params: &ListRepositoriesParams,
    ) -> Result<Vec<Repository>, GitHubError>;

    /// List one page of pull requests for a repository.
    async fn list_pull_requests(
        &self,
        locator: &RepositoryLocator,
        params: &ListPullRequestsParams,
    ) -> Result<Vec<PullRequest>, GitHubError>;

    /// Fetch every issue comment on a pull request.
    async fn list_issue_comments(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<IssueComment>, GitHubError>;

    /// Fetch every submitted review on a pull request.
    async fn list_reviews(&self, locator: &PullRequestLocator)
    -> Result<Vec<Review>, GitHubError>;
}

/// Builds a gateway bound to one access token.
#[cfg_attr(test, mockall::automock)]
pub trait GatewayFactory: Send + Sync {
    /// Creates a gateway that authenticates with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the underlying client cannot be built.
    fn connect(&self, token: &AccessToken) -> Result<Arc<dyn GitHubGateway>, GitHubError>;
}
