//! GitHub access for the dashboard.
//!
//! This module wraps Octocrab to list repositories, pull requests, issue
//! comments, and reviews on behalf of a signed-in user. Responses are
//! validated into typed records at this boundary and errors are mapped into
//! a small taxonomy so that the HTTP layer can choose a status code without
//! seeing Octocrab internals.

pub mod ai_review;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod locator;
pub mod models;
pub mod rate_limit;

pub use ai_review::AiReviewMarker;
pub use error::GitHubError;
pub use gateway::{GatewayFactory, GitHubGateway, OctocrabGateway, OctocrabGatewayFactory};
pub use intake::{DashboardIntake, IntakeSettings};
pub use locator::{
    AccessToken, PullRequestLocator, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner,
};
pub use models::{
    AuthenticatedUser, DashboardStats, PullRequestRecord, RepositorySummary, ReviewDetails,
};

#[cfg(test)]
pub use gateway::{MockGatewayFactory, MockGitHubGateway};
