//! reviewdeck: the backend of a GitHub pull request dashboard.
//!
//! The library wraps Octocrab to collect the signed-in user's repositories,
//! pull requests, and review comments, flags pull requests that carry an
//! AI-review marker, aggregates the collection into chart-ready analytics,
//! and serves it all over an OAuth-gated HTTP API.
//!
//! - [`github`]: typed GitHub access and the dashboard intake.
//! - [`analytics`]: the pure aggregation engine.
//! - [`server`]: the axum router, sessions, and OAuth flow.
//! - [`config`]: layered configuration.
//! - [`telemetry`]: structured operational events.

pub mod analytics;
pub mod config;
pub mod github;
pub mod server;
pub mod telemetry;

pub use analytics::{AnalyticsReport, ScopeFilter, aggregate};
pub use config::ReviewDeckConfig;
pub use github::{
    AccessToken, DashboardIntake, GitHubError, OctocrabGateway, OctocrabGatewayFactory,
    PullRequestLocator, PullRequestRecord,
};
