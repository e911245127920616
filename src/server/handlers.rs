//! Authenticated REST endpoints.
//!
//! Each handler builds a gateway for the caller's token, runs one intake
//! operation, and lets [`AppState::settle`] drop the token if GitHub
//! rejected it.

use axum::Json;
use axum::extract::{Path, Query, State};

use crate::analytics::{AnalyticsReport, ScopeFilter};
use crate::github::{
    AuthenticatedUser, DashboardStats, PullRequestLocator, PullRequestRecord, RepositorySummary,
    ReviewDetails,
};

use super::error::ApiError;
use super::state::{AppState, Credential};

/// `GET /api/user`: the signed-in user's profile.
///
/// # Errors
///
/// Returns [`ApiError`] when GitHub cannot be reached or rejects the token.
pub async fn user(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<Json<AuthenticatedUser>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    let result = gateway.authenticated_user().await;
    state
        .settle(&credential, "fetch user", result)
        .await
        .map(Json)
}

/// `GET /api/repositories`: recently updated repositories with open pull
/// request counts.
///
/// # Errors
///
/// Returns [`ApiError`] when the repository listing fails.
pub async fn repositories(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<Json<Vec<RepositorySummary>>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    let result = state.intake(gateway.as_ref()).repositories().await;
    state
        .settle(&credential, "list repositories", result)
        .await
        .map(Json)
}

/// `GET /api/pull-requests?repo=&owner=`: pull request records, most
/// recently updated first.
///
/// # Errors
///
/// Returns [`ApiError`] when the collection cannot run.
pub async fn pull_requests(
    State(state): State<AppState>,
    credential: Credential,
    Query(scope): Query<ScopeFilter>,
) -> Result<Json<Vec<PullRequestRecord>>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    let result = state.intake(gateway.as_ref()).pull_requests(&scope).await;
    state
        .settle(&credential, "list pull requests", result)
        .await
        .map(Json)
}

/// `GET /api/pull-requests/{owner}/{repo}/{number}/reviews`: reviews and
/// comments of one pull request.
///
/// # Errors
///
/// Returns 400 for malformed path segments, otherwise [`ApiError`] from the
/// listings.
pub async fn reviews(
    State(state): State<AppState>,
    credential: Credential,
    Path((owner, repo, number)): Path<(String, String, String)>,
) -> Result<Json<ReviewDetails>, ApiError> {
    let locator = PullRequestLocator::from_parts(&owner, &repo, &number)?;
    let gateway = state.gateway_for(&credential)?;
    let result = state.intake(gateway.as_ref()).review_details(&locator).await;
    state
        .settle(&credential, "load reviews", result)
        .await
        .map(Json)
}

/// `GET /api/stats`: headline pull request totals.
///
/// # Errors
///
/// Returns [`ApiError`] when the collection cannot run.
pub async fn stats(
    State(state): State<AppState>,
    credential: Credential,
) -> Result<Json<DashboardStats>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    let result = state.intake(gateway.as_ref()).stats().await;
    state
        .settle(&credential, "compute stats", result)
        .await
        .map(Json)
}

/// `GET /api/analytics?repo=&owner=`: the analytics report.
///
/// # Errors
///
/// Returns [`ApiError`] when the collection cannot run.
pub async fn analytics(
    State(state): State<AppState>,
    credential: Credential,
    Query(scope): Query<ScopeFilter>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let gateway = state.gateway_for(&credential)?;
    let result = state.intake(gateway.as_ref()).analytics(&scope).await;
    state
        .settle(&credential, "compute analytics", result)
        .await
        .map(Json)
}
