//! High-level intake facade used by the HTTP handlers.
//!
//! [`DashboardIntake`] turns gateway calls into the records the dashboard
//! serves. Collections that span repositories are best effort: a repository
//! whose calls fail is logged, reported to telemetry, and left out, unless
//! the failure means the credential itself is unusable.

use crate::analytics::{
    AnalyticsReport, ScopeFilter, StatusCounts, aggregate, rounded_percentage,
};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::ai_review::{AiReviewMarker, classify_review_details};
use super::error::GitHubError;
use super::gateway::{
    GitHubGateway, ListPullRequestsParams, ListRepositoriesParams, PullRequestSort,
    RepositorySort, SortDirection, StateFilter,
};
use super::locator::{PullRequestLocator, PullRequestNumber, RepositoryLocator};
use super::models::{
    DashboardStats, PullRequestRecord, Repository, RepositorySummary, ReviewDetails,
};

/// Repositories shown on the repository listing.
const LISTING_PAGE_SIZE: u8 = 30;
/// Repositories fetched before the collection limit applies.
const COLLECTION_REPOSITORY_PAGE_SIZE: u8 = 100;
/// Pull requests fetched per repository for the dashboard list.
const PULL_REQUEST_PAGE_SIZE: u8 = 50;
/// Pull requests fetched per repository for headline statistics.
const STATS_PULL_REQUEST_PAGE_SIZE: u8 = 100;
/// Open pull requests fetched when counting them for the listing.
const OPEN_COUNT_PAGE_SIZE: u8 = 100;

/// Tunables for the intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    /// Marker that flags a pull request as AI-reviewed.
    pub marker: AiReviewMarker,
    /// Repositories examined by multi-repository collections.
    pub repository_limit: usize,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            marker: AiReviewMarker::default(),
            repository_limit: 20,
        }
    }
}

/// Pull request records with the repository total they were drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Repositories listed for the user, before the limit applies.
    pub repositories_listed: usize,
    /// Records, most recently updated first.
    pub records: Vec<PullRequestRecord>,
}

/// Aggregates dashboard data using a gateway.
pub struct DashboardIntake<'client, Gateway>
where
    Gateway: GitHubGateway + ?Sized,
{
    client: &'client Gateway,
    settings: &'client IntakeSettings,
    telemetry: &'client dyn TelemetrySink,
}

impl<'client, Gateway> DashboardIntake<'client, Gateway>
where
    Gateway: GitHubGateway + ?Sized,
{
    /// Create a new intake facade using the provided gateway.
    #[must_use]
    pub const fn new(
        client: &'client Gateway,
        settings: &'client IntakeSettings,
        telemetry: &'client dyn TelemetrySink,
    ) -> Self {
        Self {
            client,
            settings,
            telemetry,
        }
    }

    /// Repositories most recently updated first, each with its open pull
    /// request count.
    ///
    /// A failing count is logged and reported as zero.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the repository listing itself fails.
    pub async fn repositories(&self) -> Result<Vec<RepositorySummary>, GitHubError> {
        let params = ListRepositoriesParams {
            sort: Some(RepositorySort::Updated),
            page: 1,
            per_page: LISTING_PAGE_SIZE,
        };
        let repositories = self.client.list_repositories(&params).await?;

        let mut summaries = Vec::with_capacity(repositories.len());
        for repository in repositories {
            let open_prs_count = self.open_pull_request_count(&repository).await;
            summaries.push(RepositorySummary {
                repository,
                open_prs_count,
            });
        }
        Ok(summaries)
    }

    /// Pull request records across the user's first repositories, narrowed
    /// to `scope`, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the repository listing fails or GitHub
    /// rejects the credential or rate limits it part way through.
    pub async fn pull_requests(
        &self,
        scope: &ScopeFilter,
    ) -> Result<Vec<PullRequestRecord>, GitHubError> {
        Ok(self.collect(scope).await?.records)
    }

    /// Runs the analytics engine over the user's pull requests.
    ///
    /// Records are collected for every repository so the best-repository
    /// ranking sees the whole collection; `scope` narrows everything else.
    ///
    /// # Errors
    ///
    /// Propagates collection failures, as [`Self::pull_requests`].
    pub async fn analytics(&self, scope: &ScopeFilter) -> Result<AnalyticsReport, GitHubError> {
        let collection = self.collect(&ScopeFilter::all()).await?;
        Ok(aggregate(
            &collection.records,
            scope,
            Some(collection.repositories_listed),
        ))
    }

    /// Reviews and issue comments for one pull request, with the comments
    /// split into automated and human.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when either listing fails.
    pub async fn review_details(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<ReviewDetails, GitHubError> {
        let reviews = self.client.list_reviews(locator).await?;
        let comments = self.client.list_issue_comments(locator).await?;
        Ok(classify_review_details(
            reviews,
            comments,
            &self.settings.marker,
        ))
    }

    /// Headline totals across the user's first repositories.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError`] when the repository listing fails or GitHub
    /// rejects the credential or rate limits it part way through.
    pub async fn stats(&self) -> Result<DashboardStats, GitHubError> {
        let repositories = self.collection_repositories().await?;
        let params = ListPullRequestsParams {
            state: StateFilter::All,
            sort: None,
            direction: None,
            page: 1,
            per_page: STATS_PULL_REQUEST_PAGE_SIZE,
        };

        let mut counts = StatusCounts::default();
        for repository in repositories.iter().take(self.settings.repository_limit) {
            let Some(locator) = self.locator_for(repository) else {
                continue;
            };
            match self.client.list_pull_requests(&locator, &params).await {
                Ok(pulls) => {
                    for pull in &pulls {
                        counts.record(pull.effective_status());
                    }
                }
                Err(error) => self.skip_repository(repository, error)?,
            }
        }

        let total = counts.total();
        Ok(DashboardStats {
            total_prs: total,
            open_prs: counts.open,
            merged_prs: counts.merged,
            closed_prs: counts.closed,
            acceptance_rate: rounded_percentage(counts.merged, total),
            active_repos: repositories.len(),
        })
    }

    async fn collect(&self, scope: &ScopeFilter) -> Result<Collection, GitHubError> {
        let repositories = self.collection_repositories().await?;
        let params = ListPullRequestsParams {
            state: StateFilter::All,
            sort: Some(PullRequestSort::Updated),
            direction: Some(SortDirection::Desc),
            page: 1,
            per_page: PULL_REQUEST_PAGE_SIZE,
        };

        let mut records = Vec::new();
        let mut visited = 0_usize;
        for repository in repositories
            .iter()
            .take(self.settings.repository_limit)
            .filter(|repository| scope.matches_repository(&repository.name, &repository.owner))
        {
            let Some(locator) = self.locator_for(repository) else {
                continue;
            };
            match self.repository_records(repository, &locator, &params).await {
                Ok(found) => {
                    visited += 1;
                    records.extend(found);
                }
                Err(error) => self.skip_repository(repository, error)?,
            }
        }

        records.sort_by(|left, right| {
            right
                .updated_at
                .parsed()
                .cmp(&left.updated_at.parsed())
        });
        self.telemetry.record(TelemetryEvent::PullRequestsCollected {
            repositories: visited,
            pull_requests: records.len(),
        });
        Ok(Collection {
            repositories_listed: repositories.len(),
            records,
        })
    }

    async fn repository_records(
        &self,
        repository: &Repository,
        locator: &RepositoryLocator,
        params: &ListPullRequestsParams,
    ) -> Result<Vec<PullRequestRecord>, GitHubError> {
        let pulls = self.client.list_pull_requests(locator, params).await?;
        let mut records = Vec::with_capacity(pulls.len());
        for pull in pulls {
            let number = PullRequestNumber::new(pull.number)?;
            let pull_locator = PullRequestLocator::new(locator.clone(), number);
            let comments = self.client.list_issue_comments(&pull_locator).await?;
            let ai_reviewed = self.settings.marker.any_marked(&comments);
            records.push(pull.into_record(repository, ai_reviewed));
        }
        Ok(records)
    }

    async fn collection_repositories(&self) -> Result<Vec<Repository>, GitHubError> {
        let params = ListRepositoriesParams {
            sort: None,
            page: 1,
            per_page: COLLECTION_REPOSITORY_PAGE_SIZE,
        };
        self.client.list_repositories(&params).await
    }

    async fn open_pull_request_count(&self, repository: &Repository) -> usize {
        let Some(locator) = self.locator_for(repository) else {
            return 0;
        };
        let params = ListPullRequestsParams {
            per_page: OPEN_COUNT_PAGE_SIZE,
            ..ListPullRequestsParams::default()
        };
        match self.client.list_pull_requests(&locator, &params).await {
            Ok(pulls) => pulls.len(),
            Err(error) => {
                tracing::warn!(
                    "failed to count open pull requests for {name}: {error}",
                    name = repository.full_name
                );
                0
            }
        }
    }

    fn locator_for(&self, repository: &Repository) -> Option<RepositoryLocator> {
        match RepositoryLocator::from_owner_repo(&repository.owner, &repository.name) {
            Ok(locator) => Some(locator),
            Err(error) => {
                self.telemetry.record(TelemetryEvent::RepositorySkipped {
                    repository: repository.full_name.clone(),
                    reason: error.to_string(),
                });
                None
            }
        }
    }

    /// Records a per-repository failure, or hands it back when it should end
    /// the whole collection.
    fn skip_repository(
        &self,
        repository: &Repository,
        error: GitHubError,
    ) -> Result<(), GitHubError> {
        if error.aborts_collection() {
            return Err(error);
        }
        tracing::warn!(
            "skipping pull requests for {name}: {error}",
            name = repository.full_name
        );
        self.telemetry.record(TelemetryEvent::RepositorySkipped {
            repository: repository.full_name.clone(),
            reason: error.to_string(),
        });
        Ok(())
    }
}
