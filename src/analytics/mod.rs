//! Pull request analytics for the dashboard.
//!
//! [`aggregate`] turns a collection of [`PullRequestRecord`] values into an
//! [`AnalyticsReport`] holding headline counts and chart-ready series. The
//! computation is pure: it performs no I/O, holds no state between calls, and
//! never fails. Missing authors and repositories fall into the
//! [`UNKNOWN_SENTINEL`](crate::github::models::UNKNOWN_SENTINEL) bucket,
//! unparseable timestamps drop out of the time-based statistics, and an empty
//! collection yields a report with every count at zero.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::github::models::PullRequestRecord;

mod breakdown;
mod format;
mod leaderboard;
mod scope;
mod timeline;


pub use breakdown::{NamedValue, StatusCounts, outcome_label, status_label};
pub use format::{NO_DATA, format_duration, rounded_percentage};
pub use leaderboard::{BestRepository, Contributor, RepositoryCount, TOP_CONTRIBUTOR_LIMIT};
pub use scope::ScopeFilter;
pub use timeline::{ResponseTimeStats, TimelinePoint};

/// Everything the analytics view renders for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    /// Records in scope.
    #[serde(rename = "totalPRs")]
    pub total_prs: usize,
    /// Open, unmerged records.
    #[serde(rename = "openPRs")]
    pub open_prs: usize,
    /// Merged records.
    #[serde(rename = "mergedPRs")]
    pub merged_prs: usize,
    /// Closed, unmerged records.
    #[serde(rename = "closedPRs")]
    pub closed_prs: usize,
    /// Distinct repositories in scope.
    pub active_repos: usize,
    /// AI-reviewed records in scope.
    pub ai_reviewed_count: usize,
    /// Rounded percentage of AI-reviewed records.
    pub ai_coverage: u8,
    /// Status histogram.
    pub status_distribution: Vec<NamedValue>,
    /// Records created per day.
    pub pr_timeline: Vec<TimelinePoint>,
    /// AI-reviewed records per day of their qualifying update.
    pub ai_timeline: Vec<TimelinePoint>,
    /// Time from opening to the AI-review update.
    pub ai_response_time: ResponseTimeStats,
    /// Status histogram relabelled as review outcomes.
    pub sentiment: Vec<NamedValue>,
    /// Authors with the most pull requests.
    pub top_contributors: Vec<Contributor>,
    /// Pull requests per repository, largest first.
    pub repositories: Vec<RepositoryCount>,
    /// Repository with the most merged pull requests across the whole
    /// collection, regardless of scope.
    pub best_repository: Option<BestRepository>,
}

/// Builds the analytics report for `scope`.
///
/// `fallback_active_repositories` is reported as the active repository count
/// when the unfiltered collection is empty, typically the repository total
/// from the dashboard statistics.
///
/// # Examples
///
/// ```
/// use reviewdeck::analytics::{ScopeFilter, aggregate};
/// use reviewdeck::github::models::test_support::RecordBuilder;
///
/// let records = vec![
///     RecordBuilder::new(1, "widgets").merged().build(),
///     RecordBuilder::new(2, "widgets").build(),
/// ];
/// let report = aggregate(&records, &ScopeFilter::all(), None);
/// assert_eq!(report.total_prs, 2);
/// assert_eq!(report.merged_prs, 1);
/// assert_eq!(report.active_repos, 1);
/// ```
#[must_use]
pub fn aggregate(
    records: &[PullRequestRecord],
    scope: &ScopeFilter,
    fallback_active_repositories: Option<usize>,
) -> AnalyticsReport {
    let in_scope: Vec<&PullRequestRecord> =
        records.iter().filter(|record| scope.matches(record)).collect();

    let counts = StatusCounts::tally(in_scope.iter().copied());
    let total = counts.total();
    let ai_reviewed_count = in_scope.iter().filter(|record| record.ai_reviewed).count();

    let distinct_repositories: HashSet<&str> = in_scope
        .iter()
        .map(|record| record.repository_key())
        .collect();
    let active_repos = if distinct_repositories.is_empty() && !scope.is_active() {
        fallback_active_repositories.unwrap_or_default()
    } else {
        distinct_repositories.len()
    };

    let samples = timeline::response_samples(in_scope.iter().copied());
    let response_millis: Vec<u64> = samples.iter().map(|sample| sample.millis).collect();

    AnalyticsReport {
        total_prs: total,
        open_prs: counts.open,
        merged_prs: counts.merged,
        closed_prs: counts.closed,
        active_repos,
        ai_reviewed_count,
        ai_coverage: rounded_percentage(ai_reviewed_count, total),
        status_distribution: counts.distribution(),
        pr_timeline: timeline::daily_counts(in_scope.iter().map(|record| record.created_at.day())),
        ai_timeline: timeline::daily_counts(samples.iter().map(|sample| sample.day)),
        ai_response_time: ResponseTimeStats::from_millis(&response_millis),
        sentiment: counts.outcome_breakdown(),
        top_contributors: leaderboard::top_contributors(&in_scope),
        repositories: leaderboard::repository_counts(&in_scope),
        best_repository: leaderboard::best_repository(records),
    }
}
