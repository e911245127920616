//! Per-author and per-repository rankings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::format::{format_duration, mean_millis, rounded_percentage};
use crate::github::models::{EffectiveStatus, PullRequestRecord};

/// Maximum number of entries in the contributor leaderboard.
pub const TOP_CONTRIBUTOR_LIMIT: usize = 5;

/// Author with their pull request totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Author login, or the sentinel bucket.
    pub name: String,
    /// Pull requests opened.
    pub prs: usize,
    /// Pull requests merged.
    pub merged: usize,
}

/// Number of pull requests in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCount {
    /// Repository name, or the sentinel bucket.
    pub name: String,
    /// Pull requests in scope.
    pub count: usize,
}

/// Repository with the most merged pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestRepository {
    /// Repository name.
    pub name: String,
    /// Pull requests in the repository.
    pub total: usize,
    /// Merged pull requests.
    pub merged: usize,
    /// Rounded percentage of AI-reviewed pull requests.
    pub ai_coverage: u8,
    /// Mean merge time in milliseconds, zero without qualifying records.
    pub avg_merge_ms: u64,
    /// Formatted mean merge time.
    pub avg_merge_time: String,
}

impl BestRepository {
    fn from_group(group: &Group<'_>) -> Self {
        let merged: Vec<&PullRequestRecord> = group
            .records
            .iter()
            .copied()
            .filter(|record| record.effective_status() == EffectiveStatus::Merged)
            .collect();
        let ai_reviewed = group
            .records
            .iter()
            .filter(|record| record.ai_reviewed)
            .count();
        let merge_times: Vec<u64> = merged
            .iter()
            .filter_map(|record| record.updated_at.millis_after(&record.created_at))
            .collect();
        let avg_merge_ms = mean_millis(&merge_times);
        Self {
            name: group.key.to_owned(),
            total: group.records.len(),
            merged: merged.len(),
            ai_coverage: rounded_percentage(ai_reviewed, group.records.len()),
            avg_merge_ms,
            avg_merge_time: format_duration(avg_merge_ms),
        }
    }

    fn outranks(&self, other: &Self) -> bool {
        self.merged > other.merged
            || (self.merged == other.merged && self.ai_coverage > other.ai_coverage)
    }
}

/// Records sharing a grouping key, in input order.
struct Group<'a> {
    key: &'a str,
    records: Vec<&'a PullRequestRecord>,
}

/// Groups records by key, keeping groups in first-seen order.
fn group_by<'a>(
    records: impl IntoIterator<Item = &'a PullRequestRecord>,
    key: fn(&'a PullRequestRecord) -> &'a str,
) -> Vec<Group<'a>> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<Group<'a>> = Vec::new();
    for record in records {
        let group_key = key(record);
        let position = *positions.entry(group_key).or_insert_with(|| {
            groups.push(Group {
                key: group_key,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(position) {
            group.records.push(record);
        }
    }
    groups
}

/// Authors ranked by pull request count, ties kept in first-seen order.
pub(super) fn top_contributors(records: &[&PullRequestRecord]) -> Vec<Contributor> {
    let mut contributors: Vec<Contributor> =
        group_by(records.iter().copied(), PullRequestRecord::author_key)
            .into_iter()
            .map(|group| Contributor {
                name: group.key.to_owned(),
                prs: group.records.len(),
                merged: group
                    .records
                    .iter()
                    .filter(|record| record.effective_status() == EffectiveStatus::Merged)
                    .count(),
            })
            .collect();
    contributors.sort_by(|left, right| right.prs.cmp(&left.prs));
    contributors.truncate(TOP_CONTRIBUTOR_LIMIT);
    contributors
}

/// Every repository with its pull request count, largest first.
pub(super) fn repository_counts(records: &[&PullRequestRecord]) -> Vec<RepositoryCount> {
    let mut counts: Vec<RepositoryCount> =
        group_by(records.iter().copied(), PullRequestRecord::repository_key)
            .into_iter()
            .map(|group| RepositoryCount {
                name: group.key.to_owned(),
                count: group.records.len(),
            })
            .collect();
    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts
}

/// Picks the repository with the most merged pull requests.
///
/// Ties go to the higher AI coverage, then to the repository seen first.
pub(super) fn best_repository(records: &[PullRequestRecord]) -> Option<BestRepository> {
    group_by(records, PullRequestRecord::repository_key)
        .iter()
        .map(BestRepository::from_group)
        .fold(None, |best, candidate| match best {
            Some(current) if !candidate.outranks(&current) => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::{best_repository, repository_counts, top_contributors};
    use crate::github::models::PullRequestRecord;
    use crate::github::models::test_support::RecordBuilder;

    fn authored(id: u64, author: &str) -> PullRequestRecord {
        RecordBuilder::new(id, "repo").author(author).build()
    }

    #[test]
    fn top_contributors_are_truncated_and_stable() {
        let records = [
            authored(1, "bea"),
            authored(2, "cai"),
            authored(3, "dev"),
            authored(4, "eli"),
            authored(5, "fay"),
            authored(6, "gus"),
            authored(7, "cai"),
        ];
        let borrowed: Vec<&PullRequestRecord> = records.iter().collect();

        let names: Vec<String> = top_contributors(&borrowed)
            .into_iter()
            .map(|contributor| contributor.name)
            .collect();

        assert_eq!(names, vec!["cai", "bea", "dev", "eli", "fay"]);
    }

    #[test]
    fn repository_counts_keep_every_group() {
        let records = [
            RecordBuilder::new(1, "a").build(),
            RecordBuilder::new(2, "b").build(),
            RecordBuilder::new(3, "b").build(),
            RecordBuilder::new(4, "").build(),
        ];
        let borrowed: Vec<&PullRequestRecord> = records.iter().collect();

        let counts: Vec<(String, usize)> = repository_counts(&borrowed)
            .into_iter()
            .map(|entry| (entry.name, entry.count))
            .collect();

        assert_eq!(
            counts,
            vec![
                ("b".to_owned(), 2),
                ("a".to_owned(), 1),
                ("unknown".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn best_repository_prefers_earlier_group_on_full_tie() {
        let records = [
            RecordBuilder::new(1, "first").merged().build(),
            RecordBuilder::new(2, "second").merged().build(),
        ];

        let best = best_repository(&records).map(|repository| repository.name);

        assert_eq!(best.as_deref(), Some("first"));
    }

    #[test]
    fn best_repository_merge_time_ignores_equal_timestamps() {
        let records = [
            RecordBuilder::new(1, "a")
                .merged()
                .created("2024-01-01T00:00:00Z")
                .updated("2024-01-01T00:00:00Z")
                .build(),
            RecordBuilder::new(2, "a")
                .merged()
                .created("2024-01-01T00:00:00Z")
                .updated("2024-01-01T00:02:00Z")
                .build(),
        ];

        let best = best_repository(&records).expect("a repository should win");

        assert_eq!(best.merged, 2);
        assert_eq!(best.avg_merge_ms, 120_000);
        assert_eq!(best.avg_merge_time, "2m 0s");
    }

    #[test]
    fn best_repository_without_records_is_none() {
        assert!(best_repository(&[]).is_none());
    }
}
