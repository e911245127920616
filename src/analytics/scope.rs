//! Repository and owner scope for analytics and pull request listings.

use serde::Deserialize;

use crate::github::models::PullRequestRecord;

/// Optional narrowing of the pull request collection to one repository.
///
/// Blank values are treated as absent so that `?repo=&owner=` behaves like
/// no filter at all. Repository and owner are applied independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScopeFilter {
    /// Repository name to keep.
    #[serde(default, rename = "repo")]
    pub repository: Option<String>,
    /// Owner login to keep.
    #[serde(default)]
    pub owner: Option<String>,
}

impl ScopeFilter {
    /// Scope covering every repository.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            repository: None,
            owner: None,
        }
    }

    /// Scope narrowed to `owner/repository`.
    #[must_use]
    pub fn repository(owner: &str, repository: &str) -> Self {
        Self {
            repository: Some(repository.to_owned()),
            owner: Some(owner.to_owned()),
        }
    }

    /// Repository filter, ignoring blank values.
    #[must_use]
    pub fn repository_filter(&self) -> Option<&str> {
        self.repository.as_deref().filter(|value| !value.is_empty())
    }

    /// Owner filter, ignoring blank values.
    #[must_use]
    pub fn owner_filter(&self) -> Option<&str> {
        self.owner.as_deref().filter(|value| !value.is_empty())
    }

    /// True when any filter narrows the collection.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.repository_filter().is_some() || self.owner_filter().is_some()
    }

    /// Tests a repository identified by name and owner login.
    #[must_use]
    pub fn matches_repository(&self, repository: &str, owner: &str) -> bool {
        self.repository_filter()
            .is_none_or(|expected| expected == repository)
            && self.owner_filter().is_none_or(|expected| expected == owner)
    }

    /// Tests a pull request record.
    #[must_use]
    pub fn matches(&self, record: &PullRequestRecord) -> bool {
        self.matches_repository(&record.repository, &record.owner)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ScopeFilter;

    #[rstest]
    #[case::everything(ScopeFilter::all(), true)]
    #[case::same_repo(ScopeFilter::repository("octo", "widgets"), true)]
    #[case::other_owner(ScopeFilter::repository("acme", "widgets"), false)]
    #[case::other_repo(ScopeFilter::repository("octo", "gadgets"), false)]
    #[case::owner_only(ScopeFilter { repository: None, owner: Some("octo".to_owned()) }, true)]
    #[case::blank_values(
        ScopeFilter { repository: Some(String::new()), owner: Some(String::new()) },
        true
    )]
    fn matches_repository_applies_each_filter(#[case] scope: ScopeFilter, #[case] expected: bool) {
        assert_eq!(scope.matches_repository("widgets", "octo"), expected);
    }

    #[test]
    fn blank_filters_are_inactive() {
        let scope = ScopeFilter {
            repository: Some(String::new()),
            owner: None,
        };
        assert!(!scope.is_active());
        assert!(ScopeFilter::repository("octo", "widgets").is_active());
    }
}
