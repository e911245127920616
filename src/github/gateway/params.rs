//! Query parameters for listing operations.

use crate::github::error::GitHubError;

/// Largest page GitHub serves.
const MAX_PER_PAGE: u8 = 100;

/// Pull request state filter for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    /// Only open pull requests.
    #[default]
    Open,
    /// Only closed pull requests.
    Closed,
    /// All pull requests regardless of state.
    All,
}

impl StateFilter {
    /// Returns the API parameter value for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Sort key for repository listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositorySort {
    /// Most recently updated first.
    Updated,
    /// Most recently pushed first.
    Pushed,
    /// By full name.
    FullName,
}

impl RepositorySort {
    /// Returns the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Pushed => "pushed",
            Self::FullName => "full_name",
        }
    }
}

/// Sort key for pull request listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestSort {
    /// By creation time.
    Created,
    /// By last update.
    Updated,
}

impl PullRequestSort {
    /// Returns the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters for listing the user's repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRepositoriesParams {
    /// Sort key; GitHub's default when absent.
    pub sort: Option<RepositorySort>,
    /// Page number to fetch (1-based).
    pub page: u32,
    /// Items per page (max 100).
    pub per_page: u8,
}

impl Default for ListRepositoriesParams {
    fn default() -> Self {
        Self {
            sort: None,
            page: 1,
            per_page: 30,
        }
    }
}

impl ListRepositoriesParams {
    /// Checks the pagination bounds.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidPagination` when `page` is zero or
    /// `per_page` is outside `1..=100`.
    pub fn validate(&self) -> Result<(), GitHubError> {
        validate_pagination(self.page, self.per_page)
    }

    pub(super) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = pagination_query(self.page, self.per_page);
        if let Some(sort) = self.sort {
            query.push(("sort", sort.as_str().to_owned()));
        }
        query
    }
}

/// Parameters for listing pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPullRequestsParams {
    /// Filter by state.
    pub state: StateFilter,
    /// Sort key; GitHub's default when absent.
    pub sort: Option<PullRequestSort>,
    /// Sort direction; GitHub's default when absent.
    pub direction: Option<SortDirection>,
    /// Page number to fetch (1-based).
    pub page: u32,
    /// Items per page (max 100).
    pub per_page: u8,
}

impl Default for ListPullRequestsParams {
    fn default() -> Self {
        Self {
            state: StateFilter::Open,
            sort: None,
            direction: None,
            page: 1,
            per_page: 30,
        }
    }
}

impl ListPullRequestsParams {
    /// Checks the pagination bounds.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidPagination` when `page` is zero or
    /// `per_page` is outside `1..=100`.
    pub fn validate(&self) -> Result<(), GitHubError> {
        validate_pagination(self.page, self.per_page)
    }

    pub(super) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("state", self.state.as_str().to_owned())];
        query.extend(pagination_query(self.page, self.per_page));
        if let Some(sort) = self.sort {
            query.push(("sort", sort.as_str().to_owned()));
        }
        if let Some(direction) = self.direction {
            query.push(("direction", direction.as_str().to_owned()));
        }
        query
    }
}

fn pagination_query(page: u32, per_page: u8) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("per_page", per_page.to_string())]
}

fn validate_pagination(page: u32, per_page: u8) -> Result<(), GitHubError> {
    if page == 0 {
        return Err(GitHubError::InvalidPagination {
            message: "page must be at least 1".to_owned(),
        });
    }

    if per_page == 0 {
        return Err(GitHubError::InvalidPagination {
            message: "per_page must be at least 1".to_owned(),
        });
    }

    if per_page > MAX_PER_PAGE {
        return Err(GitHubError::InvalidPagination {
            message: format!("per_page must not exceed {MAX_PER_PAGE}"),
        });
    }

    Ok(())
}
