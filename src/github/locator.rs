//! Validated identifiers and REST paths for repositories and pull requests.

use super::error::GitHubError;

/// Characters GitHub permits in owner logins and repository names.
fn is_identifier_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '.')
}

fn validate_identifier(field: &'static str, value: &str) -> Result<String, GitHubError> {
    if value.is_empty() {
        return Err(GitHubError::InvalidIdentifier {
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    if value == "." || value == ".." || !value.chars().all(is_identifier_char) {
        return Err(GitHubError::InvalidIdentifier {
            field,
            reason: format!("`{value}` contains unsupported characters"),
        });
    }
    Ok(value.to_owned())
}

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates an owner login.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidIdentifier` when the login is empty or
    /// contains characters that could escape the REST path.
    pub fn new(value: &str) -> Result<Self, GitHubError> {
        validate_identifier("owner", value).map(Self)
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates a repository name.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidIdentifier` when the name is empty or
    /// contains characters that could escape the REST path.
    pub fn new(value: &str) -> Result<Self, GitHubError> {
        validate_identifier("repository", value).map(Self)
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates a pull request number.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidPullRequestNumber` for zero.
    pub const fn new(value: u64) -> Result<Self, GitHubError> {
        if value == 0 {
            return Err(GitHubError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Parses a path segment.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidPullRequestNumber` when the segment is
    /// not a positive integer.
    pub fn parse(segment: &str) -> Result<Self, GitHubError> {
        segment
            .parse::<u64>()
            .map_err(|_| GitHubError::InvalidPullRequestNumber)
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// OAuth access token held for a session.
///
/// `Debug` output is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("AccessToken(<redacted>)")
    }
}

/// Repository addressed by owner and name.
///
/// # Example
///
/// ```
/// use reviewdeck::github::locator::RepositoryLocator;
///
/// let locator = RepositoryLocator::from_owner_repo("octo", "widgets")
///     .expect("should create repository locator");
/// assert_eq!(locator.owner().as_str(), "octo");
/// assert_eq!(locator.repository().as_str(), "widgets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator from validated parts.
    #[must_use]
    pub const fn new(owner: RepositoryOwner, repository: RepositoryName) -> Self {
        Self { owner, repository }
    }

    /// Creates a repository locator from owner and repository name strings.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidIdentifier` when either part is rejected.
    pub fn from_owner_repo(owner: &str, repository: &str) -> Result<Self, GitHubError> {
        Ok(Self::new(
            RepositoryOwner::new(owner)?,
            RepositoryName::new(repository)?,
        ))
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns the API path for listing pull requests.
    pub(crate) fn pulls_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}

/// Pull request addressed by repository and number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    repository: RepositoryLocator,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Creates a locator from validated parts.
    #[must_use]
    pub const fn new(repository: RepositoryLocator, number: PullRequestNumber) -> Self {
        Self { repository, number }
    }

    /// Builds a locator from raw path parameters.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidIdentifier` for a rejected owner or
    /// repository and `GitHubError::InvalidPullRequestNumber` when `number`
    /// is not a positive integer.
    pub fn from_parts(owner: &str, repository: &str, number: &str) -> Result<Self, GitHubError> {
        Ok(Self::new(
            RepositoryLocator::from_owner_repo(owner, repository)?,
            PullRequestNumber::parse(number)?,
        ))
    }

    /// Repository containing the pull request.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryLocator {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    pub(crate) fn comments_path(&self) -> String {
        format!(
            "/repos/{}/{}/issues/{}/comments",
            self.repository.owner.as_str(),
            self.repository.repository.as_str(),
            self.number.get()
        )
    }

    pub(crate) fn reviews_path(&self) -> String {
        format!(
            "{}/{}/reviews",
            self.repository.pulls_path(),
            self.number.get()
        )
    }
}
