//! Data models for repositories, pull requests, comments, and reviews.
//!
//! Types prefixed with `Api` are internal deserialisation targets for GitHub
//! responses. They are converted into the public domain types at the gateway
//! boundary, which is also where sentinel values replace missing authors and
//! missing merge timestamps become `merged == false`.

use serde::{Deserialize, Deserializer, Serialize};

mod timestamp;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use timestamp::Timestamp;

/// Placeholder used when a grouping field such as an author login is absent.
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// State reported by GitHub for a pull request.
///
/// GitHub reports merged pull requests as `closed`; see [`EffectiveStatus`]
/// for the three-way classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// The pull request is open.
    Open,
    /// The pull request is closed (merged or not).
    Closed,
}

impl PullRequestState {
    fn from_api(value: Option<&str>) -> Self {
        match value {
            Some(state) if state.eq_ignore_ascii_case("open") => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Three-way status derived from the GitHub state and the merged flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Open and not merged.
    Open,
    /// Merged, regardless of the reported state.
    Merged,
    /// Closed without merging.
    Closed,
}

impl EffectiveStatus {
    /// Classifies a pull request.
    ///
    /// The merged flag wins over the reported state; a merged pull request is
    /// never re-validated against `state == closed`.
    #[must_use]
    pub const fn classify(state: PullRequestState, merged: bool) -> Self {
        if merged {
            Self::Merged
        } else if matches!(state, PullRequestState::Open) {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

/// Author reference attached to pull requests and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// Login handle.
    #[serde(default, deserialize_with = "null_as_default")]
    pub login: String,
    /// Avatar image URL, empty when GitHub omits it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar_url: String,
}

impl UserRef {
    fn from_api(user: Option<ApiUser>) -> Self {
        let user = user.unwrap_or_default();
        Self {
            login: user
                .login
                .filter(|login| !login.is_empty())
                .unwrap_or_else(|| UNKNOWN_SENTINEL.to_owned()),
            avatar_url: user.avatar_url.unwrap_or_default(),
        }
    }
}

/// The user the access token belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Login handle.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Public email address.
    pub email: Option<String>,
    /// Profile biography.
    pub bio: Option<String>,
    /// Number of public repositories.
    pub public_repos: u64,
    /// Profile URL.
    pub html_url: Option<String>,
}

/// Repository visible to the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository identifier.
    pub id: u64,
    /// Repository name.
    pub name: String,
    /// Owner login.
    pub owner: String,
    /// `owner/name`.
    pub full_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether the repository is private.
    pub private: bool,
    /// Browser URL.
    pub html_url: String,
    /// Star count.
    pub stargazers_count: u64,
    /// Fork count.
    pub forks_count: u64,
    /// Primary language.
    pub language: Option<String>,
    /// Open issues, which on GitHub include open pull requests.
    pub open_issues_count: u64,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

/// Repository listing entry with its open pull request count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository details.
    #[serde(flatten)]
    pub repository: Repository,
    /// Number of open pull requests, zero when the count could not be loaded.
    pub open_prs_count: usize,
}

/// Pull request as listed for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Globally unique identifier.
    pub id: u64,
    /// Number within the repository.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Reported state.
    pub state: PullRequestState,
    /// Whether a merge timestamp is present.
    pub merged: bool,
    /// Browser URL.
    pub html_url: String,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
    /// Author, with the sentinel login when GitHub omits it.
    pub user: UserRef,
}

impl PullRequest {
    /// Three-way status of this pull request.
    #[must_use]
    pub const fn effective_status(&self) -> EffectiveStatus {
        EffectiveStatus::classify(self.state, self.merged)
    }

    /// Attaches repository context and the AI-review flag.
    #[must_use]
    pub fn into_record(self, repository: &Repository, ai_reviewed: bool) -> PullRequestRecord {
        PullRequestRecord {
            id: self.id,
            number: self.number,
            title: self.title,
            state: self.state,
            merged: self.merged,
            html_url: self.html_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            repository: repository.name.clone(),
            owner: repository.owner.clone(),
            user: self.user,
            ai_reviewed,
        }
    }
}

/// Flat pull request record served to the dashboard and consumed by the
/// analytics engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    /// Globally unique identifier.
    pub id: u64,
    /// Number within the repository.
    pub number: u64,
    /// Title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Reported state.
    pub state: PullRequestState,
    /// Whether the pull request was merged.
    #[serde(default, deserialize_with = "null_as_default")]
    pub merged: bool,
    /// Browser URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    /// Creation timestamp.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: Timestamp,
    /// Last update timestamp.
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: Timestamp,
    /// Repository name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository: String,
    /// Repository owner login.
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: String,
    /// Author.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserRef,
    /// Whether an issue comment carries the AI-review marker.
    #[serde(rename = "aiReviewed", default, deserialize_with = "null_as_default")]
    pub ai_reviewed: bool,
}

impl PullRequestRecord {
    /// Three-way status of this record.
    #[must_use]
    pub const fn effective_status(&self) -> EffectiveStatus {
        EffectiveStatus::classify(self.state, self.merged)
    }

    /// Repository grouping key, falling back to the sentinel bucket.
    #[must_use]
    pub fn repository_key(&self) -> &str {
        non_empty_or_unknown(&self.repository)
    }

    /// Author grouping key, falling back to the sentinel bucket.
    #[must_use]
    pub fn author_key(&self) -> &str {
        non_empty_or_unknown(&self.user.login)
    }
}

/// Reads an explicit `null` as the field's default, matching a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN_SENTINEL
    } else {
        value
    }
}

/// Issue (conversation) comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Comment body, empty when GitHub omits it.
    pub body: String,
    /// Author.
    pub user: UserRef,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Browser URL.
    pub html_url: Option<String>,
}

/// Submitted pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review identifier.
    pub id: u64,
    /// Reviewer.
    pub user: UserRef,
    /// Review summary body.
    pub body: String,
    /// Review state such as `APPROVED` or `CHANGES_REQUESTED`.
    pub state: String,
    /// Submission timestamp.
    pub submitted_at: Option<Timestamp>,
    /// Browser URL.
    pub html_url: Option<String>,
}

/// Reviews and comments for a single pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetails {
    /// Submitted reviews.
    pub reviews: Vec<Review>,
    /// Comments that look like automated reviews.
    pub ai_reviews: Vec<IssueComment>,
    /// Every issue comment, in GitHub order.
    pub all_comments: Vec<IssueComment>,
    /// Most recent comment carrying the AI-review marker.
    pub latest_ai_comment: Option<IssueComment>,
    /// Comments without the AI-review marker.
    pub human_comments: Vec<IssueComment>,
}

/// Headline pull request totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// All pull requests counted.
    #[serde(rename = "totalPRs")]
    pub total_prs: usize,
    /// Open pull requests.
    #[serde(rename = "openPRs")]
    pub open_prs: usize,
    /// Merged pull requests.
    #[serde(rename = "mergedPRs")]
    pub merged_prs: usize,
    /// Closed, unmerged pull requests.
    #[serde(rename = "closedPRs")]
    pub closed_prs: usize,
    /// Rounded percentage of merged pull requests.
    #[serde(rename = "acceptanceRate")]
    pub acceptance_rate: u8,
    /// Number of repositories listed for the user.
    #[serde(rename = "activeRepos")]
    pub active_repos: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiAuthenticatedUser {
    pub(crate) login: String,
    pub(crate) avatar_url: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) public_repos: u64,
    pub(crate) html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRepository {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) full_name: Option<String>,
    pub(crate) owner: Option<ApiUser>,
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) private: bool,
    pub(crate) html_url: Option<String>,
    #[serde(default)]
    pub(crate) stargazers_count: u64,
    #[serde(default)]
    pub(crate) forks_count: u64,
    pub(crate) language: Option<String>,
    #[serde(default)]
    pub(crate) open_issues_count: u64,
    pub(crate) updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) id: u64,
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) merged_at: Option<String>,
    pub(crate) html_url: Option<String>,
    pub(crate) created_at: Option<String>,
    pub(crate) updated_at: Option<String>,
    pub(crate) user: Option<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiComment {
    pub(crate) id: u64,
    pub(crate) body: Option<String>,
    pub(crate) user: Option<ApiUser>,
    pub(crate) created_at: Option<String>,
    pub(crate) html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReview {
    pub(crate) id: u64,
    pub(crate) user: Option<ApiUser>,
    pub(crate) body: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) submitted_at: Option<String>,
    pub(crate) html_url: Option<String>,
}

impl From<ApiAuthenticatedUser> for AuthenticatedUser {
    fn from(value: ApiAuthenticatedUser) -> Self {
        Self {
            login: value.login,
            avatar_url: value.avatar_url,
            name: value.name,
            email: value.email,
            bio: value.bio,
            public_repos: value.public_repos,
            html_url: value.html_url,
        }
    }
}

impl From<ApiRepository> for Repository {
    fn from(value: ApiRepository) -> Self {
        let owner = value
            .owner
            .and_then(|owner| owner.login)
            .unwrap_or_default();
        let full_name = value
            .full_name
            .unwrap_or_else(|| format!("{owner}/{name}", name = value.name));
        Self {
            id: value.id,
            name: value.name,
            owner,
            full_name,
            description: value.description,
            private: value.private,
            html_url: value.html_url.unwrap_or_default(),
            stargazers_count: value.stargazers_count,
            forks_count: value.forks_count,
            language: value.language,
            open_issues_count: value.open_issues_count,
            updated_at: value.updated_at.into(),
        }
    }
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            id: value.id,
            number: value.number,
            title: value.title.unwrap_or_default(),
            state: PullRequestState::from_api(value.state.as_deref()),
            merged: value.merged_at.is_some(),
            html_url: value.html_url.unwrap_or_default(),
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
            user: UserRef::from_api(value.user),
        }
    }
}

impl From<ApiComment> for IssueComment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            body: value.body.unwrap_or_default(),
            user: UserRef::from_api(value.user),
            created_at: value.created_at.into(),
            html_url: value.html_url,
        }
    }
}

impl From<ApiReview> for Review {
    fn from(value: ApiReview) -> Self {
        Self {
            id: value.id,
            user: UserRef::from_api(value.user),
            body: value.body.unwrap_or_default(),
            state: value.state.unwrap_or_default(),
            submitted_at: value.submitted_at.map(Timestamp::new),
            html_url: value.html_url,
        }
    }
}
