//! Test helpers for constructing `PullRequestRecord` fixtures.
//!
//! # Examples
//!
//! ```
//! use reviewdeck::github::models::test_support::RecordBuilder;
//!
//! let record = RecordBuilder::new(1, "widgets")
//!     .merged()
//!     .created("2024-01-01T00:00:00Z")
//!     .updated("2024-01-02T00:00:00Z")
//!     .ai_reviewed()
//!     .build();
//! assert!(record.merged);
//! assert_eq!(record.repository, "widgets");
//! ```

use super::{PullRequestRecord, PullRequestState, Timestamp, UserRef};

/// Fluent builder for [`PullRequestRecord`] test data.
///
/// Records start open, unmerged, not AI-reviewed, owned by `octo`, authored
/// by `alice`, and created and updated at `2024-01-01T00:00:00Z`.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: PullRequestRecord,
}

impl RecordBuilder {
    /// Starts a record with the given id in the named repository.
    #[must_use]
    pub fn new(id: u64, repository: &str) -> Self {
        Self {
            record: PullRequestRecord {
                id,
                number: id,
                title: format!("PR {id}"),
                state: PullRequestState::Open,
                merged: false,
                html_url: String::new(),
                created_at: Timestamp::new("2024-01-01T00:00:00Z"),
                updated_at: Timestamp::new("2024-01-01T00:00:00Z"),
                repository: repository.to_owned(),
                owner: "octo".to_owned(),
                user: UserRef {
                    login: "alice".to_owned(),
                    avatar_url: String::new(),
                },
                ai_reviewed: false,
            },
        }
    }

    /// Marks the record closed and merged.
    #[must_use]
    pub fn merged(mut self) -> Self {
        self.record.state = PullRequestState::Closed;
        self.record.merged = true;
        self
    }

    /// Marks the record closed without merging.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.record.state = PullRequestState::Closed;
        self.record.merged = false;
        self
    }

    /// Sets the owner login.
    #[must_use]
    pub fn owner(mut self, owner: &str) -> Self {
        owner.clone_into(&mut self.record.owner);
        self
    }

    /// Sets the author login.
    #[must_use]
    pub fn author(mut self, login: &str) -> Self {
        login.clone_into(&mut self.record.user.login);
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn created(mut self, raw: &str) -> Self {
        self.record.created_at = Timestamp::new(raw);
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub fn updated(mut self, raw: &str) -> Self {
        self.record.updated_at = Timestamp::new(raw);
        self
    }

    /// Flags the record as AI-reviewed.
    #[must_use]
    pub fn ai_reviewed(mut self) -> Self {
        self.record.ai_reviewed = true;
        self
    }

    /// Finishes the record.
    #[must_use]
    pub fn build(self) -> PullRequestRecord {
        self.record
    }
}
