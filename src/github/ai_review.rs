//! Heuristics for spotting automated reviews among issue comments.
//!
//! Detection is plain case-insensitive substring matching. Nothing here
//! inspects comment semantics.

use super::models::{IssueComment, Review, ReviewDetails};

/// Default text an automated reviewer leaves in its comment.
pub const DEFAULT_AI_REVIEW_MARKER: &str = "ai-powered review";

/// Body phrases that mark a comment as review-bot output in the review
/// detail view.
const REVIEW_BODY_HINTS: [&str; 2] = ["ai review", "static analysis"];

/// Author login fragment that marks a comment as bot output.
const BOT_LOGIN_HINT: &str = "bot";

/// Case-insensitive marker used to flag a pull request as AI-reviewed.
///
/// # Example
///
/// ```
/// use reviewdeck::github::ai_review::AiReviewMarker;
///
/// let marker = AiReviewMarker::default();
/// assert!(marker.matches("## AI-Powered Review\nLooks good."));
/// assert!(!marker.matches("LGTM"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiReviewMarker {
    needle: String,
}

impl AiReviewMarker {
    /// Creates a marker; matching ignores ASCII and Unicode case.
    #[must_use]
    pub fn new(marker: &str) -> Self {
        Self {
            needle: marker.to_lowercase(),
        }
    }

    /// The lowercased marker text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.needle.as_str()
    }

    /// True when `body` contains the marker.
    #[must_use]
    pub fn matches(&self, body: &str) -> bool {
        body.to_lowercase().contains(&self.needle)
    }

    /// True when any comment carries the marker.
    #[must_use]
    pub fn any_marked(&self, comments: &[IssueComment]) -> bool {
        comments.iter().any(|comment| self.matches(&comment.body))
    }
}

impl Default for AiReviewMarker {
    fn default() -> Self {
        Self::new(DEFAULT_AI_REVIEW_MARKER)
    }
}

/// True when a comment looks like review-bot output: the author login
/// mentions a bot or the body mentions an AI review or static analysis.
#[must_use]
pub fn is_automated_review(comment: &IssueComment) -> bool {
    let body = comment.body.to_lowercase();
    comment.user.login.to_lowercase().contains(BOT_LOGIN_HINT)
        || REVIEW_BODY_HINTS.iter().any(|hint| body.contains(hint))
}

/// Splits reviews and comments into the review detail view.
///
/// `latest_ai_comment` is the marked comment with the greatest creation
/// timestamp; timestamps are ISO strings, so the comparison is textual.
#[must_use]
pub fn classify_review_details(
    reviews: Vec<Review>,
    comments: Vec<IssueComment>,
    marker: &AiReviewMarker,
) -> ReviewDetails {
    let ai_reviews: Vec<IssueComment> = comments
        .iter()
        .filter(|comment| is_automated_review(comment))
        .cloned()
        .collect();
    let (marked, human_comments): (Vec<IssueComment>, Vec<IssueComment>) = comments
        .iter()
        .cloned()
        .partition(|comment| marker.matches(&comment.body));
    let latest_ai_comment = marked
        .into_iter()
        .max_by(|left, right| left.created_at.as_str().cmp(right.created_at.as_str()));

    ReviewDetails {
        reviews,
        ai_reviews,
        all_comments: comments,
        latest_ai_comment,
        human_comments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AiReviewMarker, classify_review_details, is_automated_review};
    use crate::github::models::{IssueComment, Timestamp, UserRef};

    fn comment(id: u64, login: &str, body: &str, created_at: &str) -> IssueComment {
        IssueComment {
            id,
            body: body.to_owned(),
            user: UserRef {
                login: login.to_owned(),
                avatar_url: String::new(),
            },
            created_at: Timestamp::new(created_at),
            html_url: None,
        }
    }

    #[rstest]
    #[case::exact("ai-powered review", true)]
    #[case::shouting("AI-POWERED REVIEW complete", true)]
    #[case::embedded("This is an Ai-Powered Review of your change", true)]
    #[case::absent("manual review", false)]
    #[case::empty("", false)]
    fn marker_matching_ignores_case(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(AiReviewMarker::default().matches(body), expected);
    }

    #[test]
    fn custom_marker_is_lowercased() {
        let marker = AiReviewMarker::new("Reviewed-By-Robot");
        assert_eq!(marker.as_str(), "reviewed-by-robot");
        assert!(marker.matches("reviewed-by-robot: ok"));
    }

    #[rstest]
    #[case::bot_login(comment(1, "dependabot[bot]", "bump", "2024-01-01"), true)]
    #[case::ai_body(comment(2, "alice", "Results of AI Review", "2024-01-01"), true)]
    #[case::static_body(comment(3, "alice", "static analysis found 2 issues", "2024-01-01"), true)]
    #[case::human(comment(4, "alice", "please rename", "2024-01-01"), false)]
    fn automated_review_detection(#[case] candidate: IssueComment, #[case] expected: bool) {
        assert_eq!(is_automated_review(&candidate), expected);
    }

    #[test]
    fn review_details_pick_latest_marked_comment() {
        let comments = vec![
            comment(1, "reviewer-bot", "AI-powered review: v1", "2024-01-01T00:00:00Z"),
            comment(2, "alice", "thanks", "2024-01-02T00:00:00Z"),
            comment(3, "reviewer-bot", "AI-powered review: v2", "2024-01-03T00:00:00Z"),
        ];

        let details = classify_review_details(Vec::new(), comments, &AiReviewMarker::default());

        assert_eq!(details.all_comments.len(), 3);
        assert_eq!(details.ai_reviews.len(), 2);
        assert_eq!(details.latest_ai_comment.map(|latest| latest.id), Some(3));
        let human: Vec<u64> = details.human_comments.iter().map(|entry| entry.id).collect();
        assert_eq!(human, vec![2]);
    }
}
