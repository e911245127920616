//! ISO 8601 timestamps as GitHub reports them.
//!
//! The raw string is kept verbatim so that calendar-day keys are a plain
//! prefix slice with no timezone conversion. Parsing is lazy and tolerant:
//! a malformed value still yields a day key but never takes part in a
//! duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the `YYYY-MM-DD` prefix of an ISO 8601 timestamp.
const DAY_PREFIX_LEN: usize = 10;

/// Timestamp string received from GitHub.
///
/// # Example
///
/// ```
/// use reviewdeck::github::models::Timestamp;
///
/// let created = Timestamp::new("2024-01-01T00:00:00Z");
/// let updated = Timestamp::new("2024-01-02T00:00:00Z");
/// assert_eq!(created.day(), "2024-01-01");
/// assert_eq!(updated.millis_after(&created), Some(86_400_000));
/// assert_eq!(created.millis_after(&updated), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wraps a raw timestamp string without validating it.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Calendar day of the timestamp, taken as the first ten characters.
    ///
    /// Shorter values are returned whole.
    #[must_use]
    pub fn day(&self) -> &str {
        self.0.get(..DAY_PREFIX_LEN).unwrap_or(self.0.as_str())
    }

    /// Parses the timestamp as RFC 3339, normalised to UTC.
    #[must_use]
    pub fn parsed(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Returns `None` unless both timestamps parse and `self` is strictly
    /// later than `earlier`.
    #[must_use]
    pub fn millis_after(&self, earlier: &Self) -> Option<u64> {
        let start = earlier.parsed()?;
        let end = self.parsed()?;
        let elapsed = end.signed_duration_since(start).num_milliseconds();
        u64::try_from(elapsed).ok().filter(|millis| *millis > 0)
    }
}

impl From<Option<String>> for Timestamp {
    fn from(value: Option<String>) -> Self {
        Self(value.unwrap_or_default())
    }
}
