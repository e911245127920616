//! Per-day series and AI response-time statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::format::{NO_DATA, format_duration, mean_millis};
use crate::github::models::PullRequestRecord;

/// Number of records that fall on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// `YYYY-MM-DD` day key.
    pub date: String,
    /// Records on that day.
    pub count: usize,
}

/// Counts day keys, returning points in ascending date order.
///
/// Day keys are fixed-width ISO prefixes, so lexicographic order is
/// chronological.
pub(super) fn daily_counts<'a>(days: impl IntoIterator<Item = &'a str>) -> Vec<TimelinePoint> {
    let mut buckets: BTreeMap<&str, usize> = BTreeMap::new();
    for day in days {
        *buckets.entry(day).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(date, count)| TimelinePoint {
            date: date.to_owned(),
            count,
        })
        .collect()
}

/// One AI-reviewed record whose update is strictly later than its creation.
#[derive(Debug, Clone, Copy)]
pub(super) struct ResponseSample<'a> {
    pub(super) day: &'a str,
    pub(super) millis: u64,
}

/// Collects response-time samples from AI-reviewed records.
///
/// Records whose timestamps do not parse, or whose update is not strictly
/// after creation, contribute nothing.
pub(super) fn response_samples<'a>(
    records: impl IntoIterator<Item = &'a PullRequestRecord>,
) -> Vec<ResponseSample<'a>> {
    records
        .into_iter()
        .filter(|record| record.ai_reviewed)
        .filter_map(|record| {
            record
                .updated_at
                .millis_after(&record.created_at)
                .map(|millis| ResponseSample {
                    day: record.updated_at.day(),
                    millis,
                })
        })
        .collect()
}

/// Summary of the time between opening and the AI-review update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeStats {
    /// Number of qualifying records.
    pub samples: usize,
    /// Mean delta in milliseconds, zero without samples.
    pub average_ms: u64,
    /// Smallest delta in milliseconds, zero without samples.
    pub min_ms: u64,
    /// Largest delta in milliseconds, zero without samples.
    pub max_ms: u64,
    /// Formatted mean.
    pub average: String,
    /// Formatted minimum.
    pub fastest: String,
    /// Formatted maximum.
    pub slowest: String,
}

impl ResponseTimeStats {
    /// Summarises millisecond deltas.
    ///
    /// Without samples every numeric field is zero and every display field
    /// is the no-data placeholder.
    #[must_use]
    pub fn from_millis(samples: &[u64]) -> Self {
        let (Some(min), Some(max)) = (samples.iter().min(), samples.iter().max()) else {
            return Self::empty();
        };
        let average = mean_millis(samples);
        Self {
            samples: samples.len(),
            average_ms: average,
            min_ms: *min,
            max_ms: *max,
            average: format_duration(average),
            fastest: format_duration(*min),
            slowest: format_duration(*max),
        }
    }

    fn empty() -> Self {
        Self {
            samples: 0,
            average_ms: 0,
            min_ms: 0,
            max_ms: 0,
            average: NO_DATA.to_owned(),
            fastest: NO_DATA.to_owned(),
            slowest: NO_DATA.to_owned(),
        }
    }
}
