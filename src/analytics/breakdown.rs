//! Status counts and the chart-ready histograms built from them.

use serde::{Deserialize, Serialize};

use crate::github::models::{EffectiveStatus, PullRequestRecord};

/// Chart-order of the status histogram.
const STATUS_ORDER: [EffectiveStatus; 3] = [
    EffectiveStatus::Merged,
    EffectiveStatus::Open,
    EffectiveStatus::Closed,
];

/// Chart-order of the outcome histogram.
const OUTCOME_ORDER: [EffectiveStatus; 3] = [
    EffectiveStatus::Merged,
    EffectiveStatus::Closed,
    EffectiveStatus::Open,
];

/// Name/value pair for pie and bar charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedValue {
    /// Bucket label.
    pub name: String,
    /// Bucket size.
    pub value: usize,
}

/// Number of records per effective status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Open, unmerged records.
    pub open: usize,
    /// Merged records.
    pub merged: usize,
    /// Closed, unmerged records.
    pub closed: usize,
}

impl StatusCounts {
    /// Counts records by effective status.
    #[must_use]
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a PullRequestRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut counts, record| {
                counts.record(record.effective_status());
                counts
            })
    }

    /// Adds one record to its bucket.
    pub const fn record(&mut self, status: EffectiveStatus) {
        match status {
            EffectiveStatus::Open => self.open += 1,
            EffectiveStatus::Merged => self.merged += 1,
            EffectiveStatus::Closed => self.closed += 1,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.open + self.merged + self.closed
    }

    /// Size of one bucket.
    #[must_use]
    pub const fn get(&self, status: EffectiveStatus) -> usize {
        match status {
            EffectiveStatus::Open => self.open,
            EffectiveStatus::Merged => self.merged,
            EffectiveStatus::Closed => self.closed,
        }
    }

    /// `Merged`, `Open`, `Closed` histogram.
    #[must_use]
    pub fn distribution(&self) -> Vec<NamedValue> {
        self.histogram(&STATUS_ORDER, status_label)
    }

    /// The status histogram relabelled as review outcomes.
    ///
    /// This is a relabelling of [`Self::distribution`], not a sentiment
    /// classifier: no comment text is inspected.
    #[must_use]
    pub fn outcome_breakdown(&self) -> Vec<NamedValue> {
        self.histogram(&OUTCOME_ORDER, outcome_label)
    }

    fn histogram(
        &self,
        order: &[EffectiveStatus],
        label: fn(EffectiveStatus) -> &'static str,
    ) -> Vec<NamedValue> {
        order
            .iter()
            .map(|status| NamedValue {
                name: label(*status).to_owned(),
                value: self.get(*status),
            })
            .collect()
    }
}

/// Chart label for a status bucket.
#[must_use]
pub const fn status_label(status: EffectiveStatus) -> &'static str {
    match status {
        EffectiveStatus::Merged => "Merged",
        EffectiveStatus::Open => "Open",
        EffectiveStatus::Closed => "Closed",
    }
}

/// Review-outcome label for a status bucket.
#[must_use]
pub const fn outcome_label(status: EffectiveStatus) -> &'static str {
    match status {
        EffectiveStatus::Merged => "Approved",
        EffectiveStatus::Closed => "Changes Requested / Closed",
        EffectiveStatus::Open => "Open / In Review",
    }
}
