//! Numeric helpers and display formatting for analytics values.

/// Display value for statistics that have no samples.
pub const NO_DATA: &str = "—";

const MILLIS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;

/// Renders a millisecond duration as `"Xm Ys"`, or `"Ys"` under a minute.
///
/// Zero renders as [`NO_DATA`].
///
/// # Example
///
/// ```
/// use reviewdeck::analytics::format_duration;
///
/// assert_eq!(format_duration(0), "—");
/// assert_eq!(format_duration(42_500), "42s");
/// assert_eq!(format_duration(125_000), "2m 5s");
/// ```
#[must_use]
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "whole minutes and seconds are the display precision"
)]
pub fn format_duration(millis: u64) -> String {
    if millis == 0 {
        return NO_DATA.to_owned();
    }
    let total_seconds = millis / MILLIS_PER_SECOND;
    let minutes = total_seconds / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// `round(part / whole * 100)` with halves rounded up; zero when `whole` is
/// zero.
#[must_use]
#[expect(
    clippy::integer_division,
    reason = "rounding is folded into the integer expression"
)]
pub fn rounded_percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let bounded = part.min(whole);
    let scaled = (bounded.saturating_mul(200).saturating_add(whole)) / whole.saturating_mul(2);
    u8::try_from(scaled).unwrap_or(100)
}

/// Arithmetic mean truncated to whole milliseconds; zero for no samples.
#[expect(
    clippy::integer_division,
    reason = "sub-millisecond precision is not displayed"
)]
pub(super) fn mean_millis(samples: &[u64]) -> u64 {
    let Ok(count) = u64::try_from(samples.len()) else {
        return 0;
    };
    if count == 0 {
        return 0;
    }
    let sum = samples
        .iter()
        .fold(0_u64, |total, sample| total.saturating_add(*sample));
    sum / count
}
