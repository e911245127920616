//! Rate limit information from GitHub API responses.
//!
//! When GitHub refuses a request because the quota is spent, the gateway asks
//! the `/rate_limit` endpoint for the current window so the HTTP layer can
//! tell the browser when to retry.

use std::time::{SystemTime, UNIX_EPOCH};

/// Core rate limit window as reported by GitHub.
///
/// # Example
///
/// ```
/// use reviewdeck::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(5000, 0, 1700000000);
/// assert!(info.is_exhausted());
/// assert_eq!(info.limit(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Converts the figures returned by Octocrab, which are wider than the
    /// values GitHub actually sends.
    #[must_use]
    pub fn from_rate(limit: usize, remaining: usize, reset_at: u64) -> Option<Self> {
        Some(Self::new(
            u32::try_from(limit).ok()?,
            u32::try_from(remaining).ok()?,
            reset_at,
        ))
    }

    /// Maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Unix timestamp when the window resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// True once the quota is spent.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Seconds until the window resets, measured against `now`.
    #[must_use]
    pub const fn seconds_until_reset_from(&self, now: u64) -> u64 {
        self.reset_at.saturating_sub(now)
    }

    /// Seconds until the window resets; zero once it has passed or when the
    /// clock is unavailable.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);
        self.seconds_until_reset_from(now)
    }
}
