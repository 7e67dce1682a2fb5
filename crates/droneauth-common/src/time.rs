// ============================================
// File: crates/droneauth-common/src/time.rs
// ============================================
//! # Time Utilities
//!
//! ## Creation Reason
//! Proofs and challenges are stamped with wall-clock time, and the
//! verifier rejects proofs whose stamp is too far from its own clock.
//! Both sides need the same unit and the same overflow-safe arithmetic.
//!
//! ## Main Functionality
//! - `Timestamp`: Nanoseconds since the Unix epoch (signed 64-bit)
//! - Freshness checks against the local clock
//! - Utility functions for current time
//!
//! ## ⚠️ Important Note for Next Developer
//! - The unit is NANOSECONDS, matching the `timestamp:i64` wire field
//! - Differences are computed in `i128` so hostile values cannot overflow
//! - A clock before the epoch reads as zero rather than panicking
//!
//! ## Last Modified
//! v0.1.0 - Initial time utilities

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================
// Timestamp
// ============================================

/// Wall-clock time in nanoseconds since the Unix epoch.
///
/// # Example
/// ```
/// use droneauth_common::time::Timestamp;
/// use std::time::Duration;
///
/// let now = Timestamp::now();
/// assert!(now.is_fresh(Duration::from_secs(5)));
///
/// let old = now.saturating_sub(Duration::from_secs(10));
/// assert!(!old.is_fresh(Duration::from_secs(5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from raw nanoseconds since the epoch.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Creates a timestamp for the current time.
    #[must_use]
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(i64::try_from(nanos).unwrap_or(i64::MAX))
    }

    /// Returns the raw nanoseconds since the epoch.
    #[must_use]
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp as little-endian bytes.
    #[must_use]
    pub const fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Creates a timestamp from little-endian bytes.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(i64::from_le_bytes(bytes))
    }

    /// Absolute distance between two timestamps in nanoseconds.
    #[must_use]
    pub fn abs_diff_nanos(&self, other: Self) -> u128 {
        (i128::from(self.0) - i128::from(other.0)).unsigned_abs()
    }

    /// Returns `true` if `|self - reference| <= window`.
    #[must_use]
    pub fn is_within(&self, reference: Self, window: Duration) -> bool {
        self.abs_diff_nanos(reference) <= window.as_nanos()
    }

    /// Returns `true` if the timestamp is within `window` of the local clock.
    #[must_use]
    pub fn is_fresh(&self, window: Duration) -> bool {
        self.is_within(Self::now(), window)
    }

    /// Returns a timestamp `duration` earlier, saturating at `i64::MIN`.
    #[must_use]
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        let delta = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self(self.0.saturating_sub(delta))
    }

    /// Returns a timestamp `duration` later, saturating at `i64::MAX`.
    #[must_use]
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let delta = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(delta))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================
// Utility Functions
// ============================================

/// Returns the current Unix time in nanoseconds.
#[must_use]
pub fn unix_timestamp_nanos() -> i64 {
    Timestamp::now().as_nanos()
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_is_after_2020() {
        // 2020-01-01T00:00:00Z in nanoseconds
        let y2020 = 1_577_836_800_i64 * 1_000_000_000;
        assert!(Timestamp::now().as_nanos() > y2020);
    }

    #[test]
    fn test_freshness_window_boundaries() {
        let reference = Timestamp::from_nanos(10_000_000_000);
        let window = Duration::from_secs(5);

        assert!(Timestamp::from_nanos(5_000_000_000).is_within(reference, window));
        assert!(Timestamp::from_nanos(15_000_000_000).is_within(reference, window));
        assert!(!Timestamp::from_nanos(4_999_999_999).is_within(reference, window));
        assert!(!Timestamp::from_nanos(15_000_000_001).is_within(reference, window));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let a = Timestamp::from_nanos(i64::MIN);
        let b = Timestamp::from_nanos(i64::MAX);
        assert_eq!(a.abs_diff_nanos(b), u128::from(u64::MAX));
        assert!(!a.is_fresh(Duration::from_secs(5)));
    }

    #[test]
    fn test_saturating_arithmetic() {
        let ts = Timestamp::from_nanos(i64::MIN + 1);
        assert_eq!(ts.saturating_sub(Duration::from_secs(1)).as_nanos(), i64::MIN);

        let ts = Timestamp::from_nanos(1_000);
        assert_eq!(ts.saturating_add(Duration::from_nanos(500)).as_nanos(), 1_500);
    }

    #[test]
    fn test_timestamp_bytes_roundtrip() {
        let original = Timestamp::now();
        assert_eq!(Timestamp::from_le_bytes(original.to_le_bytes()), original);
    }
}
