// ============================================
// File: crates/droneauth-server/src/services/stats.rs
// ============================================
//! # Ground Station Counters

use std::fmt;

/// Totals since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// AUTH_REQUEST datagrams seen, including malformed ones.
    pub requests: u64,
    /// CHALLENGE messages sent.
    pub challenges_issued: u64,
    /// Proofs accepted.
    pub successes: u64,
    /// Unauthorized requests and rejected proofs.
    pub failures: u64,
    /// Datagrams that failed to decode.
    pub malformed: u64,
    /// Proofs naming a challenge no session has pending.
    pub unknown_challenges: u64,
}

impl ServerStats {
    /// Successes over requests, in percent. `0.0` before any request.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.successes as f64 / self.requests as f64 * 100.0
    }
}

impl fmt::Display for ServerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} challenges={} successes={} failures={} malformed={} unknown_challenges={} success_rate={:.1}%",
            self.requests,
            self.challenges_issued,
            self.successes,
            self.failures,
            self.malformed,
            self.unknown_challenges,
            self.success_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = ServerStats {
            requests: 3,
            successes: 1,
            ..ServerStats::default()
        };
        assert!((stats.success_rate() - 100.0 / 3.0).abs() < 1e-9);
        assert!(ServerStats::default().success_rate().abs() < f64::EPSILON);
        assert!(stats.to_string().contains("success_rate=33.3%"));
    }
}
