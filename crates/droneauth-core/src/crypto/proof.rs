// ============================================
// File: crates/droneauth-core/src/crypto/proof.rs
// ============================================
//! # Proof Values
//!
//! ## Main Functionality
//! - `Proof`: What a drone sends in answer to a challenge
//! - `Verdict` / `Rejection`: Outcome of checking a proof
//! - `ProofStats`: Size and timing of the last generation/verification
//!
//! ## Last Modified
//! v0.1.0 - Initial proof types

use std::fmt;
use std::time::Duration;

use droneauth_common::time::Timestamp;
use droneauth_common::types::{Challenge, Commitment};

// ============================================
// Proof
// ============================================

/// Response to a challenge.
///
/// An honest prover fills `proof_data` with a 32-byte digest; decoded
/// proofs may carry any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// SHA-256(secret ‖ challenge ‖ nonce) when honest.
    pub proof_data: Vec<u8>,
    /// Commitment the prover registered in its request.
    pub commitment: Commitment,
    /// Challenge being answered.
    pub challenge: Challenge,
    /// Wall-clock time of generation.
    pub timestamp: Timestamp,
}

// ============================================
// Verdict
// ============================================

/// Why a proof was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `proof_data` was not exactly 32 bytes.
    ProofSize {
        /// Length received
        actual: usize,
    },
    /// The proof's commitment differs from the registered one.
    CommitmentMismatch,
    /// The proof timestamp is outside the freshness window.
    Stale {
        /// Distance from the verifier clock, in nanoseconds
        skew_nanos: u128,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProofSize { actual } => write!(f, "proof size {actual}, expected 32"),
            Self::CommitmentMismatch => f.write_str("commitment mismatch"),
            Self::Stale { skew_nanos } => write!(f, "stale proof ({skew_nanos} ns skew)"),
        }
    }
}

/// Outcome of [`ProofEngine::inspect_proof`](super::ProofEngine::inspect_proof).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// All checks passed.
    Accepted,
    /// The first check that failed.
    Rejected(Rejection),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Accepted`].
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns the rejection reason, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

// ============================================
// ProofStats
// ============================================

/// Measurements of the most recent proof operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProofStats {
    /// Bytes of `proof_data` last generated.
    pub proof_size: usize,
    /// Bytes of commitment carried by the last generated proof.
    pub commitment_size: usize,
    /// Time taken by the last `generate_proof`.
    pub generation_time: Duration,
    /// Time taken by the last verification.
    pub verification_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_accessors() {
        assert!(Verdict::Accepted.is_accepted());
        assert_eq!(Verdict::Accepted.rejection(), None);

        let v = Verdict::Rejected(Rejection::CommitmentMismatch);
        assert!(!v.is_accepted());
        assert_eq!(v.rejection(), Some(Rejection::CommitmentMismatch));
    }

    #[test]
    fn test_rejection_display() {
        let r = Rejection::ProofSize { actual: 5 };
        assert!(r.to_string().contains('5'));
        assert!(Rejection::Stale { skew_nanos: 10 }.to_string().contains("stale"));
    }
}
