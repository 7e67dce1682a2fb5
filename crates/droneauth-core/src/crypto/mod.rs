// ============================================
// File: crates/droneauth-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes the hash-based commitment scheme used to authenticate
//! drones, built on the RustCrypto `sha2` implementation.
//!
//! ## Submodules
//! - [`engine`]: `ProofEngine`, prover and verifier state
//! - [`proof`]: `Proof`, `Verdict`, `ProofStats`
//!
//! ## ⚠️ Important Note for Next Developer
//! - This is NOT a zero-knowledge proof system; see the note in [`engine`]
//! - NEVER roll your own hash; use `sha2`
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

use std::time::Duration;

pub mod engine;
pub mod proof;

// Re-export primary types at module level
pub use engine::ProofEngine;
pub use proof::{Proof, ProofStats, Rejection, Verdict};

// ============================================
// Constants
// ============================================

/// Size of a SHA-256 digest (secret, commitment, honest proof).
pub const DIGEST_SIZE: usize = 32;

/// Size of the per-initialization prover nonce.
pub const NONCE_SIZE: usize = 32;

/// Random bytes drawn for each challenge.
pub const CHALLENGE_RANDOM_BYTES: usize = 16;

/// Every challenge starts with this prefix.
pub const CHALLENGE_PREFIX: &str = "CHALLENGE_";

/// Maximum allowed distance between a proof timestamp and the verifier clock.
pub const FRESHNESS_WINDOW: Duration = Duration::from_nanos(5_000_000_000);
