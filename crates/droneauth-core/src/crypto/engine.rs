// ============================================
// File: crates/droneauth-core/src/crypto/engine.rs
// ============================================
//! # Proof Engine
//!
//! ## Creation Reason
//! Holds the per-identity cryptographic state on both sides of the
//! handshake: the drone's secret (prover) and the ground station's copy
//! of the drone's commitment (verifier).
//!
//! ## Main Logical Flow
//! ```text
//! Drone (prover)                          Ground station (verifier)
//!   initialize_prover(id, pw)
//!     nonce  = random 32 bytes
//!     secret = SHA256(id ‖ pw ‖ nonce)
//!   create_commitment()
//!     C = SHA256(secret ‖ nonce)  ──────►  initialize_verifier(C, id)
//!                                          generate_challenge()
//!   generate_proof(ch)           ◄──────   "CHALLENGE_<ns>_<16 hex>"
//!     P = SHA256(secret ‖ ch ‖ nonce)
//!     {P, C, ch, now}            ──────►   verify_proof(proof)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Verification checks the proof SIZE, the commitment and the timestamp.
//!   It does NOT recompute `proof_data`; the verifier never has the
//!   secret. Deployed drones rely on exactly these checks.
//! - The secret and nonce are zeroized on `reset()`, on re-initialization
//!   and on drop (zeroize 1.3, manual `Drop`)
//! - `Debug` never prints secret material
//!
//! ## Last Modified
//! v0.1.0 - Initial proof engine

use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, trace};
use zeroize::Zeroize;

use droneauth_common::time::Timestamp;
use droneauth_common::types::{Challenge, Commitment, Identity};

use super::proof::{Proof, ProofStats, Rejection, Verdict};
use super::{CHALLENGE_PREFIX, CHALLENGE_RANDOM_BYTES, DIGEST_SIZE, FRESHNESS_WINDOW, NONCE_SIZE};
use crate::error::{CoreError, Result};

// ============================================
// Prover State
// ============================================

struct ProverSecret {
    secret: [u8; DIGEST_SIZE],
    nonce: [u8; NONCE_SIZE],
}

impl Drop for ProverSecret {
    fn drop(&mut self) {
        self.secret.zeroize();
        self.nonce.zeroize();
    }
}

// ============================================
// ProofEngine
// ============================================

/// Commitment/challenge/proof state for one identity.
///
/// # Example
/// ```
/// use droneauth_core::crypto::ProofEngine;
/// use droneauth_common::types::Identity;
///
/// let mut drone = ProofEngine::new();
/// drone.initialize_prover(&Identity::from("DRONE_001"), "secret-pass");
/// let commitment = drone.create_commitment().unwrap();
///
/// let mut station = ProofEngine::new();
/// station.initialize_verifier(commitment, Identity::from("DRONE_001"));
/// let challenge = station.generate_challenge();
///
/// let proof = drone.generate_proof(&challenge).unwrap();
/// assert!(station.verify_proof(&proof).unwrap());
/// ```
#[derive(Default)]
pub struct ProofEngine {
    identity: Option<Identity>,
    prover: Option<ProverSecret>,
    commitment: Option<Commitment>,
    verifier_ready: bool,
    last_challenge: Option<Challenge>,
    stats: ProofStats,
}

impl ProofEngine {
    /// Creates an engine with no prover or verifier state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // Prover
    // ========================================

    /// Derives a fresh secret from `identity`, `passphrase` and a new
    /// random nonce.
    ///
    /// Re-initializing discards the previous secret and commitment.
    pub fn initialize_prover(&mut self, identity: &Identity, passphrase: &str) {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let mut hasher = Sha256::new();
        hasher.update(identity.as_bytes());
        hasher.update(passphrase.as_bytes());
        hasher.update(nonce);
        let secret: [u8; DIGEST_SIZE] = hasher.finalize().into();

        // Old ProverSecret is zeroized as it drops here.
        self.prover = Some(ProverSecret { secret, nonce });
        self.commitment = None;
        self.identity = Some(identity.clone());
        nonce.zeroize();

        debug!(identity = %identity, "Prover initialized");
    }

    /// Computes and stores SHA-256(secret ‖ nonce).
    ///
    /// # Errors
    /// `NotInitialized` if no prover state exists.
    pub fn create_commitment(&mut self) -> Result<Commitment> {
        let prover = self
            .prover
            .as_ref()
            .ok_or(CoreError::prover_not_initialized())?;

        let mut hasher = Sha256::new();
        hasher.update(prover.secret);
        hasher.update(prover.nonce);
        let digest: [u8; DIGEST_SIZE] = hasher.finalize().into();
        let commitment = Commitment::from(digest);

        trace!(commitment = %commitment, "Commitment created");
        self.commitment = Some(commitment.clone());
        Ok(commitment)
    }

    /// Answers `challenge` with SHA-256(secret ‖ challenge ‖ nonce).
    ///
    /// The proof carries the stored commitment; if
    /// [`create_commitment`](Self::create_commitment) was never called it
    /// carries an empty one, which no verifier accepts.
    ///
    /// # Errors
    /// `NotInitialized` if no prover state exists.
    pub fn generate_proof(&mut self, challenge: &Challenge) -> Result<Proof> {
        let start = Instant::now();
        let prover = self
            .prover
            .as_ref()
            .ok_or(CoreError::prover_not_initialized())?;

        let mut hasher = Sha256::new();
        hasher.update(prover.secret);
        hasher.update(challenge.as_bytes());
        hasher.update(prover.nonce);
        let proof_data = hasher.finalize().to_vec();

        let proof = Proof {
            proof_data,
            commitment: self.commitment.clone().unwrap_or_default(),
            challenge: challenge.clone(),
            timestamp: Timestamp::now(),
        };

        self.stats.generation_time = start.elapsed();
        self.stats.proof_size = proof.proof_data.len();
        self.stats.commitment_size = proof.commitment.len();
        Ok(proof)
    }

    // ========================================
    // Verifier
    // ========================================

    /// Stores the commitment a drone registered. The secret is never known
    /// to the verifier.
    pub fn initialize_verifier(&mut self, commitment: Commitment, identity: Identity) {
        debug!(identity = %identity, commitment = %commitment, "Verifier initialized");
        self.commitment = Some(commitment);
        self.identity = Some(identity);
        self.verifier_ready = true;
    }

    /// Creates `CHALLENGE_<now ns>_<16 hex chars>` and remembers it.
    pub fn generate_challenge(&mut self) -> Challenge {
        let mut random = [0u8; CHALLENGE_RANDOM_BYTES];
        OsRng.fill_bytes(&mut random);

        // 8 bytes hex-encode to the 16 characters placed in the challenge.
        let challenge = Challenge::new(format!(
            "{CHALLENGE_PREFIX}{}_{}",
            Timestamp::now(),
            hex::encode(&random[..8])
        ));
        self.last_challenge = Some(challenge.clone());
        challenge
    }

    /// Returns `true` if `proof` passes every check.
    ///
    /// # Errors
    /// `NotInitialized` if no verifier state exists.
    pub fn verify_proof(&mut self, proof: &Proof) -> Result<bool> {
        Ok(self.inspect_proof(proof)?.is_accepted())
    }

    /// Checks `proof` against the local clock and reports which check
    /// failed first.
    ///
    /// # Errors
    /// `NotInitialized` if no verifier state exists.
    pub fn inspect_proof(&mut self, proof: &Proof) -> Result<Verdict> {
        self.inspect_proof_at(proof, Timestamp::now())
    }

    /// Same as [`inspect_proof`](Self::inspect_proof) with an explicit
    /// verifier clock.
    ///
    /// # Errors
    /// `NotInitialized` if no verifier state exists.
    pub fn inspect_proof_at(&mut self, proof: &Proof, now: Timestamp) -> Result<Verdict> {
        let start = Instant::now();
        if !self.verifier_ready {
            return Err(CoreError::verifier_not_initialized());
        }

        let verdict = self.check(proof, now);
        self.stats.verification_time = start.elapsed();
        Ok(verdict)
    }

    fn check(&self, proof: &Proof, now: Timestamp) -> Verdict {
        if proof.proof_data.len() != DIGEST_SIZE {
            return Verdict::Rejected(Rejection::ProofSize {
                actual: proof.proof_data.len(),
            });
        }
        let registered = self
            .commitment
            .as_ref()
            .is_some_and(|c| bool::from(c.as_bytes().ct_eq(proof.commitment.as_bytes())));
        if !registered {
            return Verdict::Rejected(Rejection::CommitmentMismatch);
        }
        if !proof.timestamp.is_within(now, FRESHNESS_WINDOW) {
            return Verdict::Rejected(Rejection::Stale {
                skew_nanos: proof.timestamp.abs_diff_nanos(now),
            });
        }
        Verdict::Accepted
    }

    // ========================================
    // State
    // ========================================

    /// Clears all prover and verifier state. The secret is zeroized.
    pub fn reset(&mut self) {
        self.prover = None;
        self.commitment = None;
        self.identity = None;
        self.verifier_ready = false;
        self.last_challenge = None;
    }

    /// `true` once [`initialize_prover`](Self::initialize_prover) has run.
    #[must_use]
    pub fn is_prover_initialized(&self) -> bool {
        self.prover.is_some()
    }

    /// `true` once [`initialize_verifier`](Self::initialize_verifier) has run.
    #[must_use]
    pub fn is_verifier_initialized(&self) -> bool {
        self.verifier_ready
    }

    /// Identity this engine was initialized for.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Stored commitment (created as prover or registered as verifier).
    #[must_use]
    pub fn commitment(&self) -> Option<&Commitment> {
        self.commitment.as_ref()
    }

    /// Challenge most recently produced by
    /// [`generate_challenge`](Self::generate_challenge).
    #[must_use]
    pub fn last_challenge(&self) -> Option<&Challenge> {
        self.last_challenge.as_ref()
    }

    /// Measurements of the last generation and verification.
    #[must_use]
    pub const fn last_stats(&self) -> ProofStats {
        self.stats
    }

    /// Freshness window applied by verification.
    #[must_use]
    pub const fn freshness_window() -> Duration {
        FRESHNESS_WINDOW
    }
}

impl fmt::Debug for ProofEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofEngine")
            .field("identity", &self.identity)
            .field("prover", &self.prover.is_some())
            .field("verifier", &self.verifier_ready)
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
