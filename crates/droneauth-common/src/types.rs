// ============================================
// File: crates/droneauth-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Gives the values that cross the wire distinct types, so an identity
//! cannot be passed where a challenge is expected.
//!
//! ## Main Functionality
//! - `Identity`: Opaque drone name (`DRONE_001`, ...)
//! - `Challenge`: Server-issued one-shot challenge string
//! - `Commitment`: 32-byte public commitment, logged only as a short prefix
//!
//! ## ⚠️ Important Note for Next Developer
//! - Identities are compared byte-for-byte; no normalisation
//! - `Commitment` may hold any length when decoded from a peer; only an
//!   honest prover produces exactly [`COMMITMENT_SIZE`] bytes
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================
// Constants
// ============================================

/// Size of an honestly generated commitment (SHA-256 output).
pub const COMMITMENT_SIZE: usize = 32;

/// Number of hex characters shown when a commitment is logged.
pub const SHORT_HEX_LEN: usize = 16;

// ============================================
// Identity
// ============================================

/// Name of a drone as presented in `AUTH_REQUEST`.
///
/// # Example
/// ```
/// use droneauth_common::types::Identity;
///
/// let id = Identity::from("DRONE_001");
/// assert_eq!(id.as_str(), "DRONE_001");
/// assert_eq!(id.to_string(), "DRONE_001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Creates an identity from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw bytes fed into secret derivation and the wire.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns `true` if the identity is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Identity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================
// Challenge
// ============================================

/// A challenge string of the form `CHALLENGE_<nanos>_<16 hex>`.
///
/// The server keeps at most one outstanding challenge per identity and
/// matches incoming proofs against it by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge(String);

impl Challenge {
    /// Wraps a challenge string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the challenge bytes as they are hashed and framed.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consumes the challenge and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Challenge {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Challenge {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Challenge {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================
// Commitment
// ============================================

/// Public commitment bytes sent in `AUTH_REQUEST` and echoed in every proof.
///
/// `Debug` and `Display` print only the first [`SHORT_HEX_LEN`] hex
/// characters so log lines stay short.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(Vec<u8>);

impl Commitment {
    /// Wraps raw commitment bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the commitment and returns the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no bytes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Hex prefix used in log output.
    #[must_use]
    pub fn short_hex(&self) -> String {
        short_hex(&self.0)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.short_hex())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_hex())
    }
}

impl From<Vec<u8>> for Commitment {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; COMMITMENT_SIZE]> for Commitment {
    fn from(bytes: [u8; COMMITMENT_SIZE]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================
// Helpers
// ============================================

/// Hex-encodes at most the first `SHORT_HEX_LEN / 2` bytes of `bytes`.
#[must_use]
pub fn short_hex(bytes: &[u8]) -> String {
    let take = bytes.len().min(SHORT_HEX_LEN / 2);
    hex::encode(&bytes[..take])
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality_is_exact() {
        assert_eq!(Identity::from("DRONE_001"), Identity::new("DRONE_001"));
        assert_ne!(Identity::from("DRONE_001"), Identity::from("drone_001"));
        assert!(Identity::from("").is_empty());
    }

    #[test]
    fn test_commitment_logs_short_prefix() {
        let commitment = Commitment::from([0xab_u8; COMMITMENT_SIZE]);
        assert_eq!(commitment.short_hex(), "abababababababab");
        assert_eq!(format!("{commitment:?}"), "Commitment(abababababababab)");
        assert_eq!(commitment.to_hex().len(), COMMITMENT_SIZE * 2);
    }

    #[test]
    fn test_short_hex_on_short_input() {
        assert_eq!(short_hex(&[0x01, 0x02]), "0102");
        assert_eq!(short_hex(&[]), "");
    }

    #[test]
    fn test_challenge_accessors() {
        let challenge = Challenge::from("CHALLENGE_1_0011223344556677");
        assert_eq!(challenge.as_bytes(), b"CHALLENGE_1_0011223344556677");
        assert_eq!(challenge.clone().into_string(), challenge.to_string());
    }
}
