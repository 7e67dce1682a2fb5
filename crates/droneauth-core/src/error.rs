// ============================================
// File: crates/droneauth-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines error types for wire decoding and proof engine misuse in the
//! DroneAuth core crate.
//!
//! ## Error Categories
//! 1. **Protocol Errors**: Truncated, overrunning or unknown messages
//! 2. **State Errors**: Prover or verifier used before initialization
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include secrets or passphrases in error messages
//! - A failed verification is NOT an error; `verify_proof` returns `false`
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use droneauth_common::error::CommonError;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// EngineRole
// ============================================

/// Which half of the proof engine an operation required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRole {
    /// Drone side: holds the secret.
    Prover,
    /// Ground station side: holds only the commitment.
    Verifier,
}

impl std::fmt::Display for EngineRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prover => f.write_str("prover"),
            Self::Verifier => f.write_str("verifier"),
        }
    }
}

// ============================================
// CoreError
// ============================================

/// Core error types for protocol and proof operations.
#[derive(Error, Debug)]
pub enum CoreError {
    // ========================================
    // State Errors
    // ========================================

    /// Prover or verifier state was required but never set up.
    #[error("Proof engine not initialized: {role} state required")]
    NotInitialized {
        /// Which role was missing
        role: EngineRole,
    },

    // ========================================
    // Protocol Errors
    // ========================================

    /// Unknown message type tag.
    #[error("Unknown message type: 0x{0:02x}")]
    UnknownMessageType(u8),

    /// Message is malformed (bad length field, invalid text).
    #[error("Malformed message: {reason}")]
    MalformedMessage {
        /// What's wrong with the message
        reason: String,
    },

    /// Message ended before a fixed-size field could be read.
    #[error("Message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort {
        /// Minimum expected length
        expected: usize,
        /// Actual length remaining
        actual: usize,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CoreError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `NotInitialized` error for the prover.
    #[must_use]
    pub const fn prover_not_initialized() -> Self {
        Self::NotInitialized {
            role: EngineRole::Prover,
        }
    }

    /// Creates a `NotInitialized` error for the verifier.
    #[must_use]
    pub const fn verifier_not_initialized() -> Self {
        Self::NotInitialized {
            role: EngineRole::Verifier,
        }
    }

    /// Creates a `MalformedMessage` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Creates a `MessageTooShort` error.
    #[must_use]
    pub const fn too_short(expected: usize, actual: usize) -> Self {
        Self::MessageTooShort { expected, actual }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if the bytes received from a peer could not be decoded.
    ///
    /// Every protocol error is answered with `AUTH_FAILURE` by the ground
    /// station.
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMessageType(_) | Self::MalformedMessage { .. } | Self::MessageTooShort { .. }
        )
    }

    /// Returns `true` if this is a local programming error, not peer input.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::too_short(32, 4);
        assert!(err.to_string().contains("32"));
        assert!(err.to_string().contains('4'));

        let err = CoreError::verifier_not_initialized();
        assert!(err.to_string().contains("verifier"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CoreError::UnknownMessageType(0xFF).is_protocol_error());
        assert!(CoreError::malformed("bad length").is_protocol_error());
        assert!(!CoreError::prover_not_initialized().is_protocol_error());
        assert!(CoreError::prover_not_initialized().is_state_error());
    }

    #[test]
    fn test_common_error_conversion() {
        let common = CommonError::invalid_utf8("identity");
        let core: CoreError = common.into();
        assert!(matches!(core, CoreError::Common(_)));
    }
}
