// ============================================
// File: crates/droneauth-server/src/error.rs
// ============================================
//! # Server Error Types
//!
//! ## Creation Reason
//! Outcomes of handling AUTH_REQUEST and PROOF messages, plus the usual
//! configuration and startup failures.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Every handshake error is answered with AUTH_FAILURE and the server
//!   keeps running. Only config and startup errors are fatal.
//!
//! ## Last Modified
//! v0.1.0 - Initial ground station errors

use thiserror::Error;

use droneauth_common::error::CommonError;
use droneauth_common::{Challenge, Identity};
use droneauth_core::crypto::Rejection;
use droneauth_core::error::CoreError;
use droneauth_transport::error::TransportError;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server error types.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        path: String,
        reason: String,
    },

    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        field: String,
        reason: String,
    },

    /// Identity not in the authorized set.
    #[error("Unauthorized drone: {identity}")]
    Unauthorized {
        identity: Identity,
    },

    /// No session has this challenge pending.
    #[error("Unknown challenge: {challenge}")]
    UnknownChallenge {
        challenge: Challenge,
    },

    /// The proof failed a verifier check.
    #[error("Verification failed for {identity}: {reason}")]
    VerificationFailed {
        identity: Identity,
        reason: Rejection,
    },

    #[error("Server failed to start: {reason}")]
    StartupFailed {
        reason: String,
    },

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ServerError {
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn startup_failed(reason: impl Into<String>) -> Self {
        Self::StartupFailed {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad { .. } | Self::ConfigInvalid { .. })
    }

    /// Errors that end a handshake attempt with AUTH_FAILURE.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::UnknownChallenge { .. }
                | Self::VerificationFailed { .. }
        )
    }

    /// Outcomes worth a warning: unknown identities and forged or
    /// tampered proofs.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::VerificationFailed {
                    reason: Rejection::CommitmentMismatch | Rejection::ProofSize { .. },
                    ..
                }
        )
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigInvalid { .. } | Self::StartupFailed { .. }
        )
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::UnknownChallenge { .. } => true,
            Self::VerificationFailed {
                reason: Rejection::Stale { .. },
                ..
            } => true,
            _ => false,
        }
    }
}
