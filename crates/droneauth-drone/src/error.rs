// ============================================
// File: crates/droneauth-drone/src/error.rs
// ============================================
//! # Drone Error Types
//!
//! ## Creation Reason
//! Errors raised by the drone: configuration, attempt outcomes and
//! wrapped lower-layer failures.
//!
//! ## ⚠️ Important Note for Next Developer
//! - `Timeout` and `AuthRejected` are per-attempt outcomes. The session
//!   records them and keeps running; they never end the process.
//!
//! ## Last Modified
//! v0.1.0 - Initial drone errors

use std::time::Duration;

use thiserror::Error;

use droneauth_common::error::CommonError;
use droneauth_core::error::CoreError;
use droneauth_transport::error::TransportError;

/// Result type for drone operations.
pub type Result<T> = std::result::Result<T, DroneError>;

/// Drone error types.
#[derive(Error, Debug)]
pub enum DroneError {
    /// Configuration file could not be read or parsed.
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        /// Path that was read
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        /// Offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// No answer from the ground station in time.
    #[error("Authentication attempt {attempt} timed out after {after:?}")]
    Timeout {
        /// Attempt number, starting at 1
        attempt: u64,
        /// Configured timeout
        after: Duration,
    },

    /// The ground station answered AUTH_FAILURE.
    #[error("Authentication rejected by ground station")]
    AuthRejected,

    /// The drone could not start.
    #[error("Drone failed to start: {reason}")]
    StartupFailed {
        /// Underlying reason
        reason: String,
    },

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DroneError {
    /// Creates a config load error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a config validation error.
    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a startup error.
    pub fn startup_failed(reason: impl Into<String>) -> Self {
        Self::StartupFailed {
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration problems.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad { .. } | Self::ConfigInvalid { .. })
    }

    /// Returns `true` if the drone cannot continue.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigInvalid { .. } | Self::StartupFailed { .. }
        )
    }

    /// Returns `true` if a later attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = DroneError::Timeout {
            attempt: 2,
            after: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Authentication attempt 2 timed out after 5s");
        assert!(err.is_retryable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_classification() {
        let err = DroneError::config_invalid("drone.id", "must not be empty");
        assert!(err.is_config_error());
        assert!(err.is_fatal());

        assert!(!DroneError::AuthRejected.is_retryable());
        assert!(!DroneError::AuthRejected.is_fatal());
    }
}
