// ============================================
// File: crates/droneauth-common/src/error.rs
// ============================================
//! # Common Error Types
//!
//! ## Creation Reason
//! Provides foundational error types and result aliases used across
//! all DroneAuth crates.
//!
//! ## Design Philosophy
//! - Use `thiserror` for ergonomic error definitions
//! - Each crate defines its own error type that wraps `CommonError`
//! - Errors must be loggable without leaking passphrases or secrets
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Common result type for operations that may fail.
pub type Result<T> = std::result::Result<T, CommonError>;

// ============================================
// CommonError
// ============================================

/// Common error types shared across DroneAuth crates.
///
/// # Example
/// ```
/// use droneauth_common::error::{CommonError, Result};
///
/// fn validate_id(id: &str) -> Result<()> {
///     if id.is_empty() {
///         return Err(CommonError::invalid_input("identity", "cannot be empty"));
///     }
///     Ok(())
/// }
///
/// assert!(validate_id("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum CommonError {
    /// Invalid input data provided.
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the field or parameter
        field: String,
        /// Description of what's wrong
        reason: String,
    },

    /// Data length doesn't match expected size.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length received
        actual: usize,
    },

    /// Bytes that should have been UTF-8 text were not.
    #[error("Invalid UTF-8 in '{field}'")]
    InvalidUtf8 {
        /// Which field failed to decode
        field: String,
    },

    /// System clock is unusable (before the Unix epoch or out of range).
    #[error("System clock error: {reason}")]
    Clock {
        /// What went wrong with the clock
        reason: String,
    },

    /// System I/O error occurred.
    #[error("I/O error: {context}")]
    Io {
        /// What operation was being performed
        context: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl CommonError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidLength` error.
    #[must_use]
    pub const fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Creates an `InvalidUtf8` error.
    pub fn invalid_utf8(field: impl Into<String>) -> Self {
        Self::InvalidUtf8 {
            field: field.into(),
        }
    }

    /// Creates an `Io` error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if this error was caused by bad input from a peer.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InvalidLength { .. } | Self::InvalidUtf8 { .. }
        )
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "unspecified I/O operation".into(),
            source: err,
        }
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
        let err = CommonError::invalid_input("identity", "cannot be empty");
        assert!(err.to_string().contains("identity"));
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CommonError::invalid_utf8("challenge").is_client_error());
        assert!(CommonError::invalid_length(32, 4).is_client_error());

        let io = CommonError::io(
            "reading config",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(!io.is_client_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let common_err: CommonError = io_err.into();
        assert!(matches!(common_err, CommonError::Io { .. }));
    }
}
