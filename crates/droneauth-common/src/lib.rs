// ============================================
// File: crates/droneauth-common/src/lib.rs
// ============================================
//! # DroneAuth Common - Shared Utilities Library
//!
//! ## Creation Reason
//! Provides foundational types and utilities shared across all DroneAuth
//! crates, so that the drone and the ground station agree on what an
//! identity, a challenge and a timestamp are.
//!
//! ## Main Functionality
//! - [`types`]: `Identity`, `Challenge`, `Commitment`
//! - [`time`]: Nanosecond wall-clock timestamps and freshness checks
//! - [`error`]: Common error types and result aliases
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │      droneauth-server        droneauth-drone        │
//! │              │                      │               │
//! │              └──────────┬───────────┘               │
//! │                         ▼                           │
//! │   droneauth-core  ◄──  droneauth-transport          │
//! │              │                │                     │
//! │              └───────┬────────┘                     │
//! │                      ▼                              │
//! │              droneauth-common  ◄── You are here     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - changes affect everything
//! - Keep dependencies minimal
//! - Never put secret material in these types; secrets live in the proof engine
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use time::Timestamp;
pub use types::{Challenge, Commitment, Identity};
