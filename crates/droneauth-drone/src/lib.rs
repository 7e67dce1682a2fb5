// ============================================
// File: crates/droneauth-drone/src/lib.rs
// ============================================
//! # DroneAuth Drone Library
//!
//! ## Creation Reason
//! The drone side of the commitment / challenge / proof handshake with a
//! ground station.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`session`]: `ClientSession` state machine (a `ProtocolNode`)
//! - [`agent`]: `Drone` orchestrator binding the session to UDP
//! - [`config`]: Drone configuration
//! - [`error`]: Drone-specific error types
//!
//! ## Handshake
//! ```text
//! Drone                                   Ground station
//!   │ AUTH_REQUEST(id, commitment) ─────────► │
//!   │ ◄───────────────────────── CHALLENGE    │
//!   │ PROOF(proof, commitment, challenge, ts)►│
//!   │ ◄─────────────── AUTH_SUCCESS / FAILURE │
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The session never touches sockets or clocks; `NodeRunner` does
//! - The passphrase only lives inside the `ProofEngine`
//!
//! ## Last Modified
//! v0.1.0 - Initial drone library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod config;
pub mod error;
pub mod session;

// Re-export primary types
pub use agent::Drone;
pub use config::DroneConfig;
pub use error::{DroneError, Result};
pub use session::{ClientSession, ClientState, ClientStats, SessionSettings};
