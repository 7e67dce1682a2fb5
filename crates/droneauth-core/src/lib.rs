// ============================================
// File: crates/droneauth-core/src/lib.rs
// ============================================
//! # DroneAuth Core - Protocol & Proof Library
//!
//! ## Creation Reason
//! Provides the wire protocol, the commitment/challenge/proof engine and
//! the state-machine interface shared by drones and the ground station.
//! Nothing in this crate performs I/O.
//!
//! ## Main Functionality
//!
//! ### Protocol Module ([`protocol`])
//! - Message tags and structures (`AuthRequest`, `ChallengeMessage`, ...)
//! - Length-prefixed little-endian codec with bounds-checked decoding
//!
//! ### Crypto Module ([`crypto`])
//! - `ProofEngine`: secret derivation, commitments, challenges, proofs
//! - `Proof`, `Verdict`, `ProofStats`
//!
//! ### Node Module ([`node`])
//! - `ProtocolNode` trait, `Action`, `TimerToken`
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │      droneauth-server        droneauth-drone        │
//! │              │                      │               │
//! │              └──────────┬───────────┘               │
//! │                         ▼                           │
//! │   droneauth-core  ◄──  droneauth-transport          │
//! │   You are here                                      │
//! │              │                                      │
//! │              ▼                                      │
//! │       droneauth-common                              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Secret material lives only inside `ProofEngine` and is zeroized
//! - Wire layout changes break every deployed drone
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crypto;
pub mod error;
pub mod node;
pub mod protocol;

// Re-export commonly used items
pub use crypto::{Proof, ProofEngine, ProofStats, Rejection, Verdict};
pub use error::{CoreError, Result};
pub use node::{Action, ProtocolNode, TimerToken, TokenAllocator};
pub use protocol::{AuthRequest, ChallengeMessage, Message, MessageType};
