// ============================================
// File: crates/droneauth-core/src/protocol/mod.rs
// ============================================
//! # Protocol Module
//!
//! ## Creation Reason
//! Defines the wire protocol between drones and the ground station:
//! message tags, message structures and their binary framing.
//!
//! ## Submodules
//! - [`messages`]: Protocol message structures
//! - [`codec`]: Binary serialization/deserialization
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Drone ──────── AUTH_REQUEST (id, commitment) ────► Station │
//! │  Drone ◄─────── CHALLENGE (challenge) ───────────── Station │
//! │  Drone ──────── PROOF (proof) ────────────────────► Station │
//! │  Drone ◄─────── AUTH_SUCCESS / AUTH_FAILURE ─────── Station │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - There is no version byte; any layout change breaks deployed drones
//!
//! ## Last Modified
//! v0.1.0 - Initial protocol definitions

pub mod codec;
pub mod messages;

// Re-export primary types
pub use codec::{decode_message, decode_proof, encode_message, encode_proof, Codec, ProtocolCodec};
pub use messages::{AuthRequest, ChallengeMessage, Message, MessageType};
