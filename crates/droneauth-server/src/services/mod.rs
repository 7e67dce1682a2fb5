// ============================================
// File: crates/droneauth-server/src/services/mod.rs
// ============================================
//! # Ground Station Services
//!
//! ## Creation Reason
//! Handshake logic for the ground station, separated from transport and
//! process concerns.
//!
//! ### Submodules
//! - [`registry`]: `ServerRegistry`, the ground station `ProtocolNode`
//! - [`session`]: Per-drone verifier state and the session table
//! - [`stats`]: Counters reported on shutdown
//!
//! ## Service Architecture
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               ServerRegistry                 │
//! │  authorized set ── SessionTable ── Stats     │
//! │                       │                      │
//! │                       ▼                      │
//! │          Session { ProofEngine (verifier),   │
//! │                    pending challenge,        │
//! │                    reply address }           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial services structure

pub mod registry;
pub mod session;
pub mod stats;

// Re-export primary types
pub use registry::ServerRegistry;
pub use session::{Session, SessionTable};
pub use stats::ServerStats;
