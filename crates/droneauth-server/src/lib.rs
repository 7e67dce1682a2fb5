// ============================================
// File: crates/droneauth-server/src/lib.rs
// ============================================
//! # DroneAuth Ground Station Library
//!
//! ## Creation Reason
//! Verifies that drones know the secret behind the commitment they
//! registered, without the secret ever leaving the drone.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: Ground station configuration
//! - [`server`]: Main server orchestration
//! - [`services`]: Handshake logic
//!   - [`services::registry`]: The ground station `ProtocolNode`
//!   - [`services::session`]: Per-drone verifier state
//!   - [`services::stats`]: Counters
//! - [`error`]: Server-specific error types
//!
//! ## Architecture Overview
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                   Ground Station                   │
//! ├────────────────────────────────────────────────────┤
//! │  ┌──────────┐     ┌──────────┐     ┌────────────┐  │
//! │  │  Config  │────►│  Server  │────►│ NodeRunner │  │
//! │  └──────────┘     └──────────┘     └─────┬──────┘  │
//! │                                          ▼         │
//! │                                  ┌──────────────┐  │
//! │                                  │ServerRegistry│  │
//! │                                  └──────────────┘  │
//! ├────────────────────────────────────────────────────┤
//! │                 UDP Transport                      │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Configuration changes require restart (no hot-reload)
//! - Counters are logged when the runner stops the registry
//!
//! ## Last Modified
//! v0.1.0 - Initial ground station library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod server;
pub mod services;

// Re-export primary types
pub use config::GroundStationConfig;
pub use error::{Result, ServerError};
pub use server::Server;
pub use services::{ServerRegistry, ServerStats};
