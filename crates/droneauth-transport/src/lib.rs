// ============================================
// File: crates/droneauth-transport/src/lib.rs
// ============================================
//! # DroneAuth Transport - Network I/O & Event Loop
//!
//! ## Creation Reason
//! Everything that touches sockets or clocks lives here, so the protocol
//! state machines in `droneauth-core` stay pure.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`traits`]: `Transport` trait definitions for abstraction
//! - [`udp`]: UDP socket implementation
//! - [`memory`]: In-process datagram network for tests
//! - [`timer`]: Cancellable timers for `Schedule`/`Cancel` actions
//! - [`runner`]: `NodeRunner`, the per-node event loop
//! - [`error`]: Transport-specific error types
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │      droneauth-server        droneauth-drone        │
//! │              │                      │               │
//! │              └──────────┬───────────┘               │
//! │                         ▼                           │
//! │   droneauth-core  ◄──  droneauth-transport          │
//! │                        You are here ◄──             │
//! │              │                │                     │
//! │              └───────┬────────┘                     │
//! │                      ▼                              │
//! │              droneauth-common                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always go through the `Transport` trait; tests swap in `MemoryTransport`
//! - The runner is the only place a node's actions are executed
//!
//! ## Last Modified
//! v0.1.0 - Initial transport layer implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod memory;
pub mod runner;
pub mod timer;
pub mod traits;
pub mod udp;

// Re-export primary types
pub use error::{Result, TransportError};
pub use memory::{MemoryNetwork, MemoryTransport};
pub use runner::NodeRunner;
pub use timer::TimerService;
pub use traits::{PacketSource, Transport, MAX_DATAGRAM_SIZE};
pub use udp::UdpTransport;
