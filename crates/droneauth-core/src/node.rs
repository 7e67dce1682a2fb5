// ============================================
// File: crates/droneauth-core/src/node.rs
// ============================================
//! # Protocol Node Interface
//!
//! ## Creation Reason
//! Drones and the ground station are written as plain state machines
//! that never touch a socket or a clock directly. They consume events
//! and return [`Action`]s; the runtime in `droneauth-transport` carries
//! the actions out.
//!
//! ## Main Logical Flow
//! ```text
//!   datagram ──► on_message ──┐
//!   timer    ──► on_timer   ──┼──► Vec<Action> ──► Send / Schedule / Cancel
//!   lifecycle──► start/stop ──┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Tokens are allocated by the node and never reused; a node must
//!   ignore a token it no longer considers live
//! - `Cancel` of an unknown or already-fired token is a no-op
//!
//! ## Last Modified
//! v0.1.0 - Initial node interface

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

// ============================================
// TimerToken
// ============================================

/// Opaque handle naming one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Wraps a raw token value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Monotonic token source, one per node.
#[derive(Debug, Default)]
pub struct TokenAllocator {
    next: u64,
}

impl TokenAllocator {
    /// Creates an allocator starting at token 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a token never handed out before by this allocator.
    pub fn allocate(&mut self) -> TimerToken {
        let token = TimerToken(self.next);
        self.next = self.next.wrapping_add(1);
        token
    }
}

// ============================================
// Action
// ============================================

/// Side effect requested by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send `payload` as one datagram to `dest`.
    Send {
        /// Destination address
        dest: SocketAddr,
        /// Encoded message
        payload: Bytes,
    },
    /// Deliver `token` to `on_timer` after `after` has elapsed.
    Schedule {
        /// Token to deliver
        token: TimerToken,
        /// Delay from now
        after: Duration,
    },
    /// Forget a previously scheduled token.
    Cancel(TimerToken),
}

impl Action {
    /// Shorthand for [`Action::Send`].
    #[must_use]
    pub fn send(dest: SocketAddr, payload: Bytes) -> Self {
        Self::Send { dest, payload }
    }

    /// Shorthand for [`Action::Schedule`].
    #[must_use]
    pub const fn schedule(token: TimerToken, after: Duration) -> Self {
        Self::Schedule { token, after }
    }
}

// ============================================
// ProtocolNode
// ============================================

/// A drone or ground station driven by an event loop.
pub trait ProtocolNode: Send {
    /// Called once before any message or timer is delivered.
    fn start(&mut self) -> Vec<Action>;

    /// Called once when the loop shuts down. Outstanding timers should be
    /// cancelled here.
    fn stop(&mut self) -> Vec<Action>;

    /// Handles one inbound datagram received from `from`.
    fn on_message(&mut self, bytes: &[u8], from: SocketAddr) -> Vec<Action>;

    /// Handles a fired timer.
    fn on_timer(&mut self, token: TimerToken) -> Vec<Action> {
        let _ = token;
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let mut alloc = TokenAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(a.to_string(), "timer#0");
    }
}
