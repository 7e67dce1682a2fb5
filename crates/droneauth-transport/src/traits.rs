// ============================================
// File: crates/droneauth-transport/src/traits.rs
// ============================================
//! # Transport Traits
//!
//! ## Creation Reason
//! Abstract datagram interface so the same event loop runs over a real
//! UDP socket in production and over [`MemoryTransport`](crate::memory::MemoryTransport)
//! in tests.
//!
//! ## Main Functionality
//! - `Transport`: bind/send/receive/close over datagrams
//! - `PacketSource`: Metadata about received packets
//!
//! ## ⚠️ Important Note for Next Developer
//! - Implementations must be Send + Sync; the runner holds them in an `Arc`
//! - `recv` must be cancel-safe, it sits inside `tokio::select!`
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definitions

use std::net::SocketAddr;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::Result;

/// Largest datagram the runner reads in one call.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

// ============================================
// PacketSource
// ============================================

/// Metadata about the source of a received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketSource {
    /// Source address (IP and port). Replies go here.
    pub addr: SocketAddr,
    /// When the packet was received.
    pub timestamp: Instant,
}

impl PacketSource {
    /// Creates a new `PacketSource` stamped now.
    #[must_use]
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timestamp: Instant::now(),
        }
    }

    /// Returns the age of this packet (time since received).
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }
}

// ============================================
// Transport Trait
// ============================================

/// Abstract interface for datagram-based transport.
///
/// # Example
/// ```ignore
/// async fn echo<T: Transport>(transport: &T) -> Result<()> {
///     let mut buf = [0u8; 1500];
///     loop {
///         let (len, source) = transport.recv(&mut buf).await?;
///         transport.send(&buf[..len], &source.addr).await?;
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Receives one datagram into `buf`.
    ///
    /// # Errors
    /// `ShuttingDown` after [`shutdown`](Self::shutdown), otherwise an I/O
    /// failure.
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, PacketSource)>;

    /// Sends `buf` as one datagram to `dest`.
    ///
    /// # Errors
    /// Returns error if send fails.
    async fn send(&self, buf: &[u8], dest: &SocketAddr) -> Result<usize>;

    /// Returns the local address this transport is bound to.
    ///
    /// # Errors
    /// Returns error if address cannot be determined.
    fn local_addr(&self) -> Result<SocketAddr>;

    /// Closes the transport. Later operations fail with `ShuttingDown`.
    ///
    /// # Errors
    /// Returns error if shutdown fails.
    async fn shutdown(&self) -> Result<()>;

    /// Returns `true` if the transport is still active.
    fn is_active(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_source() {
        let addr: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        let source = PacketSource::new(addr);

        assert_eq!(source.addr, addr);
        assert!(source.age() < std::time::Duration::from_secs(1));
    }
}
