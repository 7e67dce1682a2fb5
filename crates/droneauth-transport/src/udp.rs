// ============================================
// File: crates/droneauth-transport/src/udp.rs
// ============================================
//! # UDP Transport Implementation
//!
//! ## Creation Reason
//! Real network transport for the ground station and drones, wrapping
//! Tokio's UDP socket with our `Transport` trait.
//!
//! ## Main Functionality
//! - `UdpTransport`: bind with `SO_REUSEADDR`, async send/receive
//! - Atomic shutdown flag
//!
//! ## ⚠️ Important Note for Next Developer
//! - UDP is connectionless; a lost AUTH_REQUEST is recovered only by the
//!   drone's timeout and retry
//! - The ground station must listen on a fixed port; drones usually bind
//!   port 0
//!
//! ## Last Modified
//! v0.1.0 - Initial UDP transport implementation

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, info, trace};

use crate::error::{Result, TransportError};
use crate::traits::{PacketSource, Transport};

// ============================================
// UdpTransport
// ============================================

/// UDP-based transport implementation.
///
/// # Example
/// ```ignore
/// use droneauth_transport::UdpTransport;
///
/// let transport = UdpTransport::bind("0.0.0.0:5000").await?;
/// let mut buf = [0u8; 1500];
/// let (len, source) = transport.recv(&mut buf).await?;
/// transport.send(&buf[..len], &source.addr).await?;
/// ```
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    shutdown: AtomicBool,
}

impl UdpTransport {
    /// Binds to an address given as a string (e.g. `"0.0.0.0:5000"`).
    ///
    /// # Errors
    /// - `InvalidAddress`: If the string does not parse
    /// - `BindFailed` / `AddressInUse`: If binding fails
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self> {
        let addr_str = addr.as_ref();
        let socket_addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| TransportError::InvalidAddress {
                addr: addr_str.to_string(),
            })?;

        Self::bind_addr(socket_addr).await
    }

    /// Binds to a socket address.
    ///
    /// # Errors
    /// Returns error if binding fails.
    #[allow(clippy::unused_async)]
    pub async fn bind_addr(addr: SocketAddr) -> Result<Self> {
        debug!(%addr, "Binding UDP transport");

        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| TransportError::io("creating UDP socket", e))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| TransportError::io("setting SO_REUSEADDR", e))?;

        socket
            .set_nonblocking(true)
            .map_err(|e| TransportError::io("setting non-blocking", e))?;

        socket.bind(&addr.into()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                TransportError::AddressInUse { addr }
            } else {
                TransportError::bind_failed(addr, e.to_string())
            }
        })?;

        let std_socket: std::net::UdpSocket = socket.into();
        let tokio_socket = UdpSocket::from_std(std_socket)
            .map_err(|e| TransportError::io("converting to Tokio socket", e))?;

        let local_addr = tokio_socket
            .local_addr()
            .map_err(|e| TransportError::io("getting local address", e))?;

        info!(%local_addr, "UDP transport bound");

        Ok(Self {
            socket: tokio_socket,
            local_addr,
            shutdown: AtomicBool::new(false),
        })
    }

    /// Checks if the transport has been shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, PacketSource)> {
        if self.is_shutdown() {
            return Err(TransportError::ShuttingDown);
        }

        let (len, addr) = self
            .socket
            .recv_from(buf)
            .await
            .map_err(|e| TransportError::ReceiveFailed {
                reason: e.to_string(),
            })?;

        trace!(len, peer = %addr, "Datagram received");
        Ok((len, PacketSource::new(addr)))
    }

    async fn send(&self, buf: &[u8], dest: &SocketAddr) -> Result<usize> {
        if self.is_shutdown() {
            return Err(TransportError::ShuttingDown);
        }

        let len = self
            .socket
            .send_to(buf, dest)
            .await
            .map_err(|e| TransportError::send_failed(*dest, e.to_string()))?;

        trace!(len, peer = %dest, "Datagram sent");
        Ok(len)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.local_addr)
    }

    async fn shutdown(&self) -> Result<()> {
        // The socket itself closes on drop.
        self.shutdown.store(true, Ordering::Release);
        debug!(local_addr = %self.local_addr, "UDP transport shut down");
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.is_shutdown()
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.local_addr)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

// ============================================
// Tests
// ============================================
