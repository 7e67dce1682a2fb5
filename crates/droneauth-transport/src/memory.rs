// ============================================
// File: crates/droneauth-transport/src/memory.rs
// ============================================
//! # In-Memory Datagram Network
//!
//! ## Creation Reason
//! Lets the ground station and many drones exchange datagrams inside one
//! process, without sockets, so handshake and timeout tests are
//! deterministic under `tokio::time::pause()`.
//!
//! ## Main Functionality
//! - `MemoryNetwork`: Shared registry of bound endpoints
//! - `MemoryTransport`: One endpoint, implements [`Transport`]
//! - Traffic switch to silently drop datagrams addressed to an endpoint
//!
//! ## Usage in Tests
//! ```
//! use droneauth_transport::memory::MemoryNetwork;
//! use droneauth_transport::Transport;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let net = MemoryNetwork::new();
//! let station = net.bind("10.0.0.1:5000".parse()?)?;
//! let drone = net.bind("10.0.0.2:0".parse()?)?;
//!
//! drone.send(&[0x04], &station.local_addr()?).await?;
//! let mut buf = [0u8; 16];
//! let (len, src) = station.recv(&mut buf).await?;
//! assert_eq!(&buf[..len], &[0x04]);
//! assert_eq!(src.addr, drone.local_addr()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Semantics follow UDP: sending to an unbound or switched-off address
//!   succeeds and the datagram vanishes
//! - Queues are bounded; a full queue is reported as `SendFailed`
//! - For tests only, not a production transport
//!
//! ## Last Modified
//! v0.1.0 - Initial in-memory network

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{PacketSource, Transport};

// ============================================
// Constants
// ============================================

/// Maximum datagrams queued per endpoint.
const MAX_QUEUE_SIZE: usize = 1024;

/// First port handed out for port-0 binds.
const EPHEMERAL_PORT_START: u16 = 40_000;

// ============================================
// Mailbox
// ============================================

struct Mailbox {
    queue: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    notify: Notify,
    closed: AtomicBool,
}

impl Mailbox {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
        self.notify.notify_one();
    }
}

// ============================================
// MemoryNetwork
// ============================================

#[derive(Default)]
struct NetworkInner {
    endpoints: DashMap<SocketAddr, Arc<Mailbox>>,
    switched_off: DashSet<SocketAddr>,
    next_port: AtomicU16,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Shared in-process datagram network. Cloning yields another handle to
/// the same network.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

impl MemoryNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a new endpoint. Port 0 picks an unused port on the same IP.
    ///
    /// # Errors
    /// `AddressInUse` if the address is already bound.
    pub fn bind(&self, addr: SocketAddr) -> Result<MemoryTransport> {
        let addr = if addr.port() == 0 {
            self.ephemeral(addr)
        } else {
            addr
        };

        let mailbox = Arc::new(Mailbox::new());
        match self.inner.endpoints.entry(addr) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(TransportError::AddressInUse { addr });
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&mailbox));
            }
        }

        Ok(MemoryTransport {
            addr,
            mailbox,
            network: Arc::clone(&self.inner),
            shutdown: AtomicBool::new(false),
        })
    }

    fn ephemeral(&self, addr: SocketAddr) -> SocketAddr {
        loop {
            let offset = self.inner.next_port.fetch_add(1, Ordering::Relaxed);
            let mut candidate = addr;
            candidate.set_port(EPHEMERAL_PORT_START.wrapping_add(offset).max(1));
            if !self.inner.endpoints.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Silently drops every datagram sent to `addr` until
    /// [`restore_traffic_to`](Self::restore_traffic_to) is called.
    pub fn drop_traffic_to(&self, addr: SocketAddr) {
        self.inner.switched_off.insert(addr);
    }

    /// Resumes delivery to `addr`.
    pub fn restore_traffic_to(&self, addr: SocketAddr) {
        self.inner.switched_off.remove(&addr);
    }

    /// Datagrams placed in a mailbox so far.
    #[must_use]
    pub fn delivered_count(&self) -> u64 {
        self.inner.delivered.load(Ordering::Relaxed)
    }

    /// Datagrams discarded (switched off or unbound destination).
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Number of bound endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.inner.endpoints.len()
    }
}

impl std::fmt::Debug for MemoryNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNetwork")
            .field("endpoints", &self.endpoint_count())
            .field("delivered", &self.delivered_count())
            .field("dropped", &self.dropped_count())
            .finish()
    }
}

// ============================================
// MemoryTransport
// ============================================

/// One endpoint of a [`MemoryNetwork`].
pub struct MemoryTransport {
    addr: SocketAddr,
    mailbox: Arc<Mailbox>,
    network: Arc<NetworkInner>,
    shutdown: AtomicBool,
}

impl MemoryTransport {
    /// Number of datagrams waiting to be received.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.mailbox.queue.lock().len()
    }

    fn unregister(&self) {
        self.network
            .endpoints
            .remove_if(&self.addr, |_, mailbox| Arc::ptr_eq(mailbox, &self.mailbox));
        self.mailbox.close();
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, PacketSource)> {
        loop {
            if self.shutdown.load(Ordering::Acquire) || self.mailbox.closed.load(Ordering::Acquire) {
                return Err(TransportError::ShuttingDown);
            }

            let next = self.mailbox.queue.lock().pop_front();
            if let Some((packet, from)) = next {
                let len = packet.len().min(buf.len());
                buf[..len].copy_from_slice(&packet[..len]);
                return Ok((len, PacketSource::new(from)));
            }

            self.mailbox.notify.notified().await;
        }
    }

    async fn send(&self, buf: &[u8], dest: &SocketAddr) -> Result<usize> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(TransportError::ShuttingDown);
        }

        if self.network.switched_off.contains(dest) {
            trace!(from = %self.addr, to = %dest, "Datagram dropped by traffic switch");
            self.network.dropped.fetch_add(1, Ordering::Relaxed);
            return Ok(buf.len());
        }

        let Some(mailbox) = self.network.endpoints.get(dest).map(|m| Arc::clone(m.value())) else {
            trace!(from = %self.addr, to = %dest, "Datagram to unbound address dropped");
            self.network.dropped.fetch_add(1, Ordering::Relaxed);
            return Ok(buf.len());
        };

        {
            let mut queue = mailbox.queue.lock();
            if queue.len() >= MAX_QUEUE_SIZE {
                return Err(TransportError::send_failed(*dest, "receive queue full"));
            }
            queue.push_back((buf.to_vec(), self.addr));
        }
        mailbox.notify.notify_one();
        self.network.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(buf.len())
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.addr)
    }

    async fn shutdown(&self) -> Result<()> {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.unregister();
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.shutdown.load(Ordering::Acquire)
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.unregister();
        }
    }
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("addr", &self.addr)
            .field("pending", &self.pending_count())
            .field("active", &self.is_active())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_delivery_carries_source() {
        let net = MemoryNetwork::new();
        let a = net.bind(addr("10.0.0.1:5000")).unwrap();
        let b = net.bind(addr("10.0.0.2:6000")).unwrap();

        b.send(b"hello", &a.local_addr().unwrap()).await.unwrap();
        let mut buf = [0u8; 32];
        let (len, src) = a.recv(&mut buf).await.unwrap();

        assert_eq!(&buf[..len], b"hello");
        assert_eq!(src.addr, addr("10.0.0.2:6000"));
        assert_eq!(net.delivered_count(), 1);
    }

    #[tokio::test]
    async fn test_port_zero_allocates_distinct_ports() {
        let net = MemoryNetwork::new();
        let a = net.bind(addr("10.0.0.2:0")).unwrap();
        let b = net.bind(addr("10.0.0.2:0")).unwrap();
        assert_ne!(a.local_addr().unwrap(), b.local_addr().unwrap());
        assert_ne!(a.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_bind_rejected() {
        let net = MemoryNetwork::new();
        let _a = net.bind(addr("10.0.0.1:5000")).unwrap();
        assert!(matches!(
            net.bind(addr("10.0.0.1:5000")),
            Err(TransportError::AddressInUse { .. })
        ));
    }

    #[tokio::test]
    async fn test_traffic_switch_drops_silently() {
        let net = MemoryNetwork::new();
        let a = net.bind(addr("10.0.0.1:5000")).unwrap();
        let b = net.bind(addr("10.0.0.2:6000")).unwrap();

        net.drop_traffic_to(a.local_addr().unwrap());
        assert_eq!(b.send(b"x", &a.local_addr().unwrap()).await.unwrap(), 1);
        assert_eq!(a.pending_count(), 0);
        assert_eq!(net.dropped_count(), 1);

        net.restore_traffic_to(a.local_addr().unwrap());
        b.send(b"y", &a.local_addr().unwrap()).await.unwrap();
        assert_eq!(a.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_unbound_destination_is_not_an_error() {
        let net = MemoryNetwork::new();
        let a = net.bind(addr("10.0.0.1:5000")).unwrap();
        assert!(a.send(b"x", &addr("10.9.9.9:1")).await.is_ok());
        assert_eq!(net.dropped_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_unregisters_and_wakes_receiver() {
        let net = MemoryNetwork::new();
        let a = Arc::new(net.bind(addr("10.0.0.1:5000")).unwrap());

        let receiver = {
            let a = Arc::clone(&a);
            tokio::spawn(async move {
                let mut buf = [0u8; 8];
                a.recv(&mut buf).await
            })
        };
        tokio::task::yield_now().await;

        a.shutdown().await.unwrap();
        let result = receiver.await.unwrap();
        assert!(matches!(result, Err(TransportError::ShuttingDown)));
        assert_eq!(net.endpoint_count(), 0);

        // Address is free again.
        assert!(net.bind(addr("10.0.0.1:5000")).is_ok());
    }

    #[tokio::test]
    async fn test_drop_unregisters() {
        let net = MemoryNetwork::new();
        drop(net.bind(addr("10.0.0.1:5000")).unwrap());
        assert_eq!(net.endpoint_count(), 0);
    }
}
