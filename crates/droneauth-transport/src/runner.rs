// ============================================
// File: crates/droneauth-transport/src/runner.rs
// ============================================
//! # Node Runner
//!
//! ## Creation Reason
//! The single event loop that drives one [`ProtocolNode`]: datagrams and
//! timer expiries are delivered one at a time, to completion, and the
//! node's returned actions are carried out before the next event.
//!
//! ## Main Logical Flow
//! ```text
//! start() ─► apply ─► loop {
//!     select! {
//!         shutdown        ─► break
//!         transport.recv  ─► on_message ─► apply
//!         timers.next     ─► on_timer   ─► apply
//!     }
//! } ─► stop() ─► apply ─► cancel timers ─► transport.shutdown()
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Events are serialized; the node needs no internal locking
//! - A failed send is logged and dropped, like a lost UDP datagram
//! - `run` returns the node so tests can inspect its final state
//!
//! ## Last Modified
//! v0.1.0 - Initial runner

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use droneauth_core::node::{Action, ProtocolNode};

use crate::timer::TimerService;
use crate::traits::{Transport, MAX_DATAGRAM_SIZE};

/// Event loop binding a node to a transport and a timer service.
pub struct NodeRunner<N, T> {
    name: String,
    node: N,
    transport: Arc<T>,
    timers: TimerService,
}

impl<N, T> NodeRunner<N, T>
where
    N: ProtocolNode,
    T: Transport + 'static,
{
    /// Creates a runner. `name` labels log lines.
    pub fn new(name: impl Into<String>, node: N, transport: Arc<T>) -> Self {
        Self {
            name: name.into(),
            node,
            transport,
            timers: TimerService::new(),
        }
    }

    /// Read access to the node before the loop starts.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Runs until `shutdown` fires (or its sender is dropped), or the
    /// transport fails fatally. Returns the node.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> N {
        info!(node = %self.name, "Node starting");
        let actions = self.node.start();
        self.apply(actions).await;

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!(node = %self.name, "Shutdown signal received");
                    break;
                }
                result = self.transport.recv(&mut buf) => match result {
                    Ok((len, source)) => {
                        let actions = self.node.on_message(&buf[..len], source.addr);
                        self.apply(actions).await;
                    }
                    Err(e) if e.is_fatal() => {
                        warn!(node = %self.name, error = %e, "Transport closed");
                        break;
                    }
                    Err(e) => {
                        warn!(node = %self.name, error = %e, "Receive failed");
                    }
                },
                token = self.timers.next() => {
                    let actions = self.node.on_timer(token);
                    self.apply(actions).await;
                }
            }
        }

        let actions = self.node.stop();
        self.apply(actions).await;
        self.timers.cancel_all();

        if let Err(e) = self.transport.shutdown().await {
            warn!(node = %self.name, error = %e, "Transport shutdown failed");
        }
        info!(node = %self.name, "Node stopped");
        self.node
    }

    async fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Send { dest, payload } => {
                    if let Err(e) = self.transport.send(&payload, &dest).await {
                        warn!(node = %self.name, peer = %dest, error = %e, "Send failed");
                    }
                }
                Action::Schedule { token, after } => self.timers.schedule(token, after),
                Action::Cancel(token) => {
                    self.timers.cancel(token);
                }
            }
        }
    }
}

impl<N, T> std::fmt::Debug for NodeRunner<N, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRunner")
            .field("name", &self.name)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use bytes::Bytes;
    use droneauth_core::node::{TimerToken, TokenAllocator};

    use crate::memory::MemoryNetwork;

    /// Echoes every datagram and counts timer ticks.
    #[derive(Default)]
    struct Echo {
        tokens: TokenAllocator,
        received: Vec<Vec<u8>>,
        ticks: u32,
        cancelled: Option<TimerToken>,
        stopped: bool,
    }

    impl ProtocolNode for Echo {
        fn start(&mut self) -> Vec<Action> {
            let tick = self.tokens.allocate();
            let never = self.tokens.allocate();
            self.cancelled = Some(never);
            vec![
                Action::schedule(tick, Duration::from_millis(10)),
                Action::schedule(never, Duration::from_millis(20)),
                Action::Cancel(never),
            ]
        }

        fn stop(&mut self) -> Vec<Action> {
            self.stopped = true;
            Vec::new()
        }

        fn on_message(&mut self, bytes: &[u8], from: SocketAddr) -> Vec<Action> {
            self.received.push(bytes.to_vec());
            vec![Action::send(from, Bytes::copy_from_slice(bytes))]
        }

        fn on_timer(&mut self, token: TimerToken) -> Vec<Action> {
            assert_ne!(Some(token), self.cancelled);
            self.ticks += 1;
            Vec::new()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_delivers_messages_and_timers() {
        let net = MemoryNetwork::new();
        let node_addr: SocketAddr = "10.0.0.1:7000".parse().unwrap();
        let transport = Arc::new(net.bind(node_addr).unwrap());
        let peer = net.bind("10.0.0.2:7001".parse().unwrap()).unwrap();

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(NodeRunner::new("echo", Echo::default(), transport).run(rx));

        peer.send(b"ping", &node_addr).await.unwrap();
        let mut buf = [0u8; 16];
        let (len, src) = peer.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");
        assert_eq!(src.addr, node_addr);

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        let node = handle.await.unwrap();

        assert_eq!(node.received, vec![b"ping".to_vec()]);
        assert_eq!(node.ticks, 1);
        assert!(node.stopped);
        assert_eq!(net.endpoint_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_exits_when_sender_dropped() {
        let net = MemoryNetwork::new();
        let transport = Arc::new(net.bind("10.0.0.1:7000".parse().unwrap()).unwrap());

        let (tx, rx) = broadcast::channel::<()>(1);
        let handle = tokio::spawn(NodeRunner::new("echo", Echo::default(), transport).run(rx));
        drop(tx);

        let node = handle.await.unwrap();
        assert!(node.stopped);
    }
}
