// ============================================
// File: crates/droneauth-server/src/server.rs
// ============================================
//! # Server Orchestrator
//!
//! ## Creation Reason
//! Binds the ground station socket and runs the [`ServerRegistry`] until
//! Ctrl+C or a programmatic shutdown.
//!
//! ## Server Architecture
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Server                    │
//! │  ┌───────────────┐     ┌─────────────────┐  │
//! │  │ UdpTransport  │◄───►│   NodeRunner    │  │
//! │  │ listen_addr   │     │  ServerRegistry │  │
//! │  └───────────────┘     └─────────────────┘  │
//! │          ▲                      ▲           │
//! │          └──── broadcast shutdown ──────────┤
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - One runner handles every datagram in arrival order
//! - Shutdown waits up to 5 s for the runner to return the registry
//!
//! ## Last Modified
//! v0.1.0 - Initial server implementation

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use droneauth_transport::{NodeRunner, Transport, UdpTransport};

use crate::config::GroundStationConfig;
use crate::error::{Result, ServerError};
use crate::services::{ServerRegistry, ServerStats};

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Ground station server.
pub struct Server {
    /// Server configuration.
    config: GroundStationConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl Server {
    /// Creates a new server instance.
    #[must_use]
    pub fn new(config: GroundStationConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Runs the server until shutdown.
    ///
    /// # Errors
    /// Returns error if the UDP socket cannot be bound.
    pub async fn run(&self) -> Result<Option<ServerStats>> {
        let udp = UdpTransport::bind_addr(self.config.network.listen_addr)
            .await
            .map_err(|e| ServerError::startup_failed(format!("UDP bind failed: {e}")))?;
        self.run_on(Arc::new(udp)).await
    }

    /// Runs over an already bound transport. Returns the final counters,
    /// or `None` if the runner did not stop in time.
    ///
    /// # Errors
    /// Returns error if the transport has no local address.
    pub async fn run_on<T>(&self, transport: Arc<T>) -> Result<Option<ServerStats>>
    where
        T: Transport + 'static,
    {
        info!("Starting ground station v{}", env!("CARGO_PKG_VERSION"));

        let registry = ServerRegistry::from_config(&self.config);
        let local_addr = transport.local_addr()?;
        info!(
            %local_addr,
            authorized = registry.authorized_count(),
            "Ground station listening"
        );

        let control_rx = self.shutdown_tx.subscribe();
        let runner = NodeRunner::new("ground-station", registry, transport);
        let task = tokio::spawn(runner.run(self.shutdown_tx.subscribe()));

        self.wait_for_shutdown(control_rx).await;
        info!("Shutting down ground station...");
        let _ = self.shutdown_tx.send(());

        let stats = match tokio::time::timeout(JOIN_TIMEOUT, task).await {
            Ok(Ok(registry)) => Some(registry.stats()),
            Ok(Err(e)) => {
                warn!(error = %e, "Ground station task failed");
                None
            }
            Err(_) => {
                warn!("Ground station task timed out during shutdown");
                None
            }
        };

        info!("Server shutdown complete");
        Ok(stats)
    }

    /// Waits for Ctrl+C or [`shutdown`](Self::shutdown).
    async fn wait_for_shutdown(&self, mut control: broadcast::Receiver<()>) {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => {
                    warn!(error = %e, "Ctrl+C unavailable, waiting for programmatic shutdown");
                    let _ = control.recv().await;
                }
            },
            _ = control.recv() => debug!("Programmatic shutdown requested"),
        }
    }

    /// Triggers server shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listen_addr", &self.config.network.listen_addr)
            .field("authorized", &self.config.auth.authorized_drones.len())
            .finish()
    }
}
