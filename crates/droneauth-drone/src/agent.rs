// ============================================
// File: crates/droneauth-drone/src/agent.rs
// ============================================
//! # Drone Orchestrator
//!
//! ## Creation Reason
//! Wires a [`ClientSession`] to a transport and runs it until Ctrl+C or
//! a programmatic shutdown.
//!
//! ## Main Logical Flow
//! 1. Derive the prover secret and commitment from config
//! 2. Bind the UDP transport
//! 3. Spawn the [`NodeRunner`] for the session
//! 4. Wait for shutdown, signal the runner, join with a timeout
//!
//! ## ⚠️ Important Note for Next Developer
//! - `run_on` accepts any `Transport`; tests pass a `MemoryTransport`
//! - The session logs its own summary when the runner stops it
//!
//! ## Last Modified
//! v0.1.0 - Initial drone orchestrator

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use droneauth_transport::{NodeRunner, Transport, UdpTransport};

use crate::config::DroneConfig;
use crate::error::{DroneError, Result};
use crate::session::{ClientSession, ClientStats};

/// How long shutdown waits for the runner to hand back the session.
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A drone process.
pub struct Drone {
    config: DroneConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl Drone {
    /// Creates a drone from a validated config.
    #[must_use]
    pub fn new(config: DroneConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Binds UDP and runs until shutdown.
    ///
    /// # Errors
    /// `StartupFailed` if the socket cannot be bound, or a `CoreError` if
    /// the session cannot be initialized.
    pub async fn run(&self) -> Result<Option<ClientStats>> {
        let transport = UdpTransport::bind_addr(self.config.network.bind_addr)
            .await
            .map_err(|e| DroneError::startup_failed(format!("UDP bind failed: {e}")))?;
        self.run_on(Arc::new(transport)).await
    }

    /// Runs over an already bound transport until shutdown. Returns the
    /// final counters, or `None` if the runner did not stop in time.
    ///
    /// # Errors
    /// Propagates session initialization failures.
    pub async fn run_on<T>(&self, transport: Arc<T>) -> Result<Option<ClientStats>>
    where
        T: Transport + 'static,
    {
        info!("Starting drone v{}", env!("CARGO_PKG_VERSION"));

        let session = ClientSession::from_config(&self.config)?;
        let name = session.identity().to_string();
        let local_addr = transport.local_addr()?;
        info!(
            identity = %name,
            %local_addr,
            ground_station = %self.config.network.ground_station,
            "Drone started"
        );

        let control_rx = self.shutdown_tx.subscribe();
        let runner = NodeRunner::new(name, session, transport);
        let task = tokio::spawn(runner.run(self.shutdown_tx.subscribe()));

        self.wait_for_shutdown(control_rx).await;
        info!("Shutting down drone...");
        let _ = self.shutdown_tx.send(());

        let stats = match tokio::time::timeout(JOIN_TIMEOUT, task).await {
            Ok(Ok(session)) => Some(session.stats()),
            Ok(Err(e)) => {
                warn!(error = %e, "Drone task failed");
                None
            }
            Err(_) => {
                warn!("Drone task timed out during shutdown");
                None
            }
        };

        info!("Drone shutdown complete");
        Ok(stats)
    }

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

    /// Triggers shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl std::fmt::Debug for Drone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drone")
            .field("id", &self.config.drone.id)
            .field("ground_station", &self.config.network.ground_station)
            .finish_non_exhaustive()
    }
}
