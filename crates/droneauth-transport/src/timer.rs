// ============================================
// File: crates/droneauth-transport/src/timer.rs
// ============================================
//! # Timer Service
//!
//! ## Creation Reason
//! Turns the `Schedule` / `Cancel` actions of a node into real delays on
//! the Tokio clock and feeds fired tokens back into the event loop.
//!
//! ## Main Logical Flow
//! 1. `schedule(token, after)` spawns a task that sleeps, then pushes
//!    `(token, generation)` into a channel
//! 2. `cancel(token)` aborts the task and forgets the token
//! 3. `next()` yields only tokens that are still pending with a matching
//!    generation; anything else is stale and skipped
//!
//! ## ⚠️ Important Note for Next Developer
//! - A cancelled timer is never yielded, even if its task already fired
//! - Re-scheduling a pending token replaces it
//! - Uses `tokio::time`, so `tokio::time::pause()` controls it in tests
//!
//! ## Last Modified
//! v0.1.0 - Initial timer service

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

use droneauth_core::node::TimerToken;

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Cancellable one-shot timers keyed by [`TimerToken`].
pub struct TimerService {
    tx: mpsc::UnboundedSender<(TimerToken, u64)>,
    rx: mpsc::UnboundedReceiver<(TimerToken, u64)>,
    pending: HashMap<TimerToken, PendingTimer>,
    generation: u64,
}

impl TimerService {
    /// Creates a service with no pending timers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            pending: HashMap::new(),
            generation: 0,
        }
    }

    /// Arms `token` to fire after `after`. Must be called inside a Tokio
    /// runtime.
    pub fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the service was dropped.
            let _ = tx.send((token, generation));
        });

        if let Some(old) = self.pending.insert(token, PendingTimer { generation, handle }) {
            old.handle.abort();
        }
        trace!(%token, ?after, "Timer scheduled");
    }

    /// Cancels `token`. Returns `false` if it was not pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        match self.pending.remove(&token) {
            Some(timer) => {
                timer.handle.abort();
                trace!(%token, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every pending timer.
    pub fn cancel_all(&mut self) {
        for (_, timer) in self.pending.drain() {
            timer.handle.abort();
        }
    }

    /// Returns `true` if `token` is armed.
    #[must_use]
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.contains_key(&token)
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Waits for the next live timer. Never completes while nothing is
    /// armed. Cancel-safe.
    pub async fn next(&mut self) -> TimerToken {
        loop {
            // The service holds a sender, so the channel never closes.
            let Some((token, generation)) = self.rx.recv().await else {
                return std::future::pending().await;
            };

            let live = self
                .pending
                .get(&token)
                .is_some_and(|timer| timer.generation == generation);
            if live {
                self.pending.remove(&token);
                return token;
            }
            trace!(%token, "Stale timer event discarded");
        }
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for TimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerService")
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================
