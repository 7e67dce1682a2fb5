// ============================================
// File: crates/droneauth-drone/src/session.rs
// ============================================
//! # Client Session
//!
//! ## Creation Reason
//! The drone side of the handshake as a [`ProtocolNode`]: request a
//! challenge, answer it with a proof, wait for the verdict, and retry
//! after a timeout.
//!
//! ## State Machine
//! ```text
//!            start delay / retry
//!   ┌──────┐ ──────────────────► ┌───────────────────┐
//!   │ Idle │   send AUTH_REQUEST │ AwaitingChallenge │
//!   └──────┘   arm timeout       └─────────┬─────────┘
//!      ▲                                   │ CHALLENGE
//!      │ retry timer                       ▼
//!   ┌──┴─────┐     timeout      ┌───────────────────┐
//!   │ Failed │ ◄─────────────── │ ProvingInProgress │
//!   └────────┘  (any waiting    └─────────┬─────────┘
//!      ▲         state)                   │ proof timer: send PROOF
//!      │ AUTH_FAILURE                     ▼
//!      │                        ┌───────────────────┐  AUTH_SUCCESS  ┌───────────────┐
//!      └─────────────────────── │  AwaitingResult   │ ─────────────► │ Authenticated │
//!                               └───────────────────┘                └───────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - At most one timeout timer is live; every new request cancels and
//!   replaces it
//! - Only a timeout schedules a retry. AUTH_FAILURE is final for the run
//! - A fired token not found in `live` is stale and ignored
//! - The prover secret is derived once in `new()`, so every attempt
//!   presents the same commitment
//!
//! ## Last Modified
//! v0.1.0 - Initial client session

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, info, warn};

use droneauth_common::{Challenge, Commitment, Identity};
use droneauth_core::node::{Action, ProtocolNode, TimerToken, TokenAllocator};
use droneauth_core::protocol::{decode_message, encode_message, AuthRequest, Message};
use droneauth_core::ProofEngine;

use crate::config::{DroneConfig, TimingConfig};
use crate::error::{DroneError, Result};

/// Delay between receiving a challenge and sending the proof.
pub const PROOF_DELAY: Duration = Duration::from_millis(1);

// ============================================
// ClientState
// ============================================

/// Where the drone is in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Not waiting for anything.
    Idle,
    /// AUTH_REQUEST sent.
    AwaitingChallenge,
    /// Challenge received, proof scheduled.
    ProvingInProgress,
    /// PROOF sent.
    AwaitingResult,
    /// The ground station accepted the proof. Terminal.
    Authenticated,
    /// The last attempt was rejected or timed out.
    Failed,
}

impl ClientState {
    /// Returns `true` while an attempt is outstanding.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        matches!(
            self,
            Self::AwaitingChallenge | Self::ProvingInProgress | Self::AwaitingResult
        )
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingChallenge => "awaiting-challenge",
            Self::ProvingInProgress => "proving",
            Self::AwaitingResult => "awaiting-result",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================
// Settings / Stats
// ============================================

/// Handshake timing for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Delay before the first attempt.
    pub start_delay: Duration,
    /// Per-attempt timeout.
    pub auth_timeout: Duration,
    /// Pause between a timeout and the next attempt. `None` disables retry.
    pub retry_interval: Option<Duration>,
    /// Delay between CHALLENGE and PROOF.
    pub proof_delay: Duration,
}

impl SessionSettings {
    /// Builds settings from the `[timing]` section.
    #[must_use]
    pub fn from_timing(timing: &TimingConfig) -> Self {
        Self {
            start_delay: timing.start_delay(),
            auth_timeout: timing.auth_timeout(),
            retry_interval: timing.retry_interval(),
            proof_delay: PROOF_DELAY,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_timing(&TimingConfig::default())
    }
}

/// Per-drone counters. A timeout counts as a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// AUTH_REQUESTs sent.
    pub requests: u64,
    /// AUTH_SUCCESS received.
    pub successes: u64,
    /// AUTH_FAILURE received or attempt timed out.
    pub failures: u64,
}

impl ClientStats {
    /// Successes over requests, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.successes as f64 / self.requests as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Start,
    AuthTimeout,
    SendProof,
    Retry,
}

// ============================================
// ClientSession
// ============================================

/// Drone-side handshake state machine.
pub struct ClientSession {
    identity: Identity,
    ground_station: SocketAddr,
    engine: ProofEngine,
    commitment: Commitment,
    settings: SessionSettings,
    state: ClientState,
    tokens: TokenAllocator,
    live: HashMap<TimerToken, TimerKind>,
    challenge: Option<Challenge>,
    stats: ClientStats,
    last_error: Option<DroneError>,
}

impl ClientSession {
    /// Derives the prover secret and commitment for `identity`.
    ///
    /// # Errors
    /// Propagates a `CoreError` if the commitment cannot be created.
    pub fn new(
        identity: Identity,
        password: &str,
        ground_station: SocketAddr,
        settings: SessionSettings,
    ) -> Result<Self> {
        let mut engine = ProofEngine::new();
        engine.initialize_prover(&identity, password);
        let commitment = engine.create_commitment()?;

        info!(
            identity = %identity,
            commitment = %commitment,
            "Drone initialized"
        );

        Ok(Self {
            identity,
            ground_station,
            engine,
            commitment,
            settings,
            state: ClientState::Idle,
            tokens: TokenAllocator::new(),
            live: HashMap::new(),
            challenge: None,
            stats: ClientStats::default(),
            last_error: None,
        })
    }

    /// Builds a session from a validated config.
    ///
    /// # Errors
    /// See [`new`](Self::new).
    pub fn from_config(config: &DroneConfig) -> Result<Self> {
        Self::new(
            Identity::new(config.drone.id.clone()),
            &config.drone.password,
            config.network.ground_station,
            SessionSettings::from_timing(&config.timing),
        )
    }

    // ========================================
    // Accessors
    // ========================================

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.state
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> ClientStats {
        self.stats
    }

    /// Identity this drone presents.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Commitment sent with every request.
    #[must_use]
    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    /// Challenge currently being answered.
    #[must_use]
    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Outcome of the last failed attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&DroneError> {
        self.last_error.as_ref()
    }

    /// Returns `true` once the ground station accepted a proof.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == ClientState::Authenticated
    }

    /// Number of timers this session still considers live.
    #[must_use]
    pub fn live_timer_count(&self) -> usize {
        self.live.len()
    }

    // ========================================
    // Timers
    // ========================================

    fn arm(&mut self, kind: TimerKind, after: Duration, actions: &mut Vec<Action>) {
        let token = self.tokens.allocate();
        self.live.insert(token, kind);
        actions.push(Action::schedule(token, after));
    }

    fn disarm(&mut self, kind: TimerKind, actions: &mut Vec<Action>) {
        let tokens: Vec<TimerToken> = self
            .live
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(token, _)| *token)
            .collect();
        for token in tokens {
            self.live.remove(&token);
            actions.push(Action::Cancel(token));
        }
    }

    fn disarm_all(&mut self, actions: &mut Vec<Action>) {
        actions.extend(self.live.drain().map(|(token, _)| Action::Cancel(token)));
    }

    // ========================================
    // Transitions
    // ========================================

    fn send_request(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.state != ClientState::Idle {
            debug!(identity = %self.identity, state = %self.state, "Request skipped, not idle");
            return actions;
        }

        self.stats.requests += 1;
        self.challenge = None;
        info!(
            identity = %self.identity,
            attempt = self.stats.requests,
            peer = %self.ground_station,
            "Sending authentication request"
        );

        let request = AuthRequest::new(self.identity.clone(), self.commitment.clone());
        actions.push(Action::send(
            self.ground_station,
            encode_message(&Message::AuthRequest(request)),
        ));

        self.disarm(TimerKind::AuthTimeout, &mut actions);
        self.arm(TimerKind::AuthTimeout, self.settings.auth_timeout, &mut actions);
        self.state = ClientState::AwaitingChallenge;
        actions
    }

    fn on_challenge(&mut self, challenge: Challenge) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.state != ClientState::AwaitingChallenge {
            debug!(identity = %self.identity, state = %self.state, "Unexpected challenge ignored");
            return actions;
        }

        debug!(identity = %self.identity, challenge = %challenge, "Challenge received");
        self.challenge = Some(challenge);
        self.arm(TimerKind::SendProof, self.settings.proof_delay, &mut actions);
        self.state = ClientState::ProvingInProgress;
        actions
    }

    fn send_proof(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(challenge) = self.challenge.clone() else {
            return actions;
        };
        if self.state != ClientState::ProvingInProgress {
            return actions;
        }

        match self.engine.generate_proof(&challenge) {
            Ok(proof) => {
                let stats = self.engine.last_stats();
                debug!(
                    identity = %self.identity,
                    proof_size = stats.proof_size,
                    generation_time = ?stats.generation_time,
                    "Proof generated"
                );
                actions.push(Action::send(
                    self.ground_station,
                    encode_message(&Message::Proof(proof)),
                ));
                self.state = ClientState::AwaitingResult;
            }
            Err(e) => {
                warn!(identity = %self.identity, error = %e, "Proof generation failed");
                self.stats.failures += 1;
                self.disarm(TimerKind::AuthTimeout, &mut actions);
                self.state = ClientState::Failed;
                self.last_error = Some(e.into());
            }
        }
        actions
    }

    fn on_success(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.stats.successes += 1;
        self.disarm_all(&mut actions);
        self.state = ClientState::Authenticated;
        self.last_error = None;
        info!(identity = %self.identity, attempt = self.stats.requests, "Authentication succeeded");
        actions
    }

    fn on_failure(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.stats.failures += 1;
        self.disarm(TimerKind::AuthTimeout, &mut actions);
        self.disarm(TimerKind::SendProof, &mut actions);
        self.state = ClientState::Failed;
        self.last_error = Some(DroneError::AuthRejected);
        warn!(identity = %self.identity, attempt = self.stats.requests, "Authentication rejected");
        actions
    }

    fn on_timeout(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.state.is_waiting() {
            return actions;
        }

        self.stats.failures += 1;
        self.disarm(TimerKind::SendProof, &mut actions);
        self.state = ClientState::Failed;
        let err = DroneError::Timeout {
            attempt: self.stats.requests,
            after: self.settings.auth_timeout,
        };
        warn!(identity = %self.identity, error = %err, "Authentication timed out");
        self.last_error = Some(err);

        if let Some(interval) = self.settings.retry_interval {
            debug!(identity = %self.identity, ?interval, "Retry scheduled");
            self.arm(TimerKind::Retry, interval, &mut actions);
        }
        actions
    }

    fn on_retry(&mut self) -> Vec<Action> {
        if self.state != ClientState::Failed {
            return Vec::new();
        }
        self.state = ClientState::Idle;
        self.send_request()
    }
}

impl ProtocolNode for ClientSession {
    fn start(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.arm(TimerKind::Start, self.settings.start_delay, &mut actions);
        actions
    }

    fn stop(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.disarm_all(&mut actions);

        let stats = self.stats;
        info!(
            identity = %self.identity,
            state = %self.state,
            requests = stats.requests,
            successes = stats.successes,
            failures = stats.failures,
            success_rate = %format!("{:.1}%", stats.success_rate()),
            "Drone stopped"
        );
        actions
    }

    fn on_message(&mut self, bytes: &[u8], from: SocketAddr) -> Vec<Action> {
        let message = match decode_message(bytes) {
            Ok(message) => message,
            Err(e) => {
                warn!(identity = %self.identity, peer = %from, error = %e, "Dropping malformed message");
                return Vec::new();
            }
        };

        match message {
            Message::Challenge(msg) => self.on_challenge(msg.challenge),
            Message::AuthSuccess if self.state.is_waiting() => self.on_success(),
            Message::AuthFailure if self.state.is_waiting() => self.on_failure(),
            other => {
                debug!(
                    identity = %self.identity,
                    peer = %from,
                    kind = ?other.message_type(),
                    state = %self.state,
                    "Message ignored"
                );
                Vec::new()
            }
        }
    }

    fn on_timer(&mut self, token: TimerToken) -> Vec<Action> {
        let Some(kind) = self.live.remove(&token) else {
            debug!(identity = %self.identity, %token, "Stale timer ignored");
            return Vec::new();
        };

        match kind {
            TimerKind::Start => self.send_request(),
            TimerKind::AuthTimeout => self.on_timeout(),
            TimerKind::SendProof => self.send_proof(),
            TimerKind::Retry => self.on_retry(),
        }
    }
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("identity", &self.identity)
            .field("ground_station", &self.ground_station)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("live_timers", &self.live.len())
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use droneauth_core::protocol::ChallengeMessage;

    fn station() -> SocketAddr {
        "10.0.0.1:5000".parse().unwrap()
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            start_delay: Duration::from_millis(100),
            auth_timeout: Duration::from_secs(5),
            retry_interval: Some(Duration::from_secs(3)),
            proof_delay: PROOF_DELAY,
        }
    }

    fn session(settings: SessionSettings) -> ClientSession {
        ClientSession::new(Identity::new("DRONE_001"), "secret_001", station(), settings).unwrap()
    }

    fn sent(actions: &[Action]) -> Vec<Message> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Send { dest, payload } => {
                    assert_eq!(*dest, station());
                    Some(decode_message(payload).unwrap())
                }
                _ => None,
            })
            .collect()
    }

    fn scheduled(actions: &[Action]) -> Vec<(TimerToken, Duration)> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Schedule { token, after } => Some((*token, *after)),
                _ => None,
            })
            .collect()
    }

    fn cancelled(actions: &[Action]) -> Vec<TimerToken> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Cancel(token) => Some(*token),
                _ => None,
            })
            .collect()
    }

    fn challenge_bytes(text: &str) -> Bytes {
        encode_message(&Message::Challenge(ChallengeMessage::new(Challenge::new(text))))
    }

    /// Drives the session to `AwaitingChallenge`; returns the timeout token.
    fn requested(s: &mut ClientSession) -> TimerToken {
        let start = scheduled(&s.start())[0].0;
        let actions = s.on_timer(start);
        scheduled(&actions)[0].0
    }

    /// Drives the session to `AwaitingResult`; returns the timeout token.
    fn proved(s: &mut ClientSession) -> TimerToken {
        let timeout = requested(s);
        let actions = s.on_message(&challenge_bytes("CHALLENGE_1_00ff00ff00ff00ff"), station());
        let proof_timer = scheduled(&actions)[0].0;
        s.on_timer(proof_timer);
        timeout
    }

    #[test]
    fn test_start_waits_for_start_delay() {
        let mut s = session(settings());
        let actions = s.start();

        assert!(sent(&actions).is_empty());
        assert_eq!(scheduled(&actions)[0].1, Duration::from_millis(100));
        assert_eq!(s.state(), ClientState::Idle);
        assert_eq!(s.stats().requests, 0);
    }

    #[test]
    fn test_request_carries_identity_and_commitment() {
        let mut s = session(settings());
        let start = scheduled(&s.start())[0].0;
        let actions = s.on_timer(start);

        let messages = sent(&actions);
        let Message::AuthRequest(request) = &messages[0] else {
            panic!("expected AUTH_REQUEST, got {messages:?}");
        };
        assert_eq!(request.identity.as_str(), "DRONE_001");
        assert_eq!(&request.commitment, s.commitment());
        assert_eq!(request.commitment.len(), 32);

        assert_eq!(scheduled(&actions)[0].1, Duration::from_secs(5));
        assert_eq!(s.state(), ClientState::AwaitingChallenge);
        assert_eq!(s.stats().requests, 1);
    }

    #[test]
    fn test_challenge_leads_to_verifiable_proof() {
        let mut s = session(settings());
        requested(&mut s);

        let actions = s.on_message(&challenge_bytes("CHALLENGE_42_0123456789abcdef"), station());
        assert_eq!(s.state(), ClientState::ProvingInProgress);
        let (proof_timer, delay) = scheduled(&actions)[0];
        assert_eq!(delay, PROOF_DELAY);

        let actions = s.on_timer(proof_timer);
        assert_eq!(s.state(), ClientState::AwaitingResult);
        let messages = sent(&actions);
        let Message::Proof(proof) = &messages[0] else {
            panic!("expected PROOF, got {messages:?}");
        };
        assert_eq!(proof.challenge.as_str(), "CHALLENGE_42_0123456789abcdef");
        assert_eq!(proof.proof_data.len(), 32);

        let mut verifier = ProofEngine::new();
        verifier.initialize_verifier(s.commitment().clone(), s.identity().clone());
        assert!(verifier.verify_proof(proof).unwrap());
    }

    #[test]
    fn test_success_is_terminal_and_cancels_timeout() {
        let mut s = session(settings());
        let timeout = proved(&mut s);

        let actions = s.on_message(&encode_message(&Message::AuthSuccess), station());
        assert_eq!(s.state(), ClientState::Authenticated);
        assert!(cancelled(&actions).contains(&timeout));
        assert_eq!(s.live_timer_count(), 0);
        assert_eq!(s.stats().successes, 1);

        // A late timeout and a second verdict change nothing.
        assert!(s.on_timer(timeout).is_empty());
        assert!(s.on_message(&encode_message(&Message::AuthFailure), station()).is_empty());
        assert_eq!(s.state(), ClientState::Authenticated);
        assert_eq!(s.stats().failures, 0);
    }

    #[test]
    fn test_failure_does_not_retry() {
        let mut s = session(settings());
        let timeout = proved(&mut s);

        let actions = s.on_message(&encode_message(&Message::AuthFailure), station());
        assert_eq!(s.state(), ClientState::Failed);
        assert_eq!(cancelled(&actions), vec![timeout]);
        assert!(scheduled(&actions).is_empty());
        assert!(matches!(s.last_error(), Some(DroneError::AuthRejected)));
        assert_eq!(s.stats().failures, 1);
    }

    #[test]
    fn test_failure_while_awaiting_challenge() {
        let mut s = session(settings());
        requested(&mut s);

        s.on_message(&encode_message(&Message::AuthFailure), station());
        assert_eq!(s.state(), ClientState::Failed);
        assert_eq!(s.live_timer_count(), 0);
    }

    #[test]
    fn test_timeout_retries_after_interval() {
        let mut s = session(settings());
        let timeout = requested(&mut s);

        let actions = s.on_timer(timeout);
        assert_eq!(s.state(), ClientState::Failed);
        assert_eq!(s.stats().failures, 1);
        assert!(matches!(s.last_error(), Some(DroneError::Timeout { attempt: 1, .. })));
        let (retry, after) = scheduled(&actions)[0];
        assert_eq!(after, Duration::from_secs(3));

        let actions = s.on_timer(retry);
        assert_eq!(s.state(), ClientState::AwaitingChallenge);
        assert!(matches!(sent(&actions)[0], Message::AuthRequest(_)));
        assert_eq!(s.stats().requests, 2);
        // Only the fresh timeout remains live.
        assert_eq!(s.live_timer_count(), 1);
    }

    #[test]
    fn test_timeout_during_proving_cancels_proof() {
        let mut s = session(settings());
        let timeout = requested(&mut s);
        let actions = s.on_message(&challenge_bytes("CHALLENGE_1_aa"), station());
        let proof_timer = scheduled(&actions)[0].0;

        let actions = s.on_timer(timeout);
        assert!(cancelled(&actions).contains(&proof_timer));
        assert!(s.on_timer(proof_timer).is_empty());
        assert_eq!(s.state(), ClientState::Failed);
    }

    #[test]
    fn test_retry_disabled() {
        let mut s = session(SessionSettings {
            retry_interval: None,
            ..settings()
        });
        let timeout = requested(&mut s);

        let actions = s.on_timer(timeout);
        assert!(scheduled(&actions).is_empty());
        assert_eq!(s.state(), ClientState::Failed);
    }

    #[test]
    fn test_challenge_ignored_outside_awaiting_challenge() {
        let mut s = session(settings());
        proved(&mut s);

        let actions = s.on_message(&challenge_bytes("CHALLENGE_2_bb"), station());
        assert!(actions.is_empty());
        assert_eq!(s.state(), ClientState::AwaitingResult);
        assert_eq!(s.challenge().unwrap().as_str(), "CHALLENGE_1_00ff00ff00ff00ff");
    }

    #[test]
    fn test_malformed_and_unexpected_messages_dropped() {
        let mut s = session(settings());
        requested(&mut s);

        assert!(s.on_message(&[], station()).is_empty());
        assert!(s.on_message(&[0x02, 0xff, 0, 0, 0], station()).is_empty());
        assert!(s.on_message(&[0x09], station()).is_empty());
        let request = AuthRequest::new(Identity::new("X"), Commitment::default());
        assert!(s
            .on_message(&encode_message(&Message::AuthRequest(request)), station())
            .is_empty());
        assert_eq!(s.state(), ClientState::AwaitingChallenge);
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut s = session(settings());
        let start = scheduled(&s.start())[0].0;

        let actions = s.stop();
        assert_eq!(cancelled(&actions), vec![start]);
        assert_eq!(s.live_timer_count(), 0);
        assert!(s.on_timer(start).is_empty());
    }

    #[test]
    fn test_success_rate() {
        let stats = ClientStats {
            requests: 4,
            successes: 1,
            failures: 3,
        };
        assert!((stats.success_rate() - 25.0).abs() < f64::EPSILON);
        assert!(ClientStats::default().success_rate().abs() < f64::EPSILON);
    }
}
