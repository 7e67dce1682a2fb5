// ============================================
// File: crates/droneauth-server/src/services/registry.rs
// ============================================
//! # Server Registry
//!
//! ## Creation Reason
//! The ground station as a [`ProtocolNode`]: checks identities against
//! the authorized set, issues challenges, and verifies proofs.
//!
//! ## Main Logical Flow
//! ```text
//! AUTH_REQUEST(id, C) from A
//!   ├─ id not authorized ──► failures++, AUTH_FAILURE → A
//!   └─ session(id) (verifier bound to C on first contact)
//!        pending = new challenge, reply_to = A
//!        CHALLENGE → A
//!
//! PROOF(P, C, ch, ts) from A
//!   ├─ no session pending ch ──► unknown_challenges++, AUTH_FAILURE → A
//!   ├─ verifier rejects      ──► failures++, AUTH_FAILURE → A (pending kept)
//!   └─ verifier accepts      ──► successes++, AUTH_SUCCESS → A (pending cleared)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Replies always go to the datagram's source address
//! - A malformed AUTH_REQUEST still counts as a request. If its identity
//!   is readable and not authorized it is a failure, otherwise it is
//!   tallied as malformed
//! - Drone-bound messages and unknown tags are logged and dropped,
//!   without a reply
//! - Runs inside one `NodeRunner`; no locking needed
//!
//! ## Last Modified
//! v0.1.0 - Initial registry

use std::collections::BTreeSet;
use std::net::SocketAddr;

use tracing::{debug, info, warn};

use droneauth_common::{Challenge, Commitment, Identity};
use droneauth_core::node::{Action, ProtocolNode};
use droneauth_core::protocol::{
    decode_message, encode_message, ChallengeMessage, Message, MessageType, ProtocolCodec,
};
use droneauth_core::{Proof, Verdict};

use crate::config::GroundStationConfig;
use crate::error::{Result, ServerError};
use crate::services::session::SessionTable;
use crate::services::stats::ServerStats;

/// Ground station handshake state.
#[derive(Debug)]
pub struct ServerRegistry {
    authorized: BTreeSet<Identity>,
    sessions: SessionTable,
    stats: ServerStats,
}

impl ServerRegistry {
    /// Creates a registry accepting exactly `authorized`.
    pub fn new(authorized: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            authorized: authorized.into_iter().collect(),
            sessions: SessionTable::new(),
            stats: ServerStats::default(),
        }
    }

    /// Creates a registry from config.
    #[must_use]
    pub fn from_config(config: &GroundStationConfig) -> Self {
        Self::new(config.authorized())
    }

    // ========================================
    // Handshake
    // ========================================

    /// Handles a decoded AUTH_REQUEST from `from`.
    ///
    /// # Errors
    /// `Unauthorized` if `identity` is not in the authorized set.
    pub fn on_auth_request(
        &mut self,
        identity: Identity,
        commitment: Commitment,
        from: SocketAddr,
    ) -> Result<Challenge> {
        self.stats.requests += 1;

        if !self.authorized.contains(&identity) {
            self.stats.failures += 1;
            return Err(ServerError::Unauthorized { identity });
        }

        debug!(identity = %identity, commitment = %commitment, peer = %from, "Auth request");
        let (session, created) = self.sessions.get_or_create(&identity, commitment, from);
        if created {
            info!(identity = %identity, commitment = ?session.commitment(), "Registered new drone");
        }

        let challenge = session.issue_challenge(from);
        self.stats.challenges_issued += 1;
        debug!(identity = %identity, challenge = %challenge, "Challenge issued");
        Ok(challenge)
    }

    /// Handles a decoded PROOF. Returns the authenticated identity.
    ///
    /// # Errors
    /// - `UnknownChallenge` if no session has `proof.challenge` pending
    /// - `VerificationFailed` if the verifier rejects the proof
    pub fn on_proof(&mut self, proof: &Proof) -> Result<Identity> {
        let Some(session) = self.sessions.find_by_challenge(&proof.challenge) else {
            self.stats.unknown_challenges += 1;
            return Err(ServerError::UnknownChallenge {
                challenge: proof.challenge.clone(),
            });
        };
        let identity = session.identity().clone();

        let verdict = match session.verifier_mut().inspect_proof(proof) {
            Ok(verdict) => verdict,
            Err(e) => {
                self.stats.failures += 1;
                return Err(e.into());
            }
        };
        debug!(
            identity = %identity,
            verification_time = ?session.verifier_mut().last_stats().verification_time,
            "Proof checked"
        );

        match verdict {
            Verdict::Accepted => {
                session.clear_pending();
                self.stats.successes += 1;
                Ok(identity)
            }
            Verdict::Rejected(reason) => {
                self.stats.failures += 1;
                Err(ServerError::VerificationFailed { identity, reason })
            }
        }
    }

    // ========================================
    // Accessors
    // ========================================

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> ServerStats {
        self.stats
    }

    /// Sessions created so far.
    #[must_use]
    pub const fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    /// Returns `true` if `identity` may authenticate.
    #[must_use]
    pub fn is_authorized(&self, identity: &Identity) -> bool {
        self.authorized.contains(identity)
    }

    /// Number of authorized identities.
    #[must_use]
    pub fn authorized_count(&self) -> usize {
        self.authorized.len()
    }

    // ========================================
    // Replies
    // ========================================

    fn reply(to: SocketAddr, message: &Message) -> Vec<Action> {
        vec![Action::send(to, encode_message(message))]
    }

    fn reject(error: &ServerError, from: SocketAddr) -> Vec<Action> {
        if error.is_suspicious() {
            warn!(peer = %from, error = %error, "Authentication rejected");
        } else {
            info!(peer = %from, error = %error, "Authentication failed");
        }
        Self::reply(from, &Message::AuthFailure)
    }

    fn on_malformed(&mut self, bytes: &[u8], from: SocketAddr, reason: &str) -> Vec<Action> {
        match ProtocolCodec::peek_message_type(bytes) {
            Ok(MessageType::AuthRequest) => {
                self.stats.requests += 1;
                // The allow-list is checked before the commitment is trusted.
                if let Ok(identity) = ProtocolCodec::peek_request_identity(bytes) {
                    if !self.is_authorized(&identity) {
                        self.stats.failures += 1;
                        return Self::reject(&ServerError::Unauthorized { identity }, from);
                    }
                }
                self.stats.malformed += 1;
            }
            Ok(MessageType::Proof) => self.stats.malformed += 1,
            _ => {
                debug!(peer = %from, len = bytes.len(), reason, "Dropping unrecognized datagram");
                return Vec::new();
            }
        }
        warn!(peer = %from, reason, "Malformed message");
        Self::reply(from, &Message::AuthFailure)
    }
}

impl ProtocolNode for ServerRegistry {
    fn start(&mut self) -> Vec<Action> {
        info!(authorized = self.authorized.len(), "Ground station ready");
        Vec::new()
    }

    fn stop(&mut self) -> Vec<Action> {
        let s = self.stats;
        info!(
            requests = s.requests,
            challenges_issued = s.challenges_issued,
            successes = s.successes,
            failures = s.failures,
            malformed = s.malformed,
            unknown_challenges = s.unknown_challenges,
            sessions = self.sessions.len(),
            success_rate = %format!("{:.1}%", s.success_rate()),
            "Ground station stopped"
        );
        Vec::new()
    }

    fn on_message(&mut self, bytes: &[u8], from: SocketAddr) -> Vec<Action> {
        let message = match decode_message(bytes) {
            Ok(message) => message,
            Err(e) => return self.on_malformed(bytes, from, &e.to_string()),
        };

        match message {
            Message::AuthRequest(request) => {
                match self.on_auth_request(request.identity, request.commitment, from) {
                    Ok(challenge) => {
                        Self::reply(from, &Message::Challenge(ChallengeMessage::new(challenge)))
                    }
                    Err(e) => Self::reject(&e, from),
                }
            }
            Message::Proof(proof) => match self.on_proof(&proof) {
                Ok(identity) => {
                    info!(identity = %identity, peer = %from, "Drone authenticated");
                    Self::reply(from, &Message::AuthSuccess)
                }
                Err(e) => Self::reject(&e, from),
            },
            other => {
                debug!(peer = %from, kind = ?other.message_type(), "Ignoring drone-bound message");
                Vec::new()
            }
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bytes::Bytes;
    use droneauth_common::Timestamp;
    use droneauth_core::protocol::AuthRequest;
    use droneauth_core::{ProofEngine, Rejection};

    struct Prover {
        identity: Identity,
        engine: ProofEngine,
        commitment: Commitment,
    }

    impl Prover {
        fn new(id: &str) -> Self {
            let identity = Identity::new(id);
            let mut engine = ProofEngine::new();
            engine.initialize_prover(&identity, "password");
            let commitment = engine.create_commitment().unwrap();
            Self {
                identity,
                engine,
                commitment,
            }
        }

        fn request(&self) -> Bytes {
            encode_message(&Message::AuthRequest(AuthRequest::new(
                self.identity.clone(),
                self.commitment.clone(),
            )))
        }

        fn proof(&mut self, challenge: &Challenge) -> Proof {
            self.engine.generate_proof(challenge).unwrap()
        }
    }

    fn drone_addr() -> SocketAddr {
        "10.0.0.2:40000".parse().unwrap()
    }

    fn registry() -> ServerRegistry {
        ServerRegistry::from_config(&GroundStationConfig::default())
    }

    fn only_reply(actions: &[Action]) -> (SocketAddr, Message) {
        assert_eq!(actions.len(), 1, "expected one reply, got {actions:?}");
        match &actions[0] {
            Action::Send { dest, payload } => (*dest, decode_message(payload).unwrap()),
            other => panic!("expected Send, got {other:?}"),
        }
    }

    fn challenge_of(actions: &[Action]) -> Challenge {
        match only_reply(actions).1 {
            Message::Challenge(msg) => msg.challenge,
            other => panic!("expected CHALLENGE, got {other:?}"),
        }
    }

    #[test]
    fn test_full_handshake() {
        let mut reg = registry();
        let mut drone = Prover::new("DRONE_001");

        let challenge = challenge_of(&reg.on_message(&drone.request(), drone_addr()));
        assert!(challenge.as_str().starts_with("CHALLENGE_"));

        let proof = drone.proof(&challenge);
        let actions = reg.on_message(&encode_message(&Message::Proof(proof)), drone_addr());
        assert_eq!(only_reply(&actions), (drone_addr(), Message::AuthSuccess));

        let stats = reg.stats();
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.challenges_issued, 1);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 0);
        assert!(reg
            .sessions()
            .get(&Identity::new("DRONE_001"))
            .unwrap()
            .pending()
            .is_none());
    }

    #[test]
    fn test_unauthorized_gets_no_challenge() {
        let mut reg = registry();
        let drone = Prover::new("DRONE_999");

        let actions = reg.on_message(&drone.request(), drone_addr());
        assert_eq!(only_reply(&actions).1, Message::AuthFailure);
        assert_eq!(reg.stats().failures, 1);
        assert_eq!(reg.stats().challenges_issued, 0);
        assert!(reg.sessions().is_empty());
    }

    #[test]
    fn test_stale_proof_keeps_challenge() {
        let mut reg = registry();
        let mut drone = Prover::new("DRONE_002");
        let challenge = reg
            .on_auth_request(drone.identity.clone(), drone.commitment.clone(), drone_addr())
            .unwrap();

        let mut proof = drone.proof(&challenge);
        proof.timestamp = Timestamp::now().saturating_sub(Duration::from_secs(10));
        let err = reg.on_proof(&proof).unwrap_err();
        assert!(matches!(
            err,
            ServerError::VerificationFailed {
                reason: Rejection::Stale { .. },
                ..
            }
        ));
        assert_eq!(reg.stats().failures, 1);

        // Still pending: a fresh proof for the same challenge succeeds.
        let session = reg.sessions().get(&drone.identity).unwrap();
        assert_eq!(session.pending(), Some(&challenge));
        let proof = drone.proof(&challenge);
        assert_eq!(reg.on_proof(&proof).unwrap(), drone.identity);
    }

    #[test]
    fn test_second_request_invalidates_first_challenge() {
        let mut reg = registry();
        let mut drone = Prover::new("DRONE_003");

        let first = challenge_of(&reg.on_message(&drone.request(), drone_addr()));
        let second = challenge_of(&reg.on_message(&drone.request(), drone_addr()));
        assert_ne!(first, second);

        let err = reg.on_proof(&drone.proof(&first)).unwrap_err();
        assert!(matches!(err, ServerError::UnknownChallenge { .. }));
        assert_eq!(reg.stats().unknown_challenges, 1);
        assert_eq!(reg.stats().failures, 0);

        assert!(reg.on_proof(&drone.proof(&second)).is_ok());
    }

    #[test]
    fn test_commitment_from_first_contact_is_kept() {
        let mut reg = registry();
        let mut original = Prover::new("DRONE_004");
        let mut impostor = Prover::new("DRONE_004");

        challenge_of(&reg.on_message(&original.request(), drone_addr()));
        let challenge = challenge_of(&reg.on_message(&impostor.request(), drone_addr()));

        let err = reg.on_proof(&impostor.proof(&challenge)).unwrap_err();
        assert!(err.is_suspicious());
        assert!(matches!(
            err,
            ServerError::VerificationFailed {
                reason: Rejection::CommitmentMismatch,
                ..
            }
        ));
        assert!(reg.on_proof(&original.proof(&challenge)).is_ok());
    }

    #[test]
    fn test_reply_goes_to_source_address() {
        let mut reg = registry();
        let mut drone = Prover::new("DRONE_001");
        let challenge = challenge_of(&reg.on_message(&drone.request(), drone_addr()));

        let moved: SocketAddr = "10.0.0.9:41000".parse().unwrap();
        let proof = encode_message(&Message::Proof(drone.proof(&challenge)));
        let (dest, _) = only_reply(&reg.on_message(&proof, moved));
        assert_eq!(dest, moved);
    }

    #[test]
    fn test_malformed_messages() {
        let mut reg = registry();

        // Truncated AUTH_REQUEST: a request, tallied as malformed.
        let actions = reg.on_message(&[0x01, 0x09, 0, 0, 0, b'D'], drone_addr());
        assert_eq!(only_reply(&actions).1, Message::AuthFailure);
        // Truncated PROOF.
        let actions = reg.on_message(&[0x03, 0x20, 0, 0, 0], drone_addr());
        assert_eq!(only_reply(&actions).1, Message::AuthFailure);

        let stats = reg.stats();
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.malformed, 2);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn test_damaged_request_from_unauthorized_is_a_failure() {
        let mut reg = registry();
        let mut buf = vec![0x01];
        buf.extend_from_slice(&9u32.to_le_bytes());
        buf.extend_from_slice(b"DRONE_999");
        buf.extend_from_slice(&32u32.to_le_bytes());
        buf.extend_from_slice(&[0xAA; 4]);

        let actions = reg.on_message(&buf, drone_addr());
        assert_eq!(only_reply(&actions).1, Message::AuthFailure);

        // Same damage from an authorized identity is only malformed.
        buf[5..14].copy_from_slice(b"DRONE_001");
        let actions = reg.on_message(&buf, drone_addr());
        assert_eq!(only_reply(&actions).1, Message::AuthFailure);

        let stats = reg.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.challenges_issued, 0);
        assert!(reg.sessions().is_empty());
    }

    #[test]
    fn test_unknown_and_drone_bound_dropped() {
        let mut reg = registry();
        assert!(reg.on_message(&[], drone_addr()).is_empty());
        assert!(reg.on_message(&[0x7f, 1, 2], drone_addr()).is_empty());
        assert!(reg
            .on_message(&encode_message(&Message::AuthSuccess), drone_addr())
            .is_empty());
        assert_eq!(reg.stats(), ServerStats::default());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut reg = registry();
        let mut a = Prover::new("DRONE_001");
        let mut b = Prover::new("DRONE_002");

        let ch_a = challenge_of(&reg.on_message(&a.request(), drone_addr()));
        let ch_b = challenge_of(&reg.on_message(&b.request(), drone_addr()));

        // B's proof with A's challenge carries B's commitment: rejected for A.
        assert!(reg.on_proof(&b.proof(&ch_a)).is_err());
        assert_eq!(reg.on_proof(&b.proof(&ch_b)).unwrap(), b.identity);
        assert_eq!(reg.on_proof(&a.proof(&ch_a)).unwrap(), a.identity);
        assert_eq!(reg.sessions().len(), 2);
    }
}
