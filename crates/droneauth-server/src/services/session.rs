// ============================================
// File: crates/droneauth-server/src/services/session.rs
// ============================================
//! # Drone Sessions
//!
//! ## Creation Reason
//! Per-identity verifier state kept by the ground station between an
//! AUTH_REQUEST and the PROOF answering it.
//!
//! ## Session Lifecycle
//! ```text
//! first AUTH_REQUEST ──► Session::new (verifier bound to commitment)
//!        │
//!        ▼
//! every AUTH_REQUEST ──► pending = new challenge, reply_to = source
//!        │
//!        ▼
//! PROOF accepted     ──► pending = None
//! PROOF rejected     ──► pending kept
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Sessions live as long as the table; there is no eviction
//! - The verifier keeps the commitment from FIRST contact. A later
//!   request with a different commitment does not replace it.
//! - Lookup by challenge is a linear scan; the authorized set is small
//!
//! ## Last Modified
//! v0.1.0 - Initial session table

use std::collections::HashMap;
use std::net::SocketAddr;

use tracing::debug;

use droneauth_common::{Challenge, Commitment, Identity};
use droneauth_core::ProofEngine;

// ============================================
// Session
// ============================================

/// Verifier state for one drone.
#[derive(Debug)]
pub struct Session {
    identity: Identity,
    verifier: ProofEngine,
    pending: Option<Challenge>,
    reply_to: SocketAddr,
}

impl Session {
    /// Creates a session whose verifier is bound to `commitment`.
    #[must_use]
    pub fn new(identity: Identity, commitment: Commitment, reply_to: SocketAddr) -> Self {
        let mut verifier = ProofEngine::new();
        verifier.initialize_verifier(commitment, identity.clone());
        Self {
            identity,
            verifier,
            pending: None,
            reply_to,
        }
    }

    /// Drone this session belongs to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Issues a new challenge, replacing any pending one.
    pub fn issue_challenge(&mut self, reply_to: SocketAddr) -> Challenge {
        let challenge = self.verifier.generate_challenge();
        if let Some(old) = self.pending.replace(challenge.clone()) {
            debug!(identity = %self.identity, old = %old, "Pending challenge replaced");
        }
        self.reply_to = reply_to;
        challenge
    }

    /// Challenge awaiting a proof.
    #[must_use]
    pub fn pending(&self) -> Option<&Challenge> {
        self.pending.as_ref()
    }

    /// Drops the pending challenge after a successful proof.
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Address of the last AUTH_REQUEST.
    #[must_use]
    pub const fn reply_to(&self) -> SocketAddr {
        self.reply_to
    }

    /// Verifier for this drone.
    pub fn verifier_mut(&mut self) -> &mut ProofEngine {
        &mut self.verifier
    }

    /// Commitment registered on first contact.
    #[must_use]
    pub fn commitment(&self) -> Option<&Commitment> {
        self.verifier.commitment()
    }
}

// ============================================
// SessionTable
// ============================================

/// Owned map from identity to session.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<Identity, Session>,
}

impl SessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `identity`, creating it on first contact.
    /// The second value is `true` when the session was just created.
    pub fn get_or_create(
        &mut self,
        identity: &Identity,
        commitment: Commitment,
        reply_to: SocketAddr,
    ) -> (&mut Session, bool) {
        let created = !self.sessions.contains_key(identity);
        let session = self
            .sessions
            .entry(identity.clone())
            .or_insert_with(|| Session::new(identity.clone(), commitment, reply_to));
        (session, created)
    }

    /// Session whose pending challenge equals `challenge`.
    pub fn find_by_challenge(&mut self, challenge: &Challenge) -> Option<&mut Session> {
        self.sessions
            .values_mut()
            .find(|s| s.pending.as_ref() == Some(challenge))
    }

    /// Session for `identity`.
    #[must_use]
    pub fn get(&self, identity: &Identity) -> Option<&Session> {
        self.sessions.get(identity)
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no drone has made contact.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([10, 0, 0, 2], port))
    }

    #[test]
    fn test_first_contact_binds_commitment() {
        let mut table = SessionTable::new();
        let id = Identity::new("DRONE_001");

        let (_, created) = table.get_or_create(&id, Commitment::from([1u8; 32]), addr(1));
        assert!(created);
        let (session, created) = table.get_or_create(&id, Commitment::from([2u8; 32]), addr(2));
        assert!(!created);
        assert_eq!(session.commitment(), Some(&Commitment::from([1u8; 32])));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_new_challenge_replaces_pending() {
        let mut table = SessionTable::new();
        let id = Identity::new("DRONE_003");
        let (session, _) = table.get_or_create(&id, Commitment::from([3u8; 32]), addr(1));

        let first = session.issue_challenge(addr(1));
        let second = session.issue_challenge(addr(7));
        assert_ne!(first, second);
        assert_eq!(session.reply_to(), addr(7));

        assert!(table.find_by_challenge(&first).is_none());
        let found = table.find_by_challenge(&second).unwrap();
        assert_eq!(found.identity(), &id);
    }

    #[test]
    fn test_cleared_challenge_not_found() {
        let mut table = SessionTable::new();
        let id = Identity::new("DRONE_001");
        let (session, _) = table.get_or_create(&id, Commitment::from([1u8; 32]), addr(1));
        let challenge = session.issue_challenge(addr(1));
        session.clear_pending();

        assert!(table.find_by_challenge(&challenge).is_none());
        assert!(table.get(&id).unwrap().pending().is_none());
    }
}
