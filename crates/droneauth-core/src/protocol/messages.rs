// ============================================
// File: crates/droneauth-core/src/protocol/messages.rs
// ============================================
//! # Protocol Message Definitions
//!
//! ## Creation Reason
//! Defines the five messages exchanged between a drone and the ground
//! station during authentication.
//!
//! ## Main Functionality
//! - `MessageType`: One-byte tag at the start of every datagram
//! - `AuthRequest`: Drone identity and commitment
//! - `ChallengeMessage`: Server-issued challenge
//! - `Message`: Decoded datagram of any kind
//!
//! ## Wire Format (Little Endian)
//! | Tag | Name | Payload |
//! |-----|------|---------|
//! | 0x01 | AUTH_REQUEST | idLen:u32, id, commitLen:u32, commitment |
//! | 0x02 | CHALLENGE | challengeLen:u32, challenge |
//! | 0x03 | PROOF | serialized [`Proof`] |
//! | 0x04 | AUTH_SUCCESS | none |
//! | 0x05 | AUTH_FAILURE | none |
//!
//! ## ⚠️ Important Note for Next Developer
//! - Tag values are fixed; deployed drones depend on them
//! - Text fields are UTF-8 and rejected otherwise
//!
//! ## Last Modified
//! v0.1.0 - Initial message definitions

use serde::{Deserialize, Serialize};

use droneauth_common::types::{Challenge, Commitment, Identity};

use crate::crypto::Proof;

// ============================================
// MessageType
// ============================================

/// Protocol message type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    /// Drone asks to authenticate.
    AuthRequest = 0x01,
    /// Ground station answers with a challenge.
    Challenge = 0x02,
    /// Drone answers the challenge.
    Proof = 0x03,
    /// Ground station accepted the proof.
    AuthSuccess = 0x04,
    /// Ground station rejected the request or proof.
    AuthFailure = 0x05,
}

impl MessageType {
    /// Converts a byte to a `MessageType`.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::AuthRequest),
            0x02 => Some(Self::Challenge),
            0x03 => Some(Self::Proof),
            0x04 => Some(Self::AuthSuccess),
            0x05 => Some(Self::AuthFailure),
            _ => None,
        }
    }

    /// Converts the `MessageType` to its byte representation.
    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Messages a drone sends and the ground station acts on.
    #[must_use]
    pub const fn is_server_bound(&self) -> bool {
        matches!(self, Self::AuthRequest | Self::Proof)
    }

    /// Messages the ground station sends and a drone acts on.
    #[must_use]
    pub const fn is_drone_bound(&self) -> bool {
        !self.is_server_bound()
    }

    /// Tag-only outcome messages.
    #[must_use]
    pub const fn is_indication(&self) -> bool {
        matches!(self, Self::AuthSuccess | Self::AuthFailure)
    }
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_byte(value).ok_or(value)
    }
}

impl From<MessageType> for u8 {
    fn from(msg_type: MessageType) -> Self {
        msg_type.as_byte()
    }
}

// ============================================
// AuthRequest
// ============================================

/// First message of a handshake.
///
/// ```text
/// ┌──────┬───────────┬──────────┬───────────────┬────────────┐
/// │ 0x01 │ idLen u32 │ identity │ commitLen u32 │ commitment │
/// └──────┴───────────┴──────────┴───────────────┴────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    /// Who is asking.
    pub identity: Identity,
    /// The drone's public commitment.
    pub commitment: Commitment,
}

impl AuthRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(identity: Identity, commitment: Commitment) -> Self {
        Self {
            identity,
            commitment,
        }
    }
}

// ============================================
// ChallengeMessage
// ============================================

/// Ground station reply to a valid request from an authorized drone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeMessage {
    /// The challenge the proof must echo.
    pub challenge: Challenge,
}

impl ChallengeMessage {
    /// Creates a new challenge message.
    #[must_use]
    pub fn new(challenge: Challenge) -> Self {
        Self { challenge }
    }
}

// ============================================
// Message
// ============================================

/// Any decoded datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// 0x01
    AuthRequest(AuthRequest),
    /// 0x02
    Challenge(ChallengeMessage),
    /// 0x03
    Proof(Proof),
    /// 0x04
    AuthSuccess,
    /// 0x05
    AuthFailure,
}

impl Message {
    /// Returns the tag this message is framed with.
    #[must_use]
    pub const fn message_type(&self) -> MessageType {
        match self {
            Self::AuthRequest(_) => MessageType::AuthRequest,
            Self::Challenge(_) => MessageType::Challenge,
            Self::Proof(_) => MessageType::Proof,
            Self::AuthSuccess => MessageType::AuthSuccess,
            Self::AuthFailure => MessageType::AuthFailure,
        }
    }
}

impl From<AuthRequest> for Message {
    fn from(msg: AuthRequest) -> Self {
        Self::AuthRequest(msg)
    }
}

impl From<ChallengeMessage> for Message {
    fn from(msg: ChallengeMessage) -> Self {
        Self::Challenge(msg)
    }
}

impl From<Proof> for Message {
    fn from(proof: Proof) -> Self {
        Self::Proof(proof)
    }
}

// ============================================
// Tests
// ============================================
