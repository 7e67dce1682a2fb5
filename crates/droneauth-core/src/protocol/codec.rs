// ============================================
// File: crates/droneauth-core/src/protocol/codec.rs
// ============================================
//! # Protocol Codec
//!
//! ## Creation Reason
//! Binary serialization and deserialization for the authentication
//! messages and the standalone proof encoding.
//!
//! ## Main Functionality
//! - `Codec` trait: Generic encode/decode interface
//! - `ProtocolCodec`: Implementation for `Message` and `Proof`
//! - Convenience functions for datagram-level encode/decode
//!
//! ## Parsing Strategy
//! 1. Read the tag byte
//! 2. Dispatch to the payload parser
//! 3. For every `u32` length, check it against the bytes remaining
//!    BEFORE slicing
//! 4. Trailing bytes after the last field are ignored
//!
//! ## ⚠️ Important Note for Next Developer
//! - All integers are little-endian
//! - A length field larger than the remaining buffer is `MalformedMessage`,
//!   never a panic
//!
//! ## Last Modified
//! v0.1.0 - Initial codec implementation

use bytes::{Buf, BufMut, Bytes, BytesMut};

use droneauth_common::time::Timestamp;
use droneauth_common::types::{Challenge, Commitment, Identity};

use crate::crypto::Proof;
use crate::error::{CoreError, Result};
use crate::protocol::messages::{AuthRequest, ChallengeMessage, Message, MessageType};

/// Size of a length prefix.
const LEN_PREFIX: usize = 4;

/// Size of the trailing proof timestamp.
const TIMESTAMP_SIZE: usize = 8;

// ============================================
// Codec Trait
// ============================================

/// Trait for encoding and decoding protocol values.
///
/// # Type Parameters
/// * `T` - The value type to encode/decode
pub trait Codec<T> {
    /// Encodes a value into a byte buffer.
    fn encode(&self, msg: &T, buf: &mut BytesMut);

    /// Decodes a value from bytes, advancing `buf` past it.
    ///
    /// # Errors
    /// Returns a protocol error if the bytes are truncated or malformed.
    fn decode(&self, buf: &mut Bytes) -> Result<T>;
}

// ============================================
// ProtocolCodec
// ============================================

/// Codec implementation for all protocol messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtocolCodec;

impl ProtocolCodec {
    /// Creates a new protocol codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Identifies the message type from a buffer without consuming it.
    ///
    /// # Errors
    /// `MessageTooShort` on an empty buffer, `UnknownMessageType` on an
    /// unrecognised tag.
    pub fn peek_message_type(buf: &[u8]) -> Result<MessageType> {
        let Some(&tag) = buf.first() else {
            return Err(CoreError::too_short(1, 0));
        };
        MessageType::from_byte(tag).ok_or(CoreError::UnknownMessageType(tag))
    }

    /// Reads the identity of an AUTH_REQUEST without parsing the rest.
    ///
    /// Lets the ground station check authorization on a request whose
    /// commitment is damaged.
    ///
    /// # Errors
    /// Any protocol error if the buffer is not an AUTH_REQUEST or its
    /// identity field is truncated or not UTF-8.
    pub fn peek_request_identity(buf: &[u8]) -> Result<Identity> {
        let msg_type = Self::peek_message_type(buf)?;
        if msg_type != MessageType::AuthRequest {
            return Err(CoreError::malformed(format!(
                "expected AUTH_REQUEST, got {msg_type:?}"
            )));
        }
        let mut bytes = Bytes::copy_from_slice(&buf[1..]);
        get_text(&mut bytes, "identity").map(Identity::from)
    }
}

// ============================================
// Field Helpers
// ============================================

#[allow(clippy::cast_possible_truncation)]
fn put_field(buf: &mut BytesMut, field: &[u8]) {
    // Datagram-sized fields never approach u32::MAX.
    buf.put_u32_le(field.len() as u32);
    buf.put_slice(field);
}

fn get_field(buf: &mut Bytes, name: &str) -> Result<Bytes> {
    if buf.remaining() < LEN_PREFIX {
        return Err(CoreError::malformed(format!(
            "{name}: length prefix truncated ({} bytes left)",
            buf.remaining()
        )));
    }
    let len = buf.get_u32_le() as usize;
    if len > buf.remaining() {
        return Err(CoreError::malformed(format!(
            "{name}: length {len} exceeds remaining {}",
            buf.remaining()
        )));
    }
    Ok(buf.split_to(len))
}

fn get_text(buf: &mut Bytes, name: &str) -> Result<String> {
    let raw = get_field(buf, name)?;
    String::from_utf8(raw.to_vec())
        .map_err(|_| CoreError::malformed(format!("{name}: not valid UTF-8")))
}

fn encoded_proof_len(proof: &Proof) -> usize {
    3 * LEN_PREFIX
        + proof.proof_data.len()
        + proof.commitment.len()
        + proof.challenge.as_bytes().len()
        + TIMESTAMP_SIZE
}

// ============================================
// Proof Codec
// ============================================

impl Codec<Proof> for ProtocolCodec {
    fn encode(&self, proof: &Proof, buf: &mut BytesMut) {
        buf.reserve(encoded_proof_len(proof));
        put_field(buf, &proof.proof_data);
        put_field(buf, proof.commitment.as_bytes());
        put_field(buf, proof.challenge.as_bytes());
        buf.put_i64_le(proof.timestamp.as_nanos());
    }

    fn decode(&self, buf: &mut Bytes) -> Result<Proof> {
        let proof_data = get_field(buf, "proof_data")?.to_vec();
        let commitment = Commitment::from(get_field(buf, "commitment")?.to_vec());
        let challenge = Challenge::from(get_text(buf, "challenge")?);
        if buf.remaining() < TIMESTAMP_SIZE {
            return Err(CoreError::too_short(TIMESTAMP_SIZE, buf.remaining()));
        }
        let timestamp = Timestamp::from_nanos(buf.get_i64_le());

        Ok(Proof {
            proof_data,
            commitment,
            challenge,
            timestamp,
        })
    }
}

// ============================================
// Message Codec
// ============================================

impl Codec<Message> for ProtocolCodec {
    fn encode(&self, msg: &Message, buf: &mut BytesMut) {
        buf.put_u8(msg.message_type().as_byte());
        match msg {
            Message::AuthRequest(req) => {
                put_field(buf, req.identity.as_bytes());
                put_field(buf, req.commitment.as_bytes());
            }
            Message::Challenge(chal) => put_field(buf, chal.challenge.as_bytes()),
            Message::Proof(proof) => self.encode(proof, buf),
            Message::AuthSuccess | Message::AuthFailure => {}
        }
    }

    fn decode(&self, buf: &mut Bytes) -> Result<Message> {
        let msg_type = Self::peek_message_type(buf)?;
        buf.advance(1);

        let msg = match msg_type {
            MessageType::AuthRequest => {
                let identity = Identity::from(get_text(buf, "identity")?);
                let commitment = Commitment::from(get_field(buf, "commitment")?.to_vec());
                Message::AuthRequest(AuthRequest::new(identity, commitment))
            }
            MessageType::Challenge => {
                let challenge = Challenge::from(get_text(buf, "challenge")?);
                Message::Challenge(ChallengeMessage::new(challenge))
            }
            MessageType::Proof => Message::Proof(self.decode(buf)?),
            MessageType::AuthSuccess => Message::AuthSuccess,
            MessageType::AuthFailure => Message::AuthFailure,
        };
        Ok(msg)
    }
}

// ============================================
// Convenience Functions
// ============================================

/// Encodes a message into a datagram.
#[must_use]
pub fn encode_message(msg: &Message) -> Bytes {
    let mut buf = BytesMut::new();
    ProtocolCodec.encode(msg, &mut buf);
    buf.freeze()
}

/// Decodes a datagram into a message.
///
/// # Errors
/// Any protocol error; see [`CoreError::is_protocol_error`].
pub fn decode_message(buf: &[u8]) -> Result<Message> {
    let mut bytes = Bytes::copy_from_slice(buf);
    ProtocolCodec.decode(&mut bytes)
}

/// Serializes a proof without a tag byte.
#[must_use]
pub fn encode_proof(proof: &Proof) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_proof_len(proof));
    ProtocolCodec.encode(proof, &mut buf);
    buf.freeze()
}

/// Deserializes a proof produced by [`encode_proof`].
///
/// # Errors
/// `MalformedMessage` or `MessageTooShort` if the bytes are not a proof.
pub fn decode_proof(buf: &[u8]) -> Result<Proof> {
    let mut bytes = Bytes::copy_from_slice(buf);
    ProtocolCodec.decode(&mut bytes)
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_proof() -> Proof {
        Proof {
            proof_data: vec![0x11; 32],
            commitment: Commitment::from(vec![0x22; 32]),
            challenge: Challenge::from("CHALLENGE_1700000000000000000_0123456789abcdef"),
            timestamp: Timestamp::from_nanos(1_700_000_000_000_000_000),
        }
    }

    #[test]
    fn test_auth_request_layout() {
        let msg = Message::AuthRequest(AuthRequest::new(
            Identity::from("DRONE_001"),
            Commitment::from(vec![0xAA, 0xBB]),
        ));
        let encoded = encode_message(&msg);

        assert_eq!(encoded[0], 0x01);
        assert_eq!(&encoded[1..5], &9u32.to_le_bytes());
        assert_eq!(&encoded[5..14], b"DRONE_001");
        assert_eq!(&encoded[14..18], &2u32.to_le_bytes());
        assert_eq!(&encoded[18..], &[0xAA, 0xBB]);

        assert_eq!(decode_message(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_indications_are_single_byte() {
        assert_eq!(encode_message(&Message::AuthSuccess).as_ref(), &[0x04]);
        assert_eq!(encode_message(&Message::AuthFailure).as_ref(), &[0x05]);
        assert_eq!(decode_message(&[0x04]).unwrap(), Message::AuthSuccess);
    }

    #[test]
    fn test_proof_roundtrip_with_odd_lengths() {
        let mut proof = sample_proof();
        proof.proof_data = vec![];
        proof.commitment = Commitment::from(vec![0x01; 7]);
        proof.challenge = Challenge::from("");
        proof.timestamp = Timestamp::from_nanos(-1);

        let decoded = decode_proof(&encode_proof(&proof)).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_proof_message_is_tag_plus_proof() {
        let proof = sample_proof();
        let framed = encode_message(&Message::Proof(proof.clone()));
        assert_eq!(framed[0], 0x03);
        assert_eq!(&framed[1..], encode_proof(&proof).as_ref());
    }

    #[test]
    fn test_timestamp_is_little_endian_trailer() {
        let mut proof = sample_proof();
        proof.timestamp = Timestamp::from_nanos(0x0102_0304_0506_0708);
        let encoded = encode_proof(&proof);
        let tail = &encoded[encoded.len() - 8..];
        assert_eq!(tail, &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_every_truncation_is_rejected() {
        let encoded = encode_proof(&sample_proof());
        for cut in 0..encoded.len() {
            let result = decode_proof(&encoded[..cut]);
            assert!(
                result.as_ref().is_err_and(CoreError::is_protocol_error),
                "truncation at {cut} accepted"
            );
        }
    }

    #[test]
    fn test_overrunning_length_field() {
        let mut buf = vec![0x01];
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(b"DRONE");
        assert!(matches!(
            decode_message(&buf),
            Err(CoreError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_identity() {
        let mut buf = vec![0x01];
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0xFF, 0xFE]);
        buf.extend_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            decode_message(&buf),
            Err(CoreError::MalformedMessage { .. })
        ));
    }

    #[test]
    fn test_peek_identity_of_damaged_request() {
        let mut buf = vec![0x01];
        buf.extend_from_slice(&9u32.to_le_bytes());
        buf.extend_from_slice(b"DRONE_999");
        buf.extend_from_slice(&32u32.to_le_bytes());
        buf.extend_from_slice(&[0xAA; 4]);

        assert!(decode_message(&buf).is_err());
        assert_eq!(
            ProtocolCodec::peek_request_identity(&buf).unwrap(),
            Identity::from("DRONE_999")
        );
        assert!(ProtocolCodec::peek_request_identity(&buf[..8]).is_err());
        assert!(ProtocolCodec::peek_request_identity(&[0x03, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_unknown_and_empty() {
        assert!(matches!(
            decode_message(&[0x09]),
            Err(CoreError::UnknownMessageType(0x09))
        ));
        assert!(matches!(
            decode_message(&[]),
            Err(CoreError::MessageTooShort { .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut encoded = encode_message(&Message::Challenge(ChallengeMessage::new(
            Challenge::from("CHALLENGE_5_00"),
        )))
        .to_vec();
        encoded.extend_from_slice(&[0xDE, 0xAD]);
        assert!(matches!(decode_message(&encoded), Ok(Message::Challenge(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_proof() -> impl Strategy<Value = Proof> {
            (
                prop::collection::vec(any::<u8>(), 0..96),
                prop::collection::vec(any::<u8>(), 0..96),
                ".{0,64}",
                any::<i64>(),
            )
                .prop_map(|(proof_data, commitment, challenge, timestamp)| Proof {
                    proof_data,
                    commitment: Commitment::from(commitment),
                    challenge: Challenge::from(challenge),
                    timestamp: Timestamp::from_nanos(timestamp),
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn proof_roundtrip(proof in arb_proof()) {
                let decoded = decode_proof(&encode_proof(&proof)).unwrap();
                prop_assert_eq!(decoded, proof);
            }

            #[test]
            fn proof_message_roundtrip(proof in arb_proof()) {
                let msg = Message::Proof(proof);
                prop_assert_eq!(decode_message(&encode_message(&msg)).unwrap(), msg);
            }

            #[test]
            fn proof_prefixes_rejected(proof in arb_proof()) {
                let encoded = encode_proof(&proof);
                for cut in 0..encoded.len() {
                    let result = decode_proof(&encoded[..cut]);
                    prop_assert!(
                        result.as_ref().is_err_and(CoreError::is_protocol_error),
                        "prefix of {} bytes accepted",
                        cut
                    );
                }
            }

            #[test]
            fn auth_request_prefixes_rejected(
                identity in "[A-Z0-9_]{0,24}",
                commitment in prop::collection::vec(any::<u8>(), 0..64),
            ) {
                let msg = Message::AuthRequest(AuthRequest::new(
                    Identity::from(identity),
                    Commitment::from(commitment),
                ));
                let encoded = encode_message(&msg);
                for cut in 0..encoded.len() {
                    let result = decode_message(&encoded[..cut]);
                    prop_assert!(
                        result.as_ref().is_err_and(CoreError::is_protocol_error),
                        "prefix of {} bytes accepted",
                        cut
                    );
                }
                prop_assert_eq!(decode_message(&encoded).unwrap(), msg);
            }
        }
    }
}
