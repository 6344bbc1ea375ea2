//! Random token generation for question ids.

use crate::types::QuestionId;
use rand::RngCore;

/// Upper bound on token entropy, in bytes.
pub const MAX_TOKEN_BYTES: usize = 32;

/// Entropy used for question ids: 8 bytes, 16 hex chars on the wire.
const QUESTION_ID_BYTES: usize = 8;

/// Generates a lowercase hex token with `bytes` bytes of entropy.
///
/// `bytes` is clamped to [`MAX_TOKEN_BYTES`]. Tokens are not guaranteed
/// globally unique; uniqueness within a room is a collision argument, not a
/// coordination protocol.
#[must_use]
pub fn random_hex_token(bytes: usize) -> String {
    let bytes = bytes.min(MAX_TOKEN_BYTES);
    let mut buf = [0u8; MAX_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut buf[..bytes]);
    let mut token = String::with_capacity(bytes * 2);
    for b in &buf[..bytes] {
        token.push_str(&format!("{b:02x}"));
    }
    token
}

/// Generates a fresh question id.
///
/// Clients call this for optimistic posts so the locally shown question and
/// the later authoritative fact agree on the id.
#[must_use]
pub fn generate_question_id() -> QuestionId {
    QuestionId::new(random_hex_token(QUESTION_ID_BYTES))
}
