//! # Plenum Protocol
//!
//! Wire envelope types and JSON codecs for Plenum rooms.
//!
//! This crate provides:
//! - Id newtypes and entity records (rooms, users, questions)
//! - `Command` envelopes (client → relay intent)
//! - `Fact` envelopes (relay → clients authoritative post-state)
//! - Per-room broadcast channel naming
//! - Random question-id generation
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Architecture
//!
//! Every envelope is a flat JSON object carrying a `type` discriminant plus
//! kind-specific camelCase fields. Commands and facts are separate enums even
//! where they share a discriminant, so a relay can never be handed a fact and
//! a client can never be handed a command by mistake.
//!
//! ## Key Invariants
//!
//! - Commands describe intent; only facts mutate a projection
//! - Optional fields absent from a fact mean "keep the local value"
//! - Upvote membership is a set; the wire carries it whole, never as a delta
//! - Malformed payloads are a [`CodecError`], left to the receiver to drop

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod envelope;
mod error;
mod ids;
mod types;

pub use channel::Channel;
pub use envelope::{Command, Fact};
pub use error::{CodecError, CodecResult};
pub use ids::{generate_question_id, random_hex_token, MAX_TOKEN_BYTES};
pub use types::{
    QuestionId, QuestionInfo, RoomId, RoomInfo, RoomPatch, RoomSnapshot, UserId, UserInfo,
    UserPatch,
};
