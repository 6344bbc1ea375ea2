//! # Plenum Client
//!
//! Room session and reconciliation engine for Plenum clients.
//!
//! This crate provides:
//! - Session lifecycle state machine (disconnected → connecting →
//!   snapshot-loading → live, with reconnect)
//! - A projection of room state built by merging relay facts
//! - Optimistic room actions (post, answer, upvote, delete, edits)
//! - Canonical question display ordering
//! - Join-time setup prompts for identity and room creation
//! - Channel and prompt abstractions with mock implementations
//!
//! ## Architecture
//!
//! The client implements a **facts-only** reconciliation model:
//! 1. Every state change arrives as a relay fact (the relay is
//!    authoritative)
//! 2. Facts merge into the projection through one shared function
//! 3. The session's own actions apply optimistically as locally built
//!    facts through that same merge
//!
//! Joining seeds the projection by replaying a store snapshot as facts,
//! so a reconnect is structurally identical to a fresh join.
//!
//! ## Key Invariants
//!
//! - The relay is authoritative; local applies are provisional post-states
//! - There is exactly one merge path (no local-echo special case)
//! - Reaching `Live` always passes through `SnapshotLoading`
//! - Display order is a pure function of the question list
//! - Actions are rejected before any local mutation unless the session
//!   is live

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bootstrap;
mod config;
mod error;
mod order;
mod projection;
mod session;
mod state;
mod transport;

pub use bootstrap::{MockPrompts, RoomDraft, SetupPrompts, UserDraft};
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use order::{canonical_order, compare_questions};
pub use projection::Projection;
pub use session::Session;
pub use state::SessionState;
pub use transport::{ChannelFactory, MockChannelHandle, MockFactory, RoomChannel};
