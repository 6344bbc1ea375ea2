//! # Plenum Store
//!
//! Persistence interface and in-memory store adapter for Plenum rooms.
//!
//! This crate provides:
//! - The [`Store`] trait the relay and session bootstrap call into
//! - The store error taxonomy (`NotFound`, `AlreadyExists`, `Unavailable`)
//! - [`InMemoryStore`], the reference adapter used by the relay, tests and
//!   the demo
//!
//! ## Design Principles
//!
//! - The store owns the canonical copy of every entity; everything else is
//!   a projection of it
//! - Updates are upserts: patching an unknown room or user creates it from
//!   placeholder defaults
//! - Read-modify-write operations (the upvote toggle above all) are atomic
//!   per entity under concurrent callers
//! - Question creation fields are immutable; only the answer triple can be
//!   patched after the fact
//!
//! ## Example
//!
//! ```rust
//! use plenum_store::{InMemoryStore, Store};
//! use plenum_protocol::RoomId;
//!
//! let store = InMemoryStore::new();
//! let room_id = RoomId::new("foo");
//! store.create_room(&room_id, Some("Foo Room"), None).unwrap();
//! assert_eq!(store.get_room(&room_id).unwrap().display_name, "Foo Room");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{EntityKind, StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use store::{QuestionPatch, Store};
