//! # Plenum Testkit
//!
//! Test utilities for Plenum.
//!
//! This crate provides:
//! - Stores pre-seeded with the canonical fixture rooms and users
//! - Pre-built room scenarios (busy rooms, fully answered rooms)
//! - An in-process hub wiring real sessions to a real relay
//! - Property-based generators for ids, questions, facts and room
//!   action sequences
//!
//! ## Usage
//!
//! ```rust,ignore
//! use plenum_testkit::prelude::*;
//!
//! #[test]
//! fn test_against_fixtures() {
//!     with_seeded_store(|store| {
//!         // ... drive a relay or session against the fixture rooms
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod hub;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::hub::*;
}

pub use fixtures::*;
pub use generators::*;
pub use hub::*;
