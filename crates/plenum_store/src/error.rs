//! Error types for store operations.

use std::fmt;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The entity class an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A room record.
    Room,
    /// A user record.
    User,
    /// A question record.
    Question,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Room => "room",
            EntityKind::User => "user",
            EntityKind::Question => "question",
        };
        f.write_str(name)
    }
}

/// Errors raised by store operations.
///
/// Room join and creation flows surface these to the caller; the relay logs
/// and skips the offending command instead. Everything the backing service
/// cannot express as `NotFound` or `AlreadyExists` arrives as `Unavailable`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("unknown {kind}: {id}")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The id that missed.
        id: String,
    },

    /// Creation collided with an existing entity.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// What was being created.
        kind: EntityKind,
        /// The id that collided.
        id: String,
    },

    /// The store itself could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Missing-room error.
    #[must_use]
    pub fn room_not_found(id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            kind: EntityKind::Room,
            id: id.to_string(),
        }
    }

    /// Missing-user error.
    #[must_use]
    pub fn user_not_found(id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            kind: EntityKind::User,
            id: id.to_string(),
        }
    }

    /// Missing-question error.
    #[must_use]
    pub fn question_not_found(id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            kind: EntityKind::Question,
            id: id.to_string(),
        }
    }

    /// Room-creation collision.
    #[must_use]
    pub fn room_exists(id: impl fmt::Display) -> Self {
        StoreError::AlreadyExists {
            kind: EntityKind::Room,
            id: id.to_string(),
        }
    }

    /// True when the error is any `NotFound`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True when the error is any `AlreadyExists`.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}
