//! Error types for room sessions.

use crate::state::SessionState;
use plenum_protocol::QuestionId;
use plenum_store::StoreError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by a room session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An action needed a live room connection and there is none.
    #[error("no live room connection")]
    NotConnected,

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    /// The user dismissed a setup prompt; the join was abandoned.
    #[error("setup cancelled")]
    SetupCancelled,

    /// The session was torn down; no further operations are possible.
    #[error("session torn down")]
    TornDown,

    /// An action referenced a question the projection does not hold.
    #[error("question {id} is not in the local projection")]
    UnknownQuestion {
        /// The missing question id.
        id: QuestionId,
    },

    /// The room channel failed to open, send or stay up.
    #[error("room channel failed: {0}")]
    Channel(String),

    /// An outbound command could not be encoded.
    #[error(transparent)]
    Codec(#[from] plenum_protocol::CodecError),

    /// A store call failed during join, snapshot load or room creation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// True for rejections caused by the session not being live.
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, SessionError::NotConnected)
    }

    /// True when a setup prompt was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionError::SetupCancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(SessionError::NotConnected.is_not_connected());
        assert!(SessionError::SetupCancelled.is_cancelled());
        assert!(!SessionError::TornDown.is_not_connected());
        assert!(!SessionError::Channel("gone".into()).is_cancelled());
    }

    #[test]
    fn store_errors_convert() {
        let err: SessionError = StoreError::room_not_found("foo").into();
        assert!(matches!(err, SessionError::Store(inner) if inner.is_not_found()));
    }

    #[test]
    fn display_names_the_state() {
        let err = SessionError::InvalidState {
            operation: "enter a room",
            state: SessionState::Live,
        };
        assert_eq!(err.to_string(), "cannot enter a room while Live");
    }
}
