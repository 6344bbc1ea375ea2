//! Error types for the relay.

use crate::gateway::PublishError;
use plenum_protocol::CodecError;
use plenum_store::StoreError;
use thiserror::Error;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while relaying a connection's commands.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An inbound frame failed to decode. Always swallowed: the frame is
    /// skipped and the receive loop continues.
    #[error("undecodable command: {0}")]
    Codec(#[from] CodecError),

    /// A store operation failed while applying a command.
    #[error("store rejected command: {0}")]
    Store(#[from] StoreError),

    /// The gateway refused a broadcast publish. Aborts the remainder of
    /// the current batch, nothing else.
    #[error(transparent)]
    Transport(#[from] PublishError),
}

impl RelayError {
    /// True for errors the receive loop logs and moves past without
    /// producing a fact.
    #[must_use]
    pub fn is_swallowed(&self) -> bool {
        match self {
            RelayError::Codec(_) => true,
            RelayError::Store(_) => true,
            RelayError::Transport(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_protocol::Channel;
    use plenum_protocol::RoomId;

    #[test]
    fn classification() {
        let decode = plenum_protocol::Command::decode("{bad").unwrap_err();
        assert!(RelayError::from(decode).is_swallowed());
        assert!(RelayError::from(StoreError::room_not_found("foo")).is_swallowed());
        let publish = PublishError::new(Channel::for_room(&RoomId::new("foo")), "gateway down");
        assert!(!RelayError::from(publish).is_swallowed());
    }
}
