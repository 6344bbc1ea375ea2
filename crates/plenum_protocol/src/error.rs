//! Codec error type.

use thiserror::Error;

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Failure while moving an envelope across the JSON wire form.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Inbound payload was not valid JSON, or did not match any known
    /// envelope kind. Receivers drop these rather than fail the connection.
    #[error("malformed envelope: {0}")]
    Decode(#[source] serde_json::Error),

    /// Outbound envelope failed to serialize. Does not happen for
    /// well-formed envelopes; surfaced instead of panicking.
    #[error("envelope encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// True for inbound decode failures, the swallow-and-continue class.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, CodecError::Decode(_))
    }
}
