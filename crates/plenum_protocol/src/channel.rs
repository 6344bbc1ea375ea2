//! Broadcast channel naming.

use crate::types::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a gateway broadcast channel.
///
/// One channel exists per room and carries only that room's facts; there is
/// no cross-room fan-out.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    /// The channel carrying a room's facts: `room:{roomId}`.
    #[must_use]
    pub fn for_room(room_id: &RoomId) -> Self {
        Self(format!("room:{room_id}"))
    }

    /// Returns the raw channel name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_channel_naming() {
        let channel = Channel::for_room(&RoomId::new("foo"));
        assert_eq!(channel.as_str(), "room:foo");
        assert_eq!(channel.to_string(), "room:foo");
    }

    #[test]
    fn distinct_rooms_distinct_channels() {
        assert_ne!(
            Channel::for_room(&RoomId::new("foo")),
            Channel::for_room(&RoomId::new("bar"))
        );
    }
}
