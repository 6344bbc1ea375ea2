//! Session lifecycle states.

/// The current state of a room session.
///
/// `Disconnected → Connecting → SnapshotLoading → Live`, with
/// `Live ⇄ Reconnecting` on channel loss and `TornDown` as the terminal
/// state. Re-entering `Live` always passes through `SnapshotLoading`
/// again, so a reconnected client is indistinguishable from one that
/// joined fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not in any room.
    Disconnected,
    /// Channel opening for the first time after a join.
    Connecting,
    /// Channel is open; the seeding snapshot has not been applied yet.
    SnapshotLoading,
    /// Seeded and receiving facts; actions are allowed.
    Live,
    /// Channel was lost mid-session; polling to re-establish it.
    Reconnecting,
    /// Session is finished for good.
    TornDown,
}

impl SessionState {
    /// True while the session belongs to a room, live or not.
    #[must_use]
    pub fn is_in_room(&self) -> bool {
        matches!(
            self,
            SessionState::Connecting
                | SessionState::SnapshotLoading
                | SessionState::Live
                | SessionState::Reconnecting
        )
    }

    /// True when facts flow and actions are accepted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Live)
    }

    /// True when a new room can be entered.
    #[must_use]
    pub fn can_enter_room(&self) -> bool {
        matches!(self, SessionState::Disconnected)
    }

    /// True for the terminal state.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        matches!(self, SessionState::TornDown)
    }
}
