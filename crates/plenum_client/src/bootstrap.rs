//! Modal setup prompts run during a join.
//!
//! Two situations suspend a join until the user answers: the session has
//! no user identity yet, or the target room does not exist. The UI
//! collaborator behind [`SetupPrompts`] collects the answer; returning
//! `None` cancels the join and the session unwinds to disconnected.

use parking_lot::Mutex;
use plenum_protocol::{RoomId, UserId};
use std::sync::Arc;

/// What the create-room prompt collected. Omitted fields fall back to the
/// store's creation defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomDraft {
    /// Display name for the new room.
    pub display_name: Option<String>,
    /// Theme color for the new room.
    pub theme_color: Option<String>,
}

impl RoomDraft {
    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the theme color.
    #[must_use]
    pub fn with_theme_color(mut self, theme_color: impl Into<String>) -> Self {
        self.theme_color = Some(theme_color.into());
        self
    }
}

/// What the enter-user-info prompt collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// The identity the session will act as.
    pub user_id: UserId,
    /// Display name to announce once live, if the user entered one.
    pub display_name: Option<String>,
}

impl UserDraft {
    /// A draft with just an identity.
    #[must_use]
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// The modal UI collaborator consulted during a join.
///
/// Each method blocks the join until resolved; `None` means the user
/// cancelled.
pub trait SetupPrompts: Send {
    /// Asks whether (and how) to create the missing room `room_id`.
    fn create_room(&self, room_id: &RoomId) -> Option<RoomDraft>;

    /// Asks the user for an identity.
    fn enter_user_info(&self) -> Option<UserDraft>;
}

impl<P: SetupPrompts + Sync> SetupPrompts for Arc<P> {
    fn create_room(&self, room_id: &RoomId) -> Option<RoomDraft> {
        (**self).create_room(room_id)
    }

    fn enter_user_info(&self) -> Option<UserDraft> {
        (**self).enter_user_info()
    }
}

/// Scripted [`SetupPrompts`] for tests. Answers are fixed up front;
/// unscripted prompts read as cancellations.
#[derive(Debug, Default)]
pub struct MockPrompts {
    user: Mutex<Option<UserDraft>>,
    room: Mutex<Option<RoomDraft>>,
    user_prompt_count: Mutex<u32>,
    room_prompt_count: Mutex<u32>,
}

impl MockPrompts {
    /// Prompts that cancel everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the enter-user-info answer.
    #[must_use]
    pub fn with_user(self, draft: UserDraft) -> Self {
        *self.user.lock() = Some(draft);
        self
    }

    /// Scripts the create-room answer.
    #[must_use]
    pub fn with_room(self, draft: RoomDraft) -> Self {
        *self.room.lock() = Some(draft);
        self
    }

    /// How many times the user prompt ran.
    #[must_use]
    pub fn user_prompt_count(&self) -> u32 {
        *self.user_prompt_count.lock()
    }

    /// How many times the create-room prompt ran.
    #[must_use]
    pub fn room_prompt_count(&self) -> u32 {
        *self.room_prompt_count.lock()
    }
}

impl SetupPrompts for MockPrompts {
    fn create_room(&self, _room_id: &RoomId) -> Option<RoomDraft> {
        *self.room_prompt_count.lock() += 1;
        self.room.lock().clone()
    }

    fn enter_user_info(&self) -> Option<UserDraft> {
        *self.user_prompt_count.lock() += 1;
        self.user.lock().clone()
    }
}
