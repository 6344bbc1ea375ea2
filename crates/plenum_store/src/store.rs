//! Store trait definition.

use crate::error::StoreResult;
use chrono::{DateTime, Utc};
use plenum_protocol::{
    QuestionId, QuestionInfo, RoomId, RoomInfo, RoomPatch, RoomSnapshot, UserId, UserInfo,
    UserPatch,
};

/// Partial update of a question's mutable fields.
///
/// Only the answer triple is mutable after creation; `question_text`,
/// `question_timestamp` and `author` are fixed at post time, and the upvote
/// set changes exclusively through [`Store::toggle_upvote`]. The relay's
/// answer handler always fills all three fields so a question never ends up
/// with a timestamp but no text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionPatch {
    /// Replacement answer body.
    pub answer_text: Option<String>,
    /// Replacement answer time.
    pub answer_timestamp: Option<DateTime<Utc>>,
    /// Replacement answerer.
    pub answer_author: Option<UserId>,
}

impl QuestionPatch {
    /// A patch carrying a complete answer.
    #[must_use]
    pub fn answer(
        author: impl Into<UserId>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            answer_text: Some(text.into()),
            answer_timestamp: Some(timestamp),
            answer_author: Some(author.into()),
        }
    }

    /// True when the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answer_text.is_none() && self.answer_timestamp.is_none() && self.answer_author.is_none()
    }
}

/// The persistence interface the relay and session bootstrap consume.
///
/// The store owns the canonical copy of every room, user and question. The
/// relay mutates it one command at a time; joining clients read snapshots
/// from it. Its internal representation is its own business.
///
/// # Invariants
///
/// - Implementations are `Send + Sync`; callers share one handle across
///   connections and sessions
/// - Read-modify-write operations are atomic per entity, so two concurrent
///   upvote toggles cannot lose each other's writes
/// - `update_room_info` and `update_user_info` are upserts; the entity is
///   created from placeholder defaults when absent
/// - `delete_question` on an id that is already gone is a no-op
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - reference adapter for the relay, tests and
///   the demo
pub trait Store: Send + Sync {
    /// Reads a room record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such room exists.
    fn get_room(&self, room_id: &RoomId) -> StoreResult<RoomInfo>;

    /// Reads a user record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such user exists.
    fn get_user(&self, user_id: &UserId) -> StoreResult<UserInfo>;

    /// Reads all questions currently in a room.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such room exists. A room without questions yields
    /// an empty list, not an error.
    fn get_questions(&self, room_id: &RoomId) -> StoreResult<Vec<QuestionInfo>>;

    /// Reads the room record, its questions, and every referenced user
    /// (author, answerer or upvoter) that has a user record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such room exists.
    fn get_room_snapshot(&self, room_id: &RoomId) -> StoreResult<RoomSnapshot>;

    /// Creates a room. Omitted presentation fields fall back to the
    /// creation defaults.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the id is taken.
    fn create_room(
        &self,
        room_id: &RoomId,
        display_name: Option<&str>,
        theme_color: Option<&str>,
    ) -> StoreResult<RoomInfo>;

    /// Upserts a room's mutable fields and returns the post-state record.
    fn update_room_info(&self, room_id: &RoomId, patch: &RoomPatch) -> StoreResult<RoomInfo>;

    /// Upserts a user's mutable fields and returns the post-state record.
    fn update_user_info(&self, user_id: &UserId, patch: &UserPatch) -> StoreResult<UserInfo>;

    /// Appends a question to a room. The author's upvote seeds the set and
    /// the timestamp is assigned here. The room's question list is created
    /// lazily; posting into an undescribed room is allowed.
    fn add_question(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        question_id: &QuestionId,
        question_text: &str,
    ) -> StoreResult<QuestionInfo>;

    /// Patches a question's mutable fields and returns the post-state
    /// record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the room or the question is absent.
    fn update_question(
        &self,
        room_id: &RoomId,
        question_id: &QuestionId,
        patch: &QuestionPatch,
    ) -> StoreResult<QuestionInfo>;

    /// Removes a question. Removing an id that is not present is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` if the room is absent.
    fn delete_question(&self, room_id: &RoomId, question_id: &QuestionId) -> StoreResult<()>;

    /// Adds (`remove = false`) or removes (`remove = true`) `user_id` from
    /// a question's upvote set and returns the post-state record. Adding a
    /// present member or removing an absent one changes nothing; the toggle
    /// is idempotent by construction.
    ///
    /// # Errors
    ///
    /// `NotFound` if the room or the question is absent.
    fn toggle_upvote(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        question_id: &QuestionId,
        remove: bool,
    ) -> StoreResult<QuestionInfo>;
}
