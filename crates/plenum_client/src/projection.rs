//! The client's local copy of room state.
//!
//! Every change, a peer's or this client's own optimistic one, lands
//! through [`Projection::apply_fact`]. The projection never talks to the
//! network; it converges because the relay's facts carry authoritative
//! post-state and the merge below is a pure upsert.

use crate::order;
use chrono::Utc;
use plenum_protocol::{
    Fact, QuestionId, QuestionInfo, RoomId, RoomInfo, RoomPatch, UserId, UserInfo, UserPatch,
};
use std::collections::HashMap;

/// Local room state, maintained exclusively by merge rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    current_room: Option<RoomId>,
    current_user: Option<UserId>,
    is_host: bool,
    known_rooms: HashMap<RoomId, RoomInfo>,
    known_users: HashMap<UserId, UserInfo>,
    questions: HashMap<QuestionId, QuestionInfo>,
}

impl Projection {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Room this projection currently follows, if any.
    #[must_use]
    pub fn current_room(&self) -> Option<&RoomId> {
        self.current_room.as_ref()
    }

    /// Identity this session acts as, once entered.
    #[must_use]
    pub fn current_user(&self) -> Option<&UserId> {
        self.current_user.as_ref()
    }

    /// Whether this session joined the current room as its host.
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Info for the current room, once a fact or snapshot delivered it.
    #[must_use]
    pub fn room_info(&self) -> Option<&RoomInfo> {
        self.known_rooms.get(self.current_room.as_ref()?)
    }

    /// Cached info for any room seen so far.
    #[must_use]
    pub fn known_room(&self, id: &RoomId) -> Option<&RoomInfo> {
        self.known_rooms.get(id)
    }

    /// Cached profile for any user seen so far.
    #[must_use]
    pub fn known_user(&self, id: &UserId) -> Option<&UserInfo> {
        self.known_users.get(id)
    }

    /// One question of the current room, by id.
    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&QuestionInfo> {
        self.questions.get(id)
    }

    /// Number of questions currently held.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Unordered view of the current room's questions.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionInfo> {
        self.questions.values()
    }

    /// The current room's questions in canonical display order.
    #[must_use]
    pub fn ordered_questions(&self) -> Vec<&QuestionInfo> {
        order::canonical_order(self.questions.values())
    }

    pub(crate) fn set_current_user(&mut self, user_id: UserId) {
        self.current_user = Some(user_id);
    }

    pub(crate) fn enter(&mut self, room_id: RoomId, is_host: bool) {
        self.current_room = Some(room_id);
        self.is_host = is_host;
    }

    /// Drops all question state, keeping the cross-room caches.
    pub(crate) fn forget_questions(&mut self) {
        self.questions.clear();
    }

    pub(crate) fn leave(&mut self) {
        self.questions.clear();
        self.current_room = None;
        self.is_host = false;
    }

    /// Merges one authoritative fact.
    ///
    /// Upserts create missing entities with placeholder defaults and only
    /// overwrite fields the fact carries. Question facts for a room other
    /// than the current one touch nothing but the user cache; upvote
    /// results replace the whole set and are ignored for unknown
    /// questions; deletes are unconditional and no-ops when absent.
    pub fn apply_fact(&mut self, fact: Fact) {
        match fact {
            Fact::RoomUpdate {
                room_id,
                display_name,
                theme_color,
            } => {
                let patch = RoomPatch {
                    display_name,
                    theme_color,
                };
                self.known_rooms
                    .entry(room_id.clone())
                    .or_insert_with(|| RoomInfo::placeholder(room_id))
                    .apply_patch(&patch);
            }

            Fact::UserUpdate {
                user_id,
                display_name,
            } => {
                let patch = UserPatch { display_name };
                self.known_users
                    .entry(user_id.clone())
                    .or_insert_with(|| UserInfo::placeholder(user_id))
                    .apply_patch(&patch);
            }

            Fact::QuestionUpdate {
                room_id,
                question_id,
                question_text,
                question_timestamp,
                author,
                answer_text,
                answer_timestamp,
                answer_author,
                up_votes,
                user_info,
            } => {
                if let Some(user) = user_info {
                    self.known_users.insert(user.id.clone(), user);
                }
                if self.current_room.as_ref() != Some(&room_id) {
                    return;
                }
                let question = self
                    .questions
                    .entry(question_id.clone())
                    .or_insert_with(|| QuestionInfo::placeholder(question_id, Utc::now()));
                if let Some(text) = question_text {
                    question.question_text = text;
                }
                if let Some(timestamp) = question_timestamp {
                    question.question_timestamp = timestamp;
                }
                if let Some(author) = author {
                    question.author = author;
                }
                if let Some(text) = answer_text {
                    question.answer_text = Some(text);
                }
                if let Some(timestamp) = answer_timestamp {
                    question.answer_timestamp = Some(timestamp);
                }
                if let Some(author) = answer_author {
                    question.answer_author = Some(author);
                }
                if let Some(up_votes) = up_votes {
                    question.up_votes = up_votes;
                }
            }

            Fact::QuestionDelete { question_id, .. } => {
                self.questions.remove(&question_id);
            }

            Fact::QuestionUpvoteResult {
                room_id,
                question_id,
                up_votes,
                user_info,
            } => {
                if let Some(user) = user_info {
                    self.known_users.insert(user.id.clone(), user);
                }
                if self.current_room.as_ref() != Some(&room_id) {
                    return;
                }
                if let Some(question) = self.questions.get_mut(&question_id) {
                    question.up_votes = up_votes;
                }
            }
        }
    }
}
