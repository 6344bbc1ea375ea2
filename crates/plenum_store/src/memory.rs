//! In-memory store adapter.

use crate::error::{StoreError, StoreResult};
use crate::store::{QuestionPatch, Store};
use chrono::Utc;
use parking_lot::RwLock;
use plenum_protocol::{
    QuestionId, QuestionInfo, RoomId, RoomInfo, RoomPatch, RoomSnapshot, UserId, UserInfo,
    UserPatch,
};
use std::collections::{BTreeSet, HashMap};

/// Theme color assigned when a room is created without one.
const DEFAULT_THEME_COLOR: &str = "#038cfc";

/// Reference store adapter backed by process memory.
///
/// Every operation takes the inner write lock for its whole
/// read-modify-write span, which is what makes the upvote toggle atomic per
/// question: two concurrent togglers serialize, and the loser sees the
/// winner's set.
///
/// # Example
///
/// ```rust
/// use plenum_store::{InMemoryStore, Store};
/// use plenum_protocol::{QuestionId, RoomId, UserId};
///
/// let store = InMemoryStore::new();
/// let room = RoomId::new("foo");
/// let user = UserId::new("jappleseed");
/// store.create_room(&room, Some("Foo Room"), None).unwrap();
/// let q = store
///     .add_question(&room, &user, &QuestionId::new("a1b2"), "Why?")
///     .unwrap();
/// assert_eq!(q.vote_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rooms: HashMap<RoomId, RoomInfo>,
    users: HashMap<UserId, UserInfo>,
    questions: HashMap<RoomId, Vec<QuestionInfo>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms currently stored.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.inner.read().rooms.len()
    }
}

impl Store for InMemoryStore {
    fn get_room(&self, room_id: &RoomId) -> StoreResult<RoomInfo> {
        self.inner
            .read()
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| StoreError::room_not_found(room_id))
    }

    fn get_user(&self, user_id: &UserId) -> StoreResult<UserInfo> {
        self.inner
            .read()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::user_not_found(user_id))
    }

    fn get_questions(&self, room_id: &RoomId) -> StoreResult<Vec<QuestionInfo>> {
        let inner = self.inner.read();
        if !inner.rooms.contains_key(room_id) {
            return Err(StoreError::room_not_found(room_id));
        }
        Ok(inner.questions.get(room_id).cloned().unwrap_or_default())
    }

    fn get_room_snapshot(&self, room_id: &RoomId) -> StoreResult<RoomSnapshot> {
        let inner = self.inner.read();
        let room = inner
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| StoreError::room_not_found(room_id))?;
        let questions = inner.questions.get(room_id).cloned().unwrap_or_default();

        let mut referenced = BTreeSet::new();
        for question in &questions {
            referenced.insert(question.author.clone());
            if let Some(answer_author) = &question.answer_author {
                referenced.insert(answer_author.clone());
            }
            for voter in &question.up_votes {
                referenced.insert(voter.clone());
            }
        }
        let users = referenced
            .into_iter()
            .filter_map(|id| inner.users.get(&id).cloned())
            .collect();

        Ok(RoomSnapshot {
            room,
            questions,
            users,
        })
    }

    fn create_room(
        &self,
        room_id: &RoomId,
        display_name: Option<&str>,
        theme_color: Option<&str>,
    ) -> StoreResult<RoomInfo> {
        let mut inner = self.inner.write();
        if inner.rooms.contains_key(room_id) {
            return Err(StoreError::room_exists(room_id));
        }
        let room = RoomInfo::new(
            room_id.clone(),
            display_name
                .map(str::to_owned)
                .unwrap_or_else(|| format!("New Room: {room_id}")),
            theme_color.unwrap_or(DEFAULT_THEME_COLOR),
        );
        inner.rooms.insert(room_id.clone(), room.clone());
        Ok(room)
    }

    fn update_room_info(&self, room_id: &RoomId, patch: &RoomPatch) -> StoreResult<RoomInfo> {
        let mut inner = self.inner.write();
        let room = inner
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomInfo::placeholder(room_id.clone()));
        room.apply_patch(patch);
        Ok(room.clone())
    }

    fn update_user_info(&self, user_id: &UserId, patch: &UserPatch) -> StoreResult<UserInfo> {
        let mut inner = self.inner.write();
        let user = inner
            .users
            .entry(user_id.clone())
            .or_insert_with(|| UserInfo::placeholder(user_id.clone()));
        user.apply_patch(patch);
        Ok(user.clone())
    }

    fn add_question(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        question_id: &QuestionId,
        question_text: &str,
    ) -> StoreResult<QuestionInfo> {
        let question = QuestionInfo::posted(
            question_id.clone(),
            user_id.clone(),
            question_text,
            Utc::now(),
        );
        let mut inner = self.inner.write();
        inner
            .questions
            .entry(room_id.clone())
            .or_default()
            .push(question.clone());
        Ok(question)
    }

    fn update_question(
        &self,
        room_id: &RoomId,
        question_id: &QuestionId,
        patch: &QuestionPatch,
    ) -> StoreResult<QuestionInfo> {
        let mut inner = self.inner.write();
        if !inner.rooms.contains_key(room_id) {
            return Err(StoreError::room_not_found(room_id));
        }
        let question = inner
            .questions
            .get_mut(room_id)
            .and_then(|list| list.iter_mut().find(|q| &q.id == question_id))
            .ok_or_else(|| StoreError::question_not_found(question_id))?;

        if let Some(answer_text) = &patch.answer_text {
            question.answer_text = Some(answer_text.clone());
        }
        if let Some(answer_timestamp) = patch.answer_timestamp {
            question.answer_timestamp = Some(answer_timestamp);
        }
        if let Some(answer_author) = &patch.answer_author {
            question.answer_author = Some(answer_author.clone());
        }
        Ok(question.clone())
    }

    fn delete_question(&self, room_id: &RoomId, question_id: &QuestionId) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.rooms.contains_key(room_id) {
            return Err(StoreError::room_not_found(room_id));
        }
        if let Some(list) = inner.questions.get_mut(room_id) {
            list.retain(|q| &q.id != question_id);
        }
        Ok(())
    }

    fn toggle_upvote(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        question_id: &QuestionId,
        remove: bool,
    ) -> StoreResult<QuestionInfo> {
        let mut inner = self.inner.write();
        if !inner.rooms.contains_key(room_id) {
            return Err(StoreError::room_not_found(room_id));
        }
        let question = inner
            .questions
            .get_mut(room_id)
            .and_then(|list| list.iter_mut().find(|q| &q.id == question_id))
            .ok_or_else(|| StoreError::question_not_found(question_id))?;

        if remove {
            question.up_votes.remove(user_id);
        } else {
            question.up_votes.insert(user_id.clone());
        }
        Ok(question.clone())
    }
}
