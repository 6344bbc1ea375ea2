//! Seeded stores and common room scenarios.
//!
//! Provides convenience constructors for stores pre-loaded with the
//! canonical fixture rooms, users and questions used across the
//! workspace's tests.

use chrono::{DateTime, TimeZone, Utc};
use plenum_protocol::{QuestionId, RoomId, UserId, UserPatch};
use plenum_store::{InMemoryStore, QuestionPatch, Store};
use std::sync::Arc;

/// Id of the seeded room holding the fixture questions.
pub const FOO_ROOM: &str = "foo";
/// Id of the seeded pink room (no questions).
pub const BAR_ROOM: &str = "bar";
/// Id of the seeded green room (no questions).
pub const BAZ_ROOM: &str = "baz";
/// Seeded audience member; author of both fixture questions.
pub const AUDIENCE_USER: &str = "jappleseed";
/// Seeded host; answered the first fixture question.
pub const HOST_USER: &str = "prabbit";
/// Id of the answered fixture question.
pub const ANSWERED_QUESTION: &str = "64fc25ad1f71466a";
/// Id of the still-open fixture question.
pub const OPEN_QUESTION: &str = "140ca1af98094469";

/// When the host answered the fixture question.
#[must_use]
pub fn fixture_answer_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 5, 29, 0, 5, 0)
        .single()
        .expect("fixture timestamp is valid")
}

/// A test store, shared as an `Arc` so sessions, relays and assertions
/// can all hold it at once.
pub struct TestStore {
    /// The store instance.
    pub store: Arc<InMemoryStore>,
}

impl TestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
        }
    }

    /// Creates a store seeded with three rooms, two users and two
    /// questions in [`FOO_ROOM`]: one answered by the host, one still
    /// open with votes from both users.
    #[must_use]
    pub fn seeded() -> Self {
        let test_store = Self::empty();
        let store = &test_store.store;
        let foo = RoomId::new(FOO_ROOM);
        let audience = UserId::new(AUDIENCE_USER);
        let host = UserId::new(HOST_USER);

        store
            .create_room(&foo, Some("Foo Room"), Some("#038cfc"))
            .expect("seed foo room");
        store
            .create_room(&RoomId::new(BAR_ROOM), Some("Bar Room"), Some("#f5429b"))
            .expect("seed bar room");
        store
            .create_room(&RoomId::new(BAZ_ROOM), Some("Baz Room"), Some("#188c2d"))
            .expect("seed baz room");

        store
            .update_user_info(
                &audience,
                &UserPatch::default().with_display_name("Johnny Appleseed"),
            )
            .expect("seed audience user");
        store
            .update_user_info(&host, &UserPatch::default().with_display_name("Peter Rabbit"))
            .expect("seed host user");

        let answered = QuestionId::new(ANSWERED_QUESTION);
        store
            .add_question(&foo, &audience, &answered, "When will be the next event?")
            .expect("seed answered question");
        store
            .update_question(
                &foo,
                &answered,
                &QuestionPatch::answer(
                    host.clone(),
                    "It will be on Jun 3, 2002",
                    fixture_answer_time(),
                ),
            )
            .expect("seed answer");

        let open = QuestionId::new(OPEN_QUESTION);
        store
            .add_question(&foo, &audience, &open, "How's the weather?")
            .expect("seed open question");
        store
            .toggle_upvote(&foo, &host, &open, false)
            .expect("seed host vote");

        test_store
    }

    /// The store as a trait object, ready for a session or relay.
    #[must_use]
    pub fn as_dyn(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store) as Arc<dyn Store>
    }
}

impl std::ops::Deref for TestStore {
    type Target = InMemoryStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test against the seeded store.
pub fn with_seeded_store<F, R>(f: F) -> R
where
    F: FnOnce(&InMemoryStore) -> R,
{
    let test_store = TestStore::seeded();
    f(&test_store.store)
}

/// Larger pre-built room shapes.
pub mod scenarios {
    use super::*;

    /// A room with `question_count` open questions from alternating
    /// authors, each carrying only its author's vote.
    pub fn busy_room(question_count: usize) -> (TestStore, RoomId) {
        let test_store = TestStore::seeded();
        let room_id = RoomId::new("busy");
        test_store
            .create_room(&room_id, Some("Busy Room"), None)
            .expect("create busy room");

        for i in 0..question_count {
            let author = if i % 2 == 0 {
                UserId::new(AUDIENCE_USER)
            } else {
                UserId::new(HOST_USER)
            };
            test_store
                .add_question(
                    &room_id,
                    &author,
                    &QuestionId::new(format!("{i:016x}")),
                    &format!("Question number {i}?"),
                )
                .expect("add question");
        }

        (test_store, room_id)
    }

    /// Like [`busy_room`], but with every question answered by the host.
    pub fn answered_room(question_count: usize) -> (TestStore, RoomId) {
        let (test_store, room_id) = busy_room(question_count);
        let answered_at = fixture_answer_time();

        for i in 0..question_count {
            test_store
                .update_question(
                    &room_id,
                    &QuestionId::new(format!("{i:016x}")),
                    &QuestionPatch::answer(HOST_USER, format!("Answer number {i}."), answered_at),
                )
                .expect("answer question");
        }

        (test_store, room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_matches_the_fixture_shape() {
        let test_store = TestStore::seeded();
        assert_eq!(test_store.room_count(), 3);
        assert_eq!(
            test_store
                .get_room(&RoomId::new(FOO_ROOM))
                .unwrap()
                .display_name,
            "Foo Room"
        );

        let questions = test_store.get_questions(&RoomId::new(FOO_ROOM)).unwrap();
        assert_eq!(questions.len(), 2);

        let answered = questions
            .iter()
            .find(|q| q.id == QuestionId::new(ANSWERED_QUESTION))
            .unwrap();
        assert!(answered.is_answered());
        assert_eq!(answered.answer_author, Some(UserId::new(HOST_USER)));
        assert_eq!(answered.answer_timestamp, Some(fixture_answer_time()));

        let open = questions
            .iter()
            .find(|q| q.id == QuestionId::new(OPEN_QUESTION))
            .unwrap();
        assert!(!open.is_answered());
        assert_eq!(open.vote_count(), 2);
    }

    #[test]
    fn seeded_snapshot_references_both_users() {
        with_seeded_store(|store| {
            let snapshot = store.get_room_snapshot(&RoomId::new(FOO_ROOM)).unwrap();
            let mut user_ids: Vec<&str> =
                snapshot.users.iter().map(|u| u.id.as_str()).collect();
            user_ids.sort_unstable();
            assert_eq!(user_ids, vec![AUDIENCE_USER, HOST_USER]);
        });
    }

    #[test]
    fn busy_room_alternates_authors() {
        let (test_store, room_id) = scenarios::busy_room(4);
        let questions = test_store.get_questions(&room_id).unwrap();
        assert_eq!(questions.len(), 4);
        let by_audience = questions
            .iter()
            .filter(|q| q.author == UserId::new(AUDIENCE_USER))
            .count();
        assert_eq!(by_audience, 2);
    }

    #[test]
    fn answered_room_answers_everything() {
        let (test_store, room_id) = scenarios::answered_room(3);
        let questions = test_store.get_questions(&room_id).unwrap();
        assert!(questions.iter().all(|q| q.is_answered()));
    }
}
