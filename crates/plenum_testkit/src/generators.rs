//! Property-based test generators using proptest.
//!
//! Provides strategies for ids, payload fields, whole questions, relay
//! facts and room action sequences that keep protocol invariants
//! intact.

use chrono::{DateTime, TimeZone, Utc};
use plenum_protocol::{Fact, QuestionId, QuestionInfo, RoomId, UserId};
use proptest::prelude::*;

/// Strategy for generating room ids.
pub fn room_id_strategy() -> impl Strategy<Value = RoomId> {
    prop::string::string_regex("[a-z][a-z0-9-]{2,15}")
        .expect("valid regex")
        .prop_map(RoomId::new)
}

/// Strategy for generating user ids.
pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
    prop::string::string_regex("[a-z][a-z0-9_]{2,15}")
        .expect("valid regex")
        .prop_map(UserId::new)
}

/// Strategy for generating question ids in the wire's 16-hex-digit
/// shape.
pub fn question_id_strategy() -> impl Strategy<Value = QuestionId> {
    prop::string::string_regex("[0-9a-f]{16}")
        .expect("valid regex")
        .prop_map(QuestionId::new)
}

/// Strategy for generating question or answer text.
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ,.?!']{1,80}").expect("valid regex")
}

/// Strategy for generating display names.
pub fn display_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-z]{1,11}( [A-Z][a-z]{1,11})?").expect("valid regex")
}

/// Strategy for generating `#rrggbb` theme colors.
pub fn theme_color_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("#[0-9a-f]{6}").expect("valid regex")
}

/// Strategy for generating timestamps between 2020 and 2030.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .expect("seconds are in range")
    })
}

/// Strategy for generating complete questions.
///
/// The author's own vote is always present and the answer triple is
/// all-or-nothing.
pub fn question_info_strategy() -> impl Strategy<Value = QuestionInfo> {
    (
        question_id_strategy(),
        user_id_strategy(),
        text_strategy(),
        timestamp_strategy(),
        prop::collection::btree_set(user_id_strategy(), 0..4),
        prop::option::of((user_id_strategy(), text_strategy(), timestamp_strategy())),
    )
        .prop_map(
            |(id, author, text, posted_at, extra_voters, answer)| {
                let mut question = QuestionInfo::posted(id, author, text, posted_at);
                question.up_votes.extend(extra_voters);
                if let Some((answer_author, answer_text, answered_at)) = answer {
                    question.answer_author = Some(answer_author);
                    question.answer_text = Some(answer_text);
                    question.answer_timestamp = Some(answered_at);
                }
                question
            },
        )
}

/// Strategy for generating arbitrary relay facts.
///
/// Facts are well-formed on the wire but deliberately not consistent
/// with any store; use them to hammer merge paths.
pub fn fact_strategy() -> impl Strategy<Value = Fact> {
    prop_oneof![
        (
            room_id_strategy(),
            prop::option::of(display_name_strategy()),
            prop::option::of(theme_color_strategy()),
        )
            .prop_map(|(room_id, display_name, theme_color)| Fact::RoomUpdate {
                room_id,
                display_name,
                theme_color,
            }),
        (user_id_strategy(), prop::option::of(display_name_strategy())).prop_map(
            |(user_id, display_name)| Fact::UserUpdate {
                user_id,
                display_name,
            }
        ),
        (room_id_strategy(), question_info_strategy())
            .prop_map(|(room_id, question)| Fact::question_full(room_id, &question)),
        (room_id_strategy(), question_id_strategy()).prop_map(|(room_id, question_id)| {
            Fact::QuestionDelete {
                room_id,
                question_id,
            }
        }),
        (
            room_id_strategy(),
            question_id_strategy(),
            prop::collection::btree_set(user_id_strategy(), 0..4),
        )
            .prop_map(|(room_id, question_id, up_votes)| Fact::QuestionUpvoteResult {
                room_id,
                question_id,
                up_votes,
                user_info: None,
            }),
    ]
}

/// A single audience action against a live room.
///
/// Index-based variants address "the `pick`-th question currently in
/// the room" so generated sequences stay meaningful as the room
/// changes; consumers resolve `pick` modulo the current question count.
#[derive(Debug, Clone)]
pub enum RoomAction {
    /// Post a new question.
    Post {
        /// Acting user.
        user_id: UserId,
        /// Id for the new question.
        question_id: QuestionId,
        /// Question body.
        question_text: String,
    },
    /// Answer the `pick`-th question.
    Answer {
        /// Index into the current question list.
        pick: usize,
        /// Answering user.
        user_id: UserId,
        /// Answer body.
        answer_text: String,
    },
    /// Toggle the voter's upvote on the `pick`-th question.
    Upvote {
        /// Index into the current question list.
        pick: usize,
        /// Voting user.
        user_id: UserId,
    },
    /// Delete the `pick`-th question.
    Delete {
        /// Index into the current question list.
        pick: usize,
    },
}

/// Strategy for generating one room action.
pub fn room_action_strategy() -> impl Strategy<Value = RoomAction> {
    prop_oneof![
        3 => (user_id_strategy(), question_id_strategy(), text_strategy()).prop_map(
            |(user_id, question_id, question_text)| RoomAction::Post {
                user_id,
                question_id,
                question_text,
            }
        ),
        2 => (any::<usize>(), user_id_strategy())
            .prop_map(|(pick, user_id)| RoomAction::Upvote { pick, user_id }),
        1 => (any::<usize>(), user_id_strategy(), text_strategy()).prop_map(
            |(pick, user_id, answer_text)| RoomAction::Answer {
                pick,
                user_id,
                answer_text,
            }
        ),
        1 => any::<usize>().prop_map(|pick| RoomAction::Delete { pick }),
    ]
}

/// Strategy for generating a sequence of room actions.
pub fn action_sequence_strategy(
    min_actions: usize,
    max_actions: usize,
) -> impl Strategy<Value = Vec<RoomAction>> {
    prop::collection::vec(room_action_strategy(), min_actions..max_actions)
}
