//! Command and fact envelopes.
//!
//! Commands travel client → relay and carry intent. Facts travel relay →
//! clients and carry authoritative post-state. `ROOM_UPDATE`, `USER_UPDATE`
//! and `QUESTION_DELETE` tags appear in both enums; the direction decides
//! which enum decodes them, so the codec itself keeps the contract honest.

use crate::error::{CodecError, CodecResult};
use crate::types::{QuestionId, QuestionInfo, RoomId, RoomInfo, RoomSnapshot, UserId, UserInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Client-originated intent, not yet authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Upsert the mutable fields of a room.
    #[serde(rename = "ROOM_UPDATE", rename_all = "camelCase")]
    RoomUpdate {
        /// Target room.
        room_id: RoomId,
        /// Replacement display name, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        /// Replacement theme color, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        theme_color: Option<String>,
    },

    /// Upsert the mutable fields of a user profile.
    #[serde(rename = "USER_UPDATE", rename_all = "camelCase")]
    UserUpdate {
        /// Target user.
        user_id: UserId,
        /// Replacement display name, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },

    /// Post a new question. The client chooses the id so its optimistic
    /// local copy and the authoritative fact line up.
    #[serde(rename = "QUESTION_POST", rename_all = "camelCase")]
    QuestionPost {
        /// Room the question belongs to.
        room_id: RoomId,
        /// Posting user; becomes the author and the first upvoter.
        user_id: UserId,
        /// Client-generated question id.
        question_id: QuestionId,
        /// The question body.
        question_text: String,
    },

    /// Record an answer. The relay stamps the timestamp and writes all
    /// three answer fields together.
    #[serde(rename = "QUESTION_ANSWER", rename_all = "camelCase")]
    QuestionAnswer {
        /// Room the question belongs to.
        room_id: RoomId,
        /// Question being answered.
        question_id: QuestionId,
        /// User recording the answer.
        answer_author: UserId,
        /// The answer body.
        answer_text: String,
    },

    /// Remove a question.
    #[serde(rename = "QUESTION_DELETE", rename_all = "camelCase")]
    QuestionDelete {
        /// Room the question belongs to.
        room_id: RoomId,
        /// Question to remove.
        question_id: QuestionId,
    },

    /// Toggle the sender's membership in a question's upvote set.
    #[serde(rename = "QUESTION_UPVOTE", rename_all = "camelCase")]
    QuestionUpvote {
        /// Room the question belongs to.
        room_id: RoomId,
        /// User whose vote toggles.
        user_id: UserId,
        /// Question being voted on.
        question_id: QuestionId,
        /// True removes the vote, false adds it. Either way the operation
        /// is idempotent on the set.
        #[serde(default)]
        remove_upvote: bool,
    },
}

impl Command {
    /// Decodes a command from its JSON wire form.
    pub fn decode(payload: &str) -> CodecResult<Self> {
        serde_json::from_str(payload).map_err(CodecError::Decode)
    }

    /// Encodes the command to its JSON wire form.
    pub fn encode(&self) -> CodecResult<String> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// The wire discriminant, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Command::RoomUpdate { .. } => "ROOM_UPDATE",
            Command::UserUpdate { .. } => "USER_UPDATE",
            Command::QuestionPost { .. } => "QUESTION_POST",
            Command::QuestionAnswer { .. } => "QUESTION_ANSWER",
            Command::QuestionDelete { .. } => "QUESTION_DELETE",
            Command::QuestionUpvote { .. } => "QUESTION_UPVOTE",
        }
    }

    /// The room this command addresses.
    #[must_use]
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Command::RoomUpdate { room_id, .. }
            | Command::QuestionPost { room_id, .. }
            | Command::QuestionAnswer { room_id, .. }
            | Command::QuestionDelete { room_id, .. }
            | Command::QuestionUpvote { room_id, .. } => Some(room_id),
            Command::UserUpdate { .. } => None,
        }
    }
}

/// Relay-emitted authoritative post-state.
///
/// Fields absent from a fact mean "keep the local value"; a fact never
/// clears an answer or rewinds a timestamp. The one non-upsert shape is
/// [`Fact::QuestionUpvoteResult`], which replaces the upvote set wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Fact {
    /// Post-state of a room's mutable fields.
    #[serde(rename = "ROOM_UPDATE", rename_all = "camelCase")]
    RoomUpdate {
        /// Affected room.
        room_id: RoomId,
        /// Current display name, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        /// Current theme color, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        theme_color: Option<String>,
    },

    /// Post-state of a user profile.
    #[serde(rename = "USER_UPDATE", rename_all = "camelCase")]
    UserUpdate {
        /// Affected user.
        user_id: UserId,
        /// Current display name, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },

    /// Upsert of question fields. Carries whichever fields the triggering
    /// command changed; a post carries the creation fields, an answer
    /// carries the answer triple.
    #[serde(rename = "QUESTION_UPDATE", rename_all = "camelCase")]
    QuestionUpdate {
        /// Room the question belongs to.
        room_id: RoomId,
        /// Affected question.
        question_id: QuestionId,
        /// Question body, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        question_text: Option<String>,
        /// Creation time, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        question_timestamp: Option<DateTime<Utc>>,
        /// Author, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        author: Option<UserId>,
        /// Answer body, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        answer_text: Option<String>,
        /// Answer time, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        answer_timestamp: Option<DateTime<Utc>>,
        /// Answerer, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        answer_author: Option<UserId>,
        /// Full upvote set, when reported.
        #[serde(skip_serializing_if = "Option::is_none")]
        up_votes: Option<BTreeSet<UserId>>,
        /// Profile of the acting user, saving receivers a lookup. Absent
        /// when the relay's auxiliary lookup failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        user_info: Option<UserInfo>,
    },

    /// A question was removed. Removal is unconditional; receivers treat an
    /// unknown id as a no-op.
    #[serde(rename = "QUESTION_DELETE", rename_all = "camelCase")]
    QuestionDelete {
        /// Room the question belonged to.
        room_id: RoomId,
        /// Removed question.
        question_id: QuestionId,
    },

    /// Authoritative upvote set after a toggle. Receivers replace their
    /// local set with this one; the relay is the single arbiter of
    /// membership.
    #[serde(rename = "QUESTION_UPVOTE_RESULT", rename_all = "camelCase")]
    QuestionUpvoteResult {
        /// Room the question belongs to.
        room_id: RoomId,
        /// Affected question.
        question_id: QuestionId,
        /// The full post-toggle membership set.
        up_votes: BTreeSet<UserId>,
        /// Profile of the voter, present only when the toggle added a vote.
        #[serde(skip_serializing_if = "Option::is_none")]
        user_info: Option<UserInfo>,
    },
}

impl Fact {
    /// Decodes a fact from its JSON wire form.
    pub fn decode(payload: &str) -> CodecResult<Self> {
        serde_json::from_str(payload).map_err(CodecError::Decode)
    }

    /// Encodes the fact to its JSON wire form.
    pub fn encode(&self) -> CodecResult<String> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }

    /// The wire discriminant, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Fact::RoomUpdate { .. } => "ROOM_UPDATE",
            Fact::UserUpdate { .. } => "USER_UPDATE",
            Fact::QuestionUpdate { .. } => "QUESTION_UPDATE",
            Fact::QuestionDelete { .. } => "QUESTION_DELETE",
            Fact::QuestionUpvoteResult { .. } => "QUESTION_UPVOTE_RESULT",
        }
    }

    /// Full post-state of a room.
    #[must_use]
    pub fn room_state(room: &RoomInfo) -> Self {
        Fact::RoomUpdate {
            room_id: room.id.clone(),
            display_name: Some(room.display_name.clone()),
            theme_color: Some(room.theme_color.clone()),
        }
    }

    /// Full post-state of a user profile.
    #[must_use]
    pub fn user_state(user: &UserInfo) -> Self {
        Fact::UserUpdate {
            user_id: user.id.clone(),
            display_name: Some(user.display_name.clone()),
        }
    }

    /// Fact describing a freshly posted question.
    #[must_use]
    pub fn question_posted(
        room_id: RoomId,
        question: &QuestionInfo,
        user_info: Option<UserInfo>,
    ) -> Self {
        Fact::QuestionUpdate {
            room_id,
            question_id: question.id.clone(),
            question_text: Some(question.question_text.clone()),
            question_timestamp: Some(question.question_timestamp),
            author: Some(question.author.clone()),
            answer_text: None,
            answer_timestamp: None,
            answer_author: None,
            up_votes: Some(question.up_votes.clone()),
            user_info,
        }
    }

    /// Fact describing a recorded answer. Carries the full answer triple
    /// and nothing else; creation fields are immutable and already known.
    #[must_use]
    pub fn question_answered(
        room_id: RoomId,
        question_id: QuestionId,
        answer_author: UserId,
        answer_text: String,
        answer_timestamp: DateTime<Utc>,
        user_info: Option<UserInfo>,
    ) -> Self {
        Fact::QuestionUpdate {
            room_id,
            question_id,
            question_text: None,
            question_timestamp: None,
            author: None,
            answer_text: Some(answer_text),
            answer_timestamp: Some(answer_timestamp),
            answer_author: Some(answer_author),
            up_votes: None,
            user_info,
        }
    }

    /// Fact carrying every field of a question. Used when seeding a client
    /// from a snapshot so seeding and live merging share one code path.
    #[must_use]
    pub fn question_full(room_id: RoomId, question: &QuestionInfo) -> Self {
        Fact::QuestionUpdate {
            room_id,
            question_id: question.id.clone(),
            question_text: Some(question.question_text.clone()),
            question_timestamp: Some(question.question_timestamp),
            author: Some(question.author.clone()),
            answer_text: question.answer_text.clone(),
            answer_timestamp: question.answer_timestamp,
            answer_author: question.answer_author.clone(),
            up_votes: Some(question.up_votes.clone()),
            user_info: None,
        }
    }
}

impl RoomSnapshot {
    /// Replays the snapshot as the sequence of facts a client would have
    /// merged had it watched the room from the start: the room record, then
    /// every referenced user, then every question in full.
    #[must_use]
    pub fn seed_facts(&self) -> Vec<Fact> {
        let mut facts = Vec::with_capacity(1 + self.users.len() + self.questions.len());
        facts.push(Fact::room_state(&self.room));
        for user in &self.users {
            facts.push(Fact::user_state(user));
        }
        for question in &self.questions {
            facts.push(Fact::question_full(self.room.id.clone(), question));
        }
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 5, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn decodes_question_post_command() {
        let payload = r#"{
            "type": "QUESTION_POST",
            "roomId": "foo",
            "userId": "jappleseed",
            "questionId": "a1b2c3d4e5f60718",
            "questionText": "What is your favorite color?"
        }"#;
        let cmd = Command::decode(payload).unwrap();
        assert_eq!(
            cmd,
            Command::QuestionPost {
                room_id: "foo".into(),
                user_id: "jappleseed".into(),
                question_id: "a1b2c3d4e5f60718".into(),
                question_text: "What is your favorite color?".to_owned(),
            }
        );
        assert_eq!(cmd.kind(), "QUESTION_POST");
        assert_eq!(cmd.room_id(), Some(&"foo".into()));
    }

    #[test]
    fn upvote_command_defaults_to_adding() {
        let payload = r#"{
            "type": "QUESTION_UPVOTE",
            "roomId": "foo",
            "userId": "prabbit",
            "questionId": "a1b2c3d4e5f60718"
        }"#;
        match Command::decode(payload).unwrap() {
            Command::QuestionUpvote { remove_upvote, .. } => assert!(!remove_upvote),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Command::decode(r#"{"type":"QUESTION_EXPLODE","roomId":"foo"}"#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(Command::decode("{nope").unwrap_err().is_decode());
        assert!(Fact::decode("42").unwrap_err().is_decode());
    }

    #[test]
    fn commands_do_not_decode_as_facts() {
        let post = r#"{"type":"QUESTION_POST","roomId":"foo","userId":"u",
                       "questionId":"q","questionText":"t"}"#;
        assert!(Fact::decode(post).is_err());
        let result = r#"{"type":"QUESTION_UPVOTE_RESULT","roomId":"foo",
                         "questionId":"q","upVotes":[]}"#;
        assert!(Command::decode(result).is_err());
    }

    #[test]
    fn partial_room_fact_keeps_absent_fields_absent() {
        let fact = Fact::RoomUpdate {
            room_id: "foo".into(),
            display_name: Some("Foo Room".to_owned()),
            theme_color: None,
        };
        let json: serde_json::Value = serde_json::from_str(&fact.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "ROOM_UPDATE");
        assert_eq!(json["displayName"], "Foo Room");
        assert!(json.get("themeColor").is_none());
    }

    #[test]
    fn answered_fact_carries_only_the_answer_triple() {
        let fact = Fact::question_answered(
            "foo".into(),
            "a1b2".into(),
            "jappleseed".into(),
            "42".to_owned(),
            t0(),
            Some(UserInfo::new("jappleseed", "Johnny Appleseed")),
        );
        let json: serde_json::Value = serde_json::from_str(&fact.encode().unwrap()).unwrap();
        assert_eq!(json["answerText"], "42");
        assert_eq!(json["answerAuthor"], "jappleseed");
        assert_eq!(json["answerTimestamp"], "2022-05-29T12:00:00Z");
        assert_eq!(json["userInfo"]["displayName"], "Johnny Appleseed");
        assert!(json.get("questionText").is_none());
        assert!(json.get("upVotes").is_none());
    }

    #[test]
    fn decodes_upvote_result_fact() {
        let payload = r#"{
            "type": "QUESTION_UPVOTE_RESULT",
            "roomId": "foo",
            "questionId": "a1b2",
            "upVotes": ["jappleseed", "prabbit"],
            "userInfo": {"id": "prabbit", "displayName": "Peter Rabbit"}
        }"#;
        match Fact::decode(payload).unwrap() {
            Fact::QuestionUpvoteResult {
                up_votes,
                user_info,
                ..
            } => {
                assert_eq!(up_votes.len(), 2);
                assert!(up_votes.contains(&UserId::new("prabbit")));
                assert_eq!(user_info.unwrap().display_name, "Peter Rabbit");
            }
            other => panic!("unexpected fact: {other:?}"),
        }
    }

    #[test]
    fn seed_facts_puts_room_first_then_users_then_questions() {
        let snapshot = RoomSnapshot {
            room: RoomInfo::new("foo", "Foo Room", "#038cfc"),
            questions: vec![QuestionInfo::posted("a1b2", "jappleseed", "Why?", t0())],
            users: vec![UserInfo::new("jappleseed", "Johnny Appleseed")],
        };
        let facts = snapshot.seed_facts();
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].kind(), "ROOM_UPDATE");
        assert_eq!(facts[1].kind(), "USER_UPDATE");
        assert_eq!(facts[2].kind(), "QUESTION_UPDATE");
        match &facts[2] {
            Fact::QuestionUpdate {
                question_text,
                up_votes,
                answer_text,
                ..
            } => {
                assert_eq!(question_text.as_deref(), Some("Why?"));
                assert_eq!(up_votes.as_ref().unwrap().len(), 1);
                assert!(answer_text.is_none());
            }
            other => panic!("unexpected fact: {other:?}"),
        }
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let payload = r#"{
            "type": "QUESTION_DELETE",
            "roomId": "foo",
            "questionId": "a1b2",
            "legacyField": true
        }"#;
        assert!(Command::decode(payload).is_ok());
        assert!(Fact::decode(payload).is_ok());
    }

    proptest! {
        /// Decoding never panics, whatever arrives on the wire.
        #[test]
        fn decode_is_total(payload in ".{0,256}") {
            let _ = Command::decode(&payload);
            let _ = Fact::decode(&payload);
        }
    }
}
