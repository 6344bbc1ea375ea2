//! Entity records shared by the relay, the store, and client projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique key of a room. Chosen by the creator, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique key of a user, doubling as the visible username.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique key of a question within its room. Random hex token, see
/// [`crate::generate_question_id`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a question id from a raw string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for QuestionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A room record: id plus the two host-editable presentation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Immutable room key.
    pub id: RoomId,
    /// Human-readable room name.
    pub display_name: String,
    /// Arbitrary color token used by presentation layers.
    pub theme_color: String,
}

impl RoomInfo {
    /// Creates a room record with explicit presentation fields.
    #[must_use]
    pub fn new(
        id: impl Into<RoomId>,
        display_name: impl Into<String>,
        theme_color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            theme_color: theme_color.into(),
        }
    }

    /// Placeholder used when a merge references a room nobody has described
    /// yet. The real fields arrive with the next authoritative update.
    #[must_use]
    pub fn placeholder(id: impl Into<RoomId>) -> Self {
        let id = id.into();
        let display_name = format!("New Room: {id}");
        Self {
            id,
            display_name,
            theme_color: "#".to_owned(),
        }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &RoomPatch) {
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(theme_color) = &patch.theme_color {
            self.theme_color = theme_color.clone();
        }
    }
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Immutable user key.
    pub id: UserId,
    /// Human-readable name shown next to questions and answers.
    pub display_name: String,
}

impl UserInfo {
    /// Creates a user record.
    #[must_use]
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Placeholder for a user referenced before any profile was seen; the
    /// username stands in for the display name.
    #[must_use]
    pub fn placeholder(id: impl Into<UserId>) -> Self {
        let id = id.into();
        let display_name = id.as_str().to_owned();
        Self { id, display_name }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
    }
}

/// A question record.
///
/// `question_text`, `question_timestamp` and `author` never change after
/// creation. The three answer fields start null and are written together by
/// an answer action; a question counts as answered iff `answer_timestamp` is
/// set. Upvotes are a membership set, mutated only by wholesale replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInfo {
    /// Immutable question key, unique within the room.
    pub id: QuestionId,
    /// The question as posted.
    pub question_text: String,
    /// Creation time, assigned by whoever created the record.
    pub question_timestamp: DateTime<Utc>,
    /// User id of the poster.
    pub author: UserId,
    /// Answer body, null until answered.
    pub answer_text: Option<String>,
    /// Answer time, null until answered.
    pub answer_timestamp: Option<DateTime<Utc>>,
    /// User id of the answerer, null until answered.
    pub answer_author: Option<UserId>,
    /// User ids that currently upvote this question.
    pub up_votes: BTreeSet<UserId>,
}

impl QuestionInfo {
    /// Creates a freshly posted question. The author's own upvote seeds the
    /// set, matching what the relay persists on `QUESTION_POST`.
    #[must_use]
    pub fn posted(
        id: impl Into<QuestionId>,
        author: impl Into<UserId>,
        question_text: impl Into<String>,
        question_timestamp: DateTime<Utc>,
    ) -> Self {
        let author = author.into();
        let up_votes = BTreeSet::from([author.clone()]);
        Self {
            id: id.into(),
            question_text: question_text.into(),
            question_timestamp,
            author,
            answer_text: None,
            answer_timestamp: None,
            answer_author: None,
            up_votes,
        }
    }

    /// Placeholder for a question referenced before its post fact was seen.
    #[must_use]
    pub fn placeholder(id: impl Into<QuestionId>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            question_text: String::new(),
            question_timestamp: now,
            author: UserId::new(""),
            answer_text: None,
            answer_timestamp: None,
            answer_author: None,
            up_votes: BTreeSet::new(),
        }
    }

    /// True once an answer has been recorded.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer_timestamp.is_some()
    }

    /// Number of distinct upvoters.
    #[must_use]
    pub fn vote_count(&self) -> usize {
        self.up_votes.len()
    }
}

/// Point-in-time read of one room: its record, every question, and every
/// referenced user the store knows about. Used only to seed a joining client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// The room record.
    pub room: RoomInfo,
    /// All questions currently in the room.
    pub questions: Vec<QuestionInfo>,
    /// Users referenced as author, answerer or upvoter.
    pub users: Vec<UserInfo>,
}

/// Partial update of a room's mutable fields. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    /// Replacement display name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Replacement theme color, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

impl RoomPatch {
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

    /// True when the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.theme_color.is_none()
    }
}

/// Partial update of a user's mutable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// Replacement display name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserPatch {
    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// True when the patch carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
    }
}
