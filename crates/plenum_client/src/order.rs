//! Canonical question display order.
//!
//! A pure function of the full question list, recomputed on every render;
//! no rank is ever stored. Answered questions come first, then more
//! upvotes, then earlier post time. Equal keys fall back to the question
//! id so two clients holding the same set render the same order.

use plenum_protocol::QuestionInfo;
use std::cmp::Ordering;

/// Compares two questions by display priority.
#[must_use]
pub fn compare_questions(a: &QuestionInfo, b: &QuestionInfo) -> Ordering {
    b.is_answered()
        .cmp(&a.is_answered())
        .then_with(|| b.vote_count().cmp(&a.vote_count()))
        .then_with(|| a.question_timestamp.cmp(&b.question_timestamp))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts references to `questions` into canonical display order.
#[must_use]
pub fn canonical_order<'a>(
    questions: impl IntoIterator<Item = &'a QuestionInfo>,
) -> Vec<&'a QuestionInfo> {
    let mut ordered: Vec<&QuestionInfo> = questions.into_iter().collect();
    ordered.sort_by(|a, b| compare_questions(a, b));
    ordered
}
