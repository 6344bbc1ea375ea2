//! Per-command handling.

use crate::config::RelayConfig;
use crate::error::RelayResult;
use crate::subscriptions::SubscriptionRegistry;
use chrono::Utc;
use plenum_protocol::{Command, Fact, RoomPatch, UserId, UserInfo, UserPatch};
use plenum_store::{QuestionPatch, Store};
use std::sync::Arc;
use tracing::debug;

/// Shared state for command handling.
pub struct RelayContext {
    /// Relay configuration.
    pub config: RelayConfig,
    /// The canonical entity store (shared across all connections).
    pub store: Arc<dyn Store>,
    /// Channel subscription bookkeeping.
    pub subscriptions: SubscriptionRegistry,
}

impl RelayContext {
    /// Creates a new relay context.
    #[must_use]
    pub fn new(config: RelayConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store,
            subscriptions: SubscriptionRegistry::new(),
        }
    }
}

/// Turns one command into its authoritative fact.
///
/// Every handler follows the same shape: apply the store mutation, look up
/// whatever auxiliary user info the fact should carry, and build the fact
/// from post-mutation state. Store errors bubble to the receive loop, which
/// logs and skips the command; auxiliary lookup misses never fail the
/// command, the fact just goes out without user info.
pub struct CommandHandler {
    context: Arc<RelayContext>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(context: Arc<RelayContext>) -> Self {
        Self { context }
    }

    /// Applies `command` to the store and returns the fact to broadcast.
    pub fn handle(&self, command: Command) -> RelayResult<Fact> {
        debug!(kind = command.kind(), "applying command");
        match command {
            Command::RoomUpdate {
                room_id,
                display_name,
                theme_color,
            } => {
                let patch = RoomPatch {
                    display_name,
                    theme_color,
                };
                let room = self.context.store.update_room_info(&room_id, &patch)?;
                Ok(Fact::room_state(&room))
            }

            Command::UserUpdate {
                user_id,
                display_name,
            } => {
                let patch = UserPatch { display_name };
                let user = self.context.store.update_user_info(&user_id, &patch)?;
                Ok(Fact::user_state(&user))
            }

            Command::QuestionPost {
                room_id,
                user_id,
                question_id,
                question_text,
            } => {
                let question = self.context.store.add_question(
                    &room_id,
                    &user_id,
                    &question_id,
                    &question_text,
                )?;
                let user_info = self.lookup_user(&user_id);
                Ok(Fact::question_posted(room_id, &question, user_info))
            }

            Command::QuestionAnswer {
                room_id,
                question_id,
                answer_author,
                answer_text,
            } => {
                // The timestamp is stamped here and written together with
                // text and author in one store call; a question can never
                // gain a timestamp without its text.
                let answered_at = Utc::now();
                let patch =
                    QuestionPatch::answer(answer_author.clone(), answer_text.clone(), answered_at);
                self.context
                    .store
                    .update_question(&room_id, &question_id, &patch)?;
                let user_info = self.lookup_user(&answer_author);
                Ok(Fact::question_answered(
                    room_id,
                    question_id,
                    answer_author,
                    answer_text,
                    answered_at,
                    user_info,
                ))
            }

            Command::QuestionDelete {
                room_id,
                question_id,
            } => {
                self.context.store.delete_question(&room_id, &question_id)?;
                Ok(Fact::QuestionDelete {
                    room_id,
                    question_id,
                })
            }

            Command::QuestionUpvote {
                room_id,
                user_id,
                question_id,
                remove_upvote,
            } => {
                let question = self.context.store.toggle_upvote(
                    &room_id,
                    &user_id,
                    &question_id,
                    remove_upvote,
                )?;
                // Receivers only need the voter's profile when a vote
                // appears; a removal changes no displayed name.
                let user_info = if remove_upvote {
                    None
                } else {
                    self.lookup_user(&user_id)
                };
                Ok(Fact::QuestionUpvoteResult {
                    room_id,
                    question_id,
                    up_votes: question.up_votes,
                    user_info,
                })
            }
        }
    }

    /// Auxiliary profile lookup for outbound facts. Misses are expected
    /// (users exist lazily) and never fail the command.
    fn lookup_user(&self, user_id: &UserId) -> Option<UserInfo> {
        match self.context.store.get_user(user_id) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(user = %user_id, %err, "fact will carry no user info");
                None
            }
        }
    }
}
