//! The room session: join lifecycle, optimistic actions, fact pump.

use crate::bootstrap::SetupPrompts;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::projection::Projection;
use crate::state::SessionState;
use crate::transport::{ChannelFactory, RoomChannel};
use chrono::Utc;
use plenum_protocol::{
    generate_question_id, Command, Fact, QuestionId, QuestionInfo, RoomId, RoomPatch, UserId,
};
use plenum_store::Store;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct PendingCommand {
    epoch: u64,
    command: Command,
}

/// One client's membership in one room at a time.
///
/// The session is single-consumer: one logical thread calls its methods,
/// so local state needs no locking. The host drives [`Session::tick`] at
/// the configured cadence; everything else happens inside the calling
/// thread's dispatch.
///
/// All state changes flow through the projection's fact merge, the
/// session's own optimistic ones included. An optimistic apply is always
/// paired with the command send; if the session is not live the action is
/// rejected before any local mutation.
pub struct Session<F: ChannelFactory, P: SetupPrompts> {
    config: SessionConfig,
    store: Arc<dyn Store>,
    factory: F,
    prompts: P,
    state: SessionState,
    projection: Projection,
    channel: Option<Box<dyn RoomChannel>>,
    queue: VecDeque<PendingCommand>,
    epoch: u64,
}

impl<F: ChannelFactory, P: SetupPrompts> Session<F, P> {
    /// Creates a disconnected session.
    pub fn new(config: SessionConfig, store: Arc<dyn Store>, factory: F, prompts: P) -> Self {
        Self {
            config,
            store,
            factory,
            prompts,
            state: SessionState::Disconnected,
            projection: Projection::new(),
            channel: None,
            queue: VecDeque::new(),
            epoch: 0,
        }
    }

    /// The session's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Read access to the local room state.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The session's configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Starts joining `room_id`, running setup prompts as needed.
    ///
    /// If no identity is set yet, the enter-user-info prompt runs first; a
    /// display name entered there is announced once the session is live.
    /// If the room does not exist, the create-room prompt runs and the
    /// room is created in the store. Either prompt cancelling abandons the
    /// join with [`SessionError::SetupCancelled`] and the session stays
    /// disconnected.
    ///
    /// On success the channel is opening and the session is `Connecting`;
    /// [`Session::tick`] carries it to `Live`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidState`] unless currently disconnected, plus
    /// store and channel failures from the join itself. A create-room race
    /// surfaces the store's `AlreadyExists`.
    pub fn enter_room(&mut self, room_id: &RoomId, as_host: bool) -> SessionResult<()> {
        if self.state.is_torn_down() {
            return Err(SessionError::TornDown);
        }
        if !self.state.can_enter_room() {
            return Err(SessionError::InvalidState {
                operation: "enter a room",
                state: self.state,
            });
        }

        if self.projection.current_user().is_none() {
            let Some(draft) = self.prompts.enter_user_info() else {
                debug!("user info prompt cancelled, join abandoned");
                return Err(SessionError::SetupCancelled);
            };
            self.projection.set_current_user(draft.user_id.clone());
            if let Some(display_name) = draft.display_name {
                self.queue.push_back(PendingCommand {
                    epoch: self.epoch,
                    command: Command::UserUpdate {
                        user_id: draft.user_id,
                        display_name: Some(display_name),
                    },
                });
            }
        }

        match self.store.get_room(room_id) {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                let Some(draft) = self.prompts.create_room(room_id) else {
                    debug!(room = %room_id, "create-room prompt cancelled, join abandoned");
                    return Err(SessionError::SetupCancelled);
                };
                self.store.create_room(
                    room_id,
                    draft.display_name.as_deref(),
                    draft.theme_color.as_deref(),
                )?;
                info!(room = %room_id, "room created");
            }
            Err(err) => return Err(err.into()),
        }

        self.channel = Some(self.factory.open_channel(room_id)?);
        self.projection.enter(room_id.clone(), as_host);
        self.set_state(SessionState::Connecting);
        Ok(())
    }

    /// Advances the session one step.
    ///
    /// While connecting or reconnecting this polls (and if necessary
    /// reopens) the channel; once it reports open, the seeding snapshot is
    /// fetched and applied through the ordinary merge path and the session
    /// goes live. While live it drains inbound facts, merges them, and
    /// dispatches queued commands. A lost channel drops the session back
    /// to `Reconnecting`, and the next successful poll re-seeds from a
    /// fresh snapshot.
    ///
    /// # Errors
    ///
    /// [`SessionError::TornDown`] after teardown. Transient failures
    /// (snapshot fetch, channel reopen) are logged and retried on later
    /// ticks rather than surfaced.
    pub fn tick(&mut self) -> SessionResult<()> {
        match self.state {
            SessionState::TornDown => Err(SessionError::TornDown),
            SessionState::Disconnected => Ok(()),
            SessionState::Connecting | SessionState::Reconnecting => self.poll_channel(),
            SessionState::SnapshotLoading => self.load_snapshot(),
            SessionState::Live => self.pump_live(),
        }
    }

    /// Posts a question and returns its locally generated id.
    ///
    /// The question appears in the projection immediately, seeded with the
    /// poster's own upvote; the relay's authoritative fact later lands
    /// through the same merge.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live with an open channel.
    pub fn post_question(&mut self, question_text: impl Into<String>) -> SessionResult<QuestionId> {
        let (room_id, user_id) = self.ensure_live()?;
        let question =
            QuestionInfo::posted(generate_question_id(), user_id, question_text, Utc::now());
        let question_id = question.id.clone();
        let command = Command::QuestionPost {
            room_id: room_id.clone(),
            user_id: question.author.clone(),
            question_id: question_id.clone(),
            question_text: question.question_text.clone(),
        };
        self.projection
            .apply_fact(Fact::question_posted(room_id, &question, None));
        self.send_command(&command)?;
        Ok(question_id)
    }

    /// Records an answer to `question_id`, authored by this session's
    /// user.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live;
    /// [`SessionError::UnknownQuestion`] if the projection does not hold
    /// the question.
    pub fn answer_question(
        &mut self,
        question_id: &QuestionId,
        answer_text: impl Into<String>,
    ) -> SessionResult<()> {
        let (room_id, user_id) = self.ensure_live()?;
        if self.projection.question(question_id).is_none() {
            return Err(SessionError::UnknownQuestion {
                id: question_id.clone(),
            });
        }
        let answer_text = answer_text.into();
        let command = Command::QuestionAnswer {
            room_id: room_id.clone(),
            question_id: question_id.clone(),
            answer_author: user_id.clone(),
            answer_text: answer_text.clone(),
        };
        // The optimistic timestamp is provisional; the relay's stamp in
        // the authoritative fact supersedes it.
        self.projection.apply_fact(Fact::question_answered(
            room_id,
            question_id.clone(),
            user_id,
            answer_text,
            Utc::now(),
            None,
        ));
        self.send_command(&command)
    }

    /// Requests deletion of `question_id`.
    ///
    /// The removal is not applied optimistically; it lands as the
    /// authoritative delete fact.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live.
    pub fn delete_question(&mut self, question_id: &QuestionId) -> SessionResult<()> {
        let (room_id, _) = self.ensure_live()?;
        self.send_command(&Command::QuestionDelete {
            room_id,
            question_id: question_id.clone(),
        })
    }

    /// Toggles this user's upvote on `question_id`. Returns `true` when
    /// the toggle added the vote.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live;
    /// [`SessionError::UnknownQuestion`] if the projection does not hold
    /// the question.
    pub fn toggle_upvote(&mut self, question_id: &QuestionId) -> SessionResult<bool> {
        let (room_id, user_id) = self.ensure_live()?;
        let Some(question) = self.projection.question(question_id) else {
            return Err(SessionError::UnknownQuestion {
                id: question_id.clone(),
            });
        };
        let remove_upvote = question.up_votes.contains(&user_id);
        let mut up_votes = question.up_votes.clone();
        if remove_upvote {
            up_votes.remove(&user_id);
        } else {
            up_votes.insert(user_id.clone());
        }
        self.projection.apply_fact(Fact::QuestionUpvoteResult {
            room_id: room_id.clone(),
            question_id: question_id.clone(),
            up_votes,
            user_info: None,
        });
        self.send_command(&Command::QuestionUpvote {
            room_id,
            user_id,
            question_id: question_id.clone(),
            remove_upvote,
        })?;
        Ok(!remove_upvote)
    }

    /// Edits the current room's display name or theme color.
    ///
    /// An empty patch does nothing.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live.
    pub fn update_room_info(&mut self, patch: &RoomPatch) -> SessionResult<()> {
        let (room_id, _) = self.ensure_live()?;
        if patch.is_empty() {
            return Ok(());
        }
        self.projection.apply_fact(Fact::RoomUpdate {
            room_id: room_id.clone(),
            display_name: patch.display_name.clone(),
            theme_color: patch.theme_color.clone(),
        });
        self.send_command(&Command::RoomUpdate {
            room_id,
            display_name: patch.display_name.clone(),
            theme_color: patch.theme_color.clone(),
        })
    }

    /// Changes this user's display name.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotConnected`] unless live.
    pub fn update_user_info(&mut self, display_name: impl Into<String>) -> SessionResult<()> {
        let (_, user_id) = self.ensure_live()?;
        let display_name = display_name.into();
        self.projection.apply_fact(Fact::UserUpdate {
            user_id: user_id.clone(),
            display_name: Some(display_name.clone()),
        });
        self.send_command(&Command::UserUpdate {
            user_id,
            display_name: Some(display_name),
        })
    }

    /// Leaves the current room.
    ///
    /// Question state is discarded and the host flag cleared; the identity
    /// and the cross-room caches survive for the next join. In-flight work
    /// from this membership is cancelled. A no-op when not in a room.
    ///
    /// # Errors
    ///
    /// [`SessionError::TornDown`] after teardown.
    pub fn leave_room(&mut self) -> SessionResult<()> {
        if self.state.is_torn_down() {
            return Err(SessionError::TornDown);
        }
        if !self.state.is_in_room() {
            return Ok(());
        }
        self.epoch += 1;
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
        self.projection.leave();
        self.set_state(SessionState::Disconnected);
        info!("left room");
        Ok(())
    }

    /// Shuts the session down for good. Idempotent; every later operation
    /// fails with [`SessionError::TornDown`].
    pub fn teardown(&mut self) {
        if self.state.is_torn_down() {
            return;
        }
        self.epoch += 1;
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
        self.projection.leave();
        self.set_state(SessionState::TornDown);
        info!("session torn down");
    }

    fn set_state(&mut self, state: SessionState) {
        debug!(from = ?self.state, to = ?state, "session state change");
        self.state = state;
    }

    fn channel_open(&self) -> bool {
        self.channel.as_ref().is_some_and(|channel| channel.is_open())
    }

    fn ensure_live(&self) -> SessionResult<(RoomId, UserId)> {
        if self.state.is_torn_down() {
            return Err(SessionError::TornDown);
        }
        if !self.state.is_live() || !self.channel_open() {
            return Err(SessionError::NotConnected);
        }
        match (self.projection.current_room(), self.projection.current_user()) {
            (Some(room_id), Some(user_id)) => Ok((room_id.clone(), user_id.clone())),
            _ => Err(SessionError::NotConnected),
        }
    }

    fn send_command(&mut self, command: &Command) -> SessionResult<()> {
        let payload = command.encode()?;
        let Some(channel) = self.channel.as_mut() else {
            return Err(SessionError::NotConnected);
        };
        channel.send(&payload)
    }

    fn poll_channel(&mut self) -> SessionResult<()> {
        if !self.channel_open() {
            if self.channel.is_none() {
                let Some(room_id) = self.projection.current_room().cloned() else {
                    return Ok(());
                };
                match self.factory.open_channel(&room_id) {
                    Ok(channel) => self.channel = Some(channel),
                    Err(err) => {
                        warn!(room = %room_id, %err, "channel reopen failed, will retry");
                        return Ok(());
                    }
                }
            }
            if !self.channel_open() {
                return Ok(());
            }
        }
        self.set_state(SessionState::SnapshotLoading);
        self.load_snapshot()
    }

    fn load_snapshot(&mut self) -> SessionResult<()> {
        let Some(room_id) = self.projection.current_room().cloned() else {
            return Ok(());
        };
        let snapshot = match self.store.get_room_snapshot(&room_id) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(room = %room_id, %err, "snapshot fetch failed, will retry");
                return Ok(());
            }
        };
        // Seeding replays the snapshot as facts, so joining and live
        // merging share one code path.
        self.projection.forget_questions();
        for fact in snapshot.seed_facts() {
            self.projection.apply_fact(fact);
        }
        self.set_state(SessionState::Live);
        info!(
            room = %room_id,
            questions = self.projection.question_count(),
            "session live"
        );
        self.drain_queue();
        Ok(())
    }

    fn pump_live(&mut self) -> SessionResult<()> {
        if !self.channel_open() {
            warn!("room channel lost, reconnecting");
            self.channel = None;
            self.set_state(SessionState::Reconnecting);
            return Ok(());
        }
        if let Some(channel) = self.channel.as_mut() {
            while let Some(payload) = channel.try_recv() {
                match Fact::decode(&payload) {
                    Ok(fact) => self.projection.apply_fact(fact),
                    Err(err) => debug!(%err, "dropping malformed fact"),
                }
            }
        }
        self.drain_queue();
        Ok(())
    }

    fn drain_queue(&mut self) {
        while let Some(pending) = self.queue.pop_front() {
            if pending.epoch != self.epoch {
                debug!(
                    kind = pending.command.kind(),
                    "dropping queued command from a cancelled membership"
                );
                continue;
            }
            if let Err(err) = self.send_command(&pending.command) {
                warn!(%err, "queued command not sent, keeping it for the next tick");
                self.queue.push_front(pending);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::{MockPrompts, RoomDraft, UserDraft};
    use crate::transport::MockFactory;
    use plenum_store::InMemoryStore;

    fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .create_room(&RoomId::new("foo"), Some("Foo Room"), Some("#038cfc"))
            .unwrap();
        store
            .add_question(
                &RoomId::new("foo"),
                &UserId::new("prabbit"),
                &QuestionId::new("140ca1af98094469"),
                "How's the weather?",
            )
            .unwrap();
        store
    }

    fn jappleseed_prompts() -> Arc<MockPrompts> {
        Arc::new(
            MockPrompts::new()
                .with_user(UserDraft::new("jappleseed").with_display_name("Johnny Appleseed")),
        )
    }

    type TestSession = Session<Arc<MockFactory>, Arc<MockPrompts>>;

    fn session_over(store: Arc<InMemoryStore>) -> (TestSession, Arc<MockFactory>, Arc<MockPrompts>) {
        let factory = Arc::new(MockFactory::new());
        let prompts = jappleseed_prompts();
        let session = Session::new(
            SessionConfig::default(),
            store,
            Arc::clone(&factory),
            Arc::clone(&prompts),
        );
        (session, factory, prompts)
    }

    fn live_session() -> (TestSession, Arc<MockFactory>) {
        let (mut session, factory, _) = session_over(seeded_store());
        session.enter_room(&RoomId::new("foo"), false).unwrap();
        session.tick().unwrap();
        assert_eq!(session.state(), SessionState::Live);
        (session, factory)
    }

    fn sent_kinds(factory: &MockFactory) -> Vec<String> {
        factory
            .last_handle()
            .unwrap()
            .sent()
            .iter()
            .map(|payload| Command::decode(payload).unwrap().kind().to_owned())
            .collect()
    }

    #[test]
    fn cancelled_user_prompt_unwinds_the_join() {
        let factory = Arc::new(MockFactory::new());
        let prompts = Arc::new(MockPrompts::new());
        let mut session = Session::new(
            SessionConfig::default(),
            seeded_store() as Arc<dyn Store>,
            Arc::clone(&factory),
            Arc::clone(&prompts),
        );
        let err = session.enter_room(&RoomId::new("foo"), false).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(prompts.user_prompt_count(), 1);
        assert_eq!(factory.open_count(), 0);
    }

    #[test]
    fn join_reaches_live_and_seeds_from_the_snapshot() {
        let (mut session, factory, _) = session_over(seeded_store());
        session.enter_room(&RoomId::new("foo"), true).unwrap();
        assert_eq!(session.state(), SessionState::Connecting);

        session.tick().unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert!(session.projection().is_host());
        assert_eq!(
            session.projection().room_info().unwrap().display_name,
            "Foo Room"
        );
        assert_eq!(session.projection().question_count(), 1);
        // The display name entered at the prompt was announced.
        assert_eq!(sent_kinds(&factory), vec!["USER_UPDATE".to_owned()]);
    }

    #[test]
    fn missing_room_runs_the_create_flow() {
        let store = Arc::new(InMemoryStore::new());
        let factory = Arc::new(MockFactory::new());
        let prompts = Arc::new(
            MockPrompts::new()
                .with_user(UserDraft::new("jappleseed"))
                .with_room(RoomDraft::default().with_display_name("Fresh Room")),
        );
        let mut session = Session::new(
            SessionConfig::default(),
            Arc::clone(&store) as Arc<dyn Store>,
            factory,
            Arc::clone(&prompts),
        );
        session.enter_room(&RoomId::new("fresh"), true).unwrap();
        assert_eq!(prompts.room_prompt_count(), 1);
        assert_eq!(
            store.get_room(&RoomId::new("fresh")).unwrap().display_name,
            "Fresh Room"
        );
    }

    #[test]
    fn cancelled_create_prompt_leaves_no_room_behind() {
        let store = Arc::new(InMemoryStore::new());
        let (mut session, _, _) = session_over(Arc::clone(&store));
        let err = session.enter_room(&RoomId::new("fresh"), true).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(store.get_room(&RoomId::new("fresh")).is_err());
    }

    #[test]
    fn identity_survives_leaving_so_the_prompt_runs_once() {
        let (mut session, _, prompts) = session_over(seeded_store());
        session.enter_room(&RoomId::new("foo"), false).unwrap();
        session.leave_room().unwrap();
        session.enter_room(&RoomId::new("foo"), false).unwrap();
        assert_eq!(prompts.user_prompt_count(), 1);
    }

    #[test]
    fn actions_are_rejected_unless_live() {
        let (mut session, _, _) = session_over(seeded_store());
        assert!(session.post_question("too early").unwrap_err().is_not_connected());

        session.enter_room(&RoomId::new("foo"), false).unwrap();
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session
            .toggle_upvote(&QuestionId::new("140ca1af98094469"))
            .unwrap_err()
            .is_not_connected());
    }

    #[test]
    fn post_applies_optimistically_and_sends_the_command() {
        let (mut session, factory) = live_session();
        let question_id = session.post_question("When will be the next event?").unwrap();

        let question = session.projection().question(&question_id).unwrap();
        assert_eq!(question.question_text, "When will be the next event?");
        assert_eq!(question.up_votes, [UserId::new("jappleseed")].into());

        let sent = factory.last_handle().unwrap().sent();
        match Command::decode(sent.last().unwrap()).unwrap() {
            Command::QuestionPost {
                question_id: sent_id,
                user_id,
                ..
            } => {
                assert_eq!(sent_id, question_id);
                assert_eq!(user_id, UserId::new("jappleseed"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn upvote_toggle_flips_membership_both_ways() {
        let (mut session, factory) = live_session();
        let question_id = QuestionId::new("140ca1af98094469");

        assert!(session.toggle_upvote(&question_id).unwrap());
        assert!(session
            .projection()
            .question(&question_id)
            .unwrap()
            .up_votes
            .contains(&UserId::new("jappleseed")));

        assert!(!session.toggle_upvote(&question_id).unwrap());
        assert!(!session
            .projection()
            .question(&question_id)
            .unwrap()
            .up_votes
            .contains(&UserId::new("jappleseed")));

        let sent = factory.last_handle().unwrap().sent();
        let toggles: Vec<bool> = sent
            .iter()
            .filter_map(|payload| match Command::decode(payload) {
                Ok(Command::QuestionUpvote { remove_upvote, .. }) => Some(remove_upvote),
                _ => None,
            })
            .collect();
        assert_eq!(toggles, vec![false, true]);
    }

    #[test]
    fn delete_waits_for_the_authoritative_fact() {
        let (mut session, factory) = live_session();
        let question_id = QuestionId::new("140ca1af98094469");

        session.delete_question(&question_id).unwrap();
        assert!(session.projection().question(&question_id).is_some());

        let handle = factory.last_handle().unwrap();
        handle.push_fact(
            Fact::QuestionDelete {
                room_id: RoomId::new("foo"),
                question_id: question_id.clone(),
            }
            .encode()
            .unwrap(),
        );
        session.tick().unwrap();
        assert!(session.projection().question(&question_id).is_none());
    }

    #[test]
    fn inbound_facts_merge_on_tick() {
        let (mut session, factory) = live_session();
        let handle = factory.last_handle().unwrap();
        handle.push_fact(
            Fact::UserUpdate {
                user_id: UserId::new("prabbit"),
                display_name: Some("Peter Rabbit".to_owned()),
            }
            .encode()
            .unwrap(),
        );
        handle.push_fact("not a fact at all");
        session.tick().unwrap();
        assert_eq!(
            session
                .projection()
                .known_user(&UserId::new("prabbit"))
                .unwrap()
                .display_name,
            "Peter Rabbit"
        );
    }

    #[test]
    fn lost_channel_reconnects_and_reseeds() {
        let (mut session, factory) = live_session();
        let store_question = QuestionId::new("64fc25ad1f71466a");

        // The relay applies a command from elsewhere while we are down.
        factory.last_handle().unwrap().set_open(false);
        session
            .store
            .add_question(
                &RoomId::new("foo"),
                &UserId::new("prabbit"),
                &store_question,
                "Posted while away",
            )
            .unwrap();

        session.tick().unwrap();
        assert_eq!(session.state(), SessionState::Reconnecting);

        session.tick().unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert_eq!(factory.open_count(), 2);
        // Re-seeded from a fresh snapshot, missed change included.
        assert_eq!(session.projection().question_count(), 2);
        assert!(session.projection().question(&store_question).is_some());
    }

    #[test]
    fn stale_queued_commands_are_dropped_at_dispatch() {
        let (mut session, factory, _) = session_over(seeded_store());
        factory.connect_on_open(false);

        // First membership queues the display-name announcement but never
        // goes live.
        session.enter_room(&RoomId::new("foo"), false).unwrap();
        session.leave_room().unwrap();

        session.enter_room(&RoomId::new("foo"), false).unwrap();
        factory.last_handle().unwrap().set_open(true);
        session.tick().unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert!(sent_kinds(&factory).is_empty());
    }

    #[test]
    fn empty_room_patch_sends_nothing() {
        let (mut session, factory) = live_session();
        let before = factory.last_handle().unwrap().sent().len();
        session.update_room_info(&RoomPatch::default()).unwrap();
        assert_eq!(factory.last_handle().unwrap().sent().len(), before);
    }

    #[test]
    fn teardown_is_terminal() {
        let (mut session, _) = live_session();
        session.teardown();
        session.teardown();
        assert_eq!(session.state(), SessionState::TornDown);
        assert!(matches!(session.tick(), Err(SessionError::TornDown)));
        assert!(matches!(
            session.enter_room(&RoomId::new("foo"), false),
            Err(SessionError::TornDown)
        ));
        assert!(matches!(session.leave_room(), Err(SessionError::TornDown)));
        assert!(matches!(
            session.post_question("too late"),
            Err(SessionError::TornDown)
        ));
    }
}
