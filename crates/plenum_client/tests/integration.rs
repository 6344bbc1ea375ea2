//! Integration tests for sessions reconciling against a live relay.

use plenum_client::{SessionState, UserDraft};
use plenum_protocol::{QuestionId, QuestionInfo, RoomId, UserId};
use plenum_store::Store;
use plenum_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn session_for(
    hub: &Arc<LiveHub>,
    store: &TestStore,
    user_id: &str,
    display_name: &str,
) -> HubSession {
    hub.session(
        store.as_dyn(),
        UserDraft::new(user_id).with_display_name(display_name),
    )
}

fn go_live(session: &mut HubSession, room_id: &RoomId, as_host: bool) {
    session.enter_room(room_id, as_host).unwrap();
    session.tick().unwrap();
    assert_eq!(session.state(), SessionState::Live);
}

fn question_map(session: &HubSession) -> BTreeMap<QuestionId, QuestionInfo> {
    session
        .projection()
        .questions()
        .map(|q| (q.id.clone(), q.clone()))
        .collect()
}

#[test]
fn two_sessions_converge_through_the_relay() {
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    let foo = RoomId::new(FOO_ROOM);

    let mut host = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
    let mut audience = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
    go_live(&mut host, &foo, true);
    go_live(&mut audience, &foo, false);

    let posted = audience.post_question("Will the talk be recorded?").unwrap();
    host.tick().unwrap();
    audience.tick().unwrap();

    host.answer_question(&posted, "Yes, link follows.").unwrap();
    audience.toggle_upvote(&QuestionId::new(OPEN_QUESTION)).unwrap();
    host.tick().unwrap();
    audience.tick().unwrap();

    assert_eq!(question_map(&host), question_map(&audience));

    let question = &question_map(&host)[&posted];
    assert!(question.is_answered());
    assert_eq!(question.answer_author, Some(UserId::new(HOST_USER)));
    assert!(question.up_votes.contains(&UserId::new(AUDIENCE_USER)));

    // Both render the same canonical order.
    let order_of = |s: &HubSession| -> Vec<QuestionId> {
        s.projection()
            .ordered_questions()
            .iter()
            .map(|q| q.id.clone())
            .collect()
    };
    assert_eq!(order_of(&host), order_of(&audience));
}

#[test]
fn optimistic_post_matches_a_fresh_join() {
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    let foo = RoomId::new(FOO_ROOM);

    let mut poster = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
    go_live(&mut poster, &foo, false);
    poster.post_question("Is there a recording?").unwrap();
    poster.tick().unwrap();

    let mut fresh = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
    go_live(&mut fresh, &foo, false);

    assert_eq!(question_map(&poster), question_map(&fresh));
}

#[test]
fn reconnect_catches_up_like_a_fresh_join() {
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    let foo = RoomId::new(FOO_ROOM);

    let mut session = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
    go_live(&mut session, &foo, false);
    assert_eq!(session.projection().question_count(), 2);

    hub.sever_all();

    // The room moves on while the session is away.
    let missed = QuestionId::new("aaaa0000bbbb1111");
    store
        .add_question(&foo, &UserId::new(HOST_USER), &missed, "Posted while away")
        .unwrap();
    store
        .toggle_upvote(&foo, &UserId::new(AUDIENCE_USER), &missed, false)
        .unwrap();

    session.tick().unwrap();
    assert_eq!(session.state(), SessionState::Reconnecting);
    session.tick().unwrap();
    assert_eq!(session.state(), SessionState::Live);
    assert!(session.projection().question(&missed).is_some());

    let mut fresh = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
    go_live(&mut fresh, &foo, false);
    assert_eq!(question_map(&session), question_map(&fresh));
}

#[test]
fn fan_out_is_scoped_to_the_room_channel() {
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    let foo = RoomId::new(FOO_ROOM);
    let bar = RoomId::new(BAR_ROOM);

    let mut a = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
    let mut b = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
    let mut elsewhere = session_for(&hub, &store, "mallard", "Mallory Duck");
    go_live(&mut a, &foo, false);
    go_live(&mut b, &foo, false);
    go_live(&mut elsewhere, &bar, false);

    let posted = a.post_question("Does everyone see this?").unwrap();
    a.tick().unwrap();
    b.tick().unwrap();
    elsewhere.tick().unwrap();

    assert!(a.projection().question(&posted).is_some());
    assert!(b.projection().question(&posted).is_some());
    assert_eq!(elsewhere.projection().question_count(), 0);
}

#[test]
fn leaving_releases_the_relay_subscription() {
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    let foo = RoomId::new(FOO_ROOM);

    let mut a = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
    let mut b = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
    go_live(&mut a, &foo, false);
    go_live(&mut b, &foo, true);
    assert_eq!(hub.relay.subscriber_count(&foo), 2);

    a.leave_room().unwrap();
    assert_eq!(hub.relay.subscriber_count(&foo), 1);
    assert_eq!(a.projection().question_count(), 0);

    // The remaining session still receives facts.
    let posted = b.post_question("Anyone still here?").unwrap();
    b.tick().unwrap();
    assert!(b.projection().question(&posted).is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Whatever one session does, a second session merging only relay
    /// facts ends up with the identical question map.
    #[test]
    fn any_action_sequence_converges(actions in action_sequence_strategy(1, 12)) {
        let store = TestStore::seeded();
        let hub = LiveHub::over(store.as_dyn());
        let foo = RoomId::new(FOO_ROOM);

        let mut actor = session_for(&hub, &store, AUDIENCE_USER, "Johnny Appleseed");
        let mut witness = session_for(&hub, &store, HOST_USER, "Peter Rabbit");
        go_live(&mut actor, &foo, false);
        go_live(&mut witness, &foo, false);

        for action in actions {
            let ordered: Vec<QuestionId> = actor
                .projection()
                .ordered_questions()
                .iter()
                .map(|q| q.id.clone())
                .collect();
            match action {
                RoomAction::Post { question_text, .. } => {
                    actor.post_question(question_text).unwrap();
                }
                RoomAction::Answer { pick, answer_text, .. } => {
                    if let Some(id) = ordered.get(pick % ordered.len().max(1)) {
                        actor.answer_question(id, answer_text).unwrap();
                    }
                }
                RoomAction::Upvote { pick, .. } => {
                    if let Some(id) = ordered.get(pick % ordered.len().max(1)) {
                        actor.toggle_upvote(id).unwrap();
                    }
                }
                RoomAction::Delete { pick } => {
                    if let Some(id) = ordered.get(pick % ordered.len().max(1)) {
                        actor.delete_question(id).unwrap();
                    }
                }
            }
            actor.tick().unwrap();
            witness.tick().unwrap();
        }

        actor.tick().unwrap();
        witness.tick().unwrap();
        prop_assert_eq!(question_map(&actor), question_map(&witness));
    }
}
