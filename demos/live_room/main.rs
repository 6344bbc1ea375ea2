//! Basic Plenum Example - Live Question Room
//!
//! This example demonstrates core Plenum functionality:
//! - Seeding an in-memory store with the fixture rooms
//! - Wiring two sessions to one relay through the in-process hub
//! - Posting, upvoting and answering questions with optimistic local echo
//! - Catching up after a dropped connection via snapshot re-seed
//!
//! Run with: cargo run -p live_room

use plenum_client::UserDraft;
use plenum_protocol::{QuestionId, QuestionInfo, RoomId, UserId};
use plenum_store::Store;
use plenum_testkit::{HubSession, LiveHub, TestStore, AUDIENCE_USER, FOO_ROOM, HOST_USER};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

/// Prints a projection's canonical question order, one line per question.
fn render(label: &str, session: &HubSession) {
    println!("\n[*] {label}:");
    let projection = session.projection();
    for question in projection.ordered_questions() {
        let status = if question.is_answered() { "✓" } else { "○" };
        let author = projection
            .known_user(&question.author)
            .map(|user| user.display_name.clone())
            .unwrap_or_else(|| question.author.to_string());
        println!(
            "  {} [{} votes] {} (asked by {})",
            status,
            question.vote_count(),
            question.question_text,
            author
        );
        if let Some(answer) = &question.answer_text {
            let answerer = question
                .answer_author
                .as_ref()
                .and_then(|id| projection.known_user(id))
                .map(|user| user.display_name.clone())
                .unwrap_or_default();
            println!("      answered by {answerer}: {answer}");
        }
    }
}

fn question_map(session: &HubSession) -> BTreeMap<QuestionId, QuestionInfo> {
    session
        .projection()
        .questions()
        .map(|q| (q.id.clone(), q.clone()))
        .collect()
}

fn canonical_order(session: &HubSession) -> Vec<QuestionId> {
    session
        .projection()
        .ordered_questions()
        .iter()
        .map(|q| q.id.clone())
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Live Question Room Example");
    println!("==========================\n");

    // An in-memory store seeded with the fixture rooms, and a relay over it
    let store = TestStore::seeded();
    let hub = LiveHub::over(store.as_dyn());
    println!("[OK] Store seeded, relay ready");

    let foo = RoomId::new(FOO_ROOM);
    let mut host = hub.session(
        store.as_dyn(),
        UserDraft::new(HOST_USER).with_display_name("Peter Rabbit"),
    );
    let mut audience = hub.session(
        store.as_dyn(),
        UserDraft::new(AUDIENCE_USER).with_display_name("Johnny Appleseed"),
    );

    println!("\n[+] Joining room '{foo}'...");
    host.enter_room(&foo, true)?;
    host.tick()?;
    audience.enter_room(&foo, false)?;
    audience.tick()?;
    let room_name = host
        .projection()
        .room_info()
        .map(|room| room.display_name.clone())
        .unwrap_or_default();
    println!(
        "[OK] Host and audience live in \"{}\" with {} questions on the board",
        room_name,
        host.projection().question_count()
    );

    // The poster sees its own question immediately; the relayed fact then
    // merges into the same record on both sides.
    println!("\n[+] Audience posts a question...");
    let posted = audience.post_question("Will the recording be shared afterwards?")?;
    audience.tick()?;
    host.tick()?;
    println!("[OK] Question {posted} visible to both sessions");

    println!("\n[~] Host upvotes the new question and answers it...");
    let added = host.toggle_upvote(&posted)?;
    host.tick()?;
    audience.tick()?;
    println!("[OK] Upvote {}", if added { "added" } else { "removed" });
    host.answer_question(&posted, "Yes, the link goes out tomorrow.")?;
    host.tick()?;
    audience.tick()?;

    render("Host's view", &host);
    render("Audience's view", &audience);

    // Drop every connection, let the room move on, then reconnect. A
    // reconnect re-seeds from a fresh snapshot, so the missed question
    // shows up without any replay bookkeeping.
    println!("\n[!] Severing all connections...");
    hub.sever_all();
    let missed = QuestionId::new("aaaa0000bbbb1111");
    store.add_question(
        &foo,
        &UserId::new(HOST_USER),
        &missed,
        "Did anyone else lose connection just now?",
    )?;

    host.tick()?;
    audience.tick()?;
    host.tick()?;
    audience.tick()?;
    println!(
        "[OK] Both sessions live again, missed question visible: {}",
        host.projection().question(&missed).is_some()
    );

    render("Host's view after reconnect", &host);
    render("Audience's view after reconnect", &audience);

    if question_map(&host) != question_map(&audience)
        || canonical_order(&host) != canonical_order(&audience)
    {
        println!("\n[!] Host and audience projections diverged");
        return Err("projections diverged".into());
    }

    let answered = host
        .projection()
        .questions()
        .filter(|q| q.is_answered())
        .count();
    println!("\n[#] Summary:");
    println!("  Questions: {}", host.projection().question_count());
    println!("  Answered: {answered}");
    println!("  Projections agree: yes");

    Ok(())
}
