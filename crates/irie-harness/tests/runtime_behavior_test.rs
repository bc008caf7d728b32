//! End-to-end tests over the production runtime loop.
//!
//! # Test Strategy
//!
//! Each test wires [`Runtime`] to a [`SimDriver`] carrying a scripted user
//! and an in-process hub, then runs the whole session to completion. The
//! runtime, app, and client under test are the production ones; only the
//! terminal and the websocket are simulated.
//!
//! # Oracle Pattern
//!
//! [`Runtime::run`] consumes the driver, so oracles go through the driver's
//! [`SimProbe`] (the wire as the hub saw it) and the hub's own store.

use std::{sync::Arc, time::Duration};

use irie_app::{App, Runtime};
use irie_client::Friend;
use irie_core::ChatConfig;
use irie_harness::{SimDriver, SimEnv, SimStep, create_shared_server};
use irie_proto::{Outbound, UserId};

const ME: UserId = UserId(1);
const ALICE: UserId = UserId(7);

fn friend(id: i64, username: &str) -> Friend {
    Friend {
        id: UserId(id),
        first_name: String::new(),
        last_name: String::new(),
        avatar_url: None,
        username: username.to_string(),
    }
}

fn fetched_pages(outgoing: &[Outbound]) -> Vec<u32> {
    outgoing
        .iter()
        .filter_map(|frame| match frame {
            Outbound::FetchHistory { page, .. } => Some(*page),
            Outbound::Message { .. } => None,
        })
        .collect()
}

/// A scripted session: open a thread, send a message, scroll for more.
///
/// The wire must show the page-one fetch, the message, and the page-two
/// fetch in that order, and the hub must have stored the sent row.
#[tokio::test]
async fn scripted_session_reaches_the_hub_and_back() {
    let env = SimEnv::new();
    let server = create_shared_server(ME);
    {
        let mut hub = server.lock().unwrap();
        for n in 0..15 {
            hub.seed_row(ALICE, ME, &format!("m{n}"));
        }
    }

    let driver = SimDriver::new(env.clone()).with_server(Arc::clone(&server)).with_script([
        SimStep::Open("alice".to_string()),
        SimStep::Send("hi alice".to_string()),
        SimStep::ScrollUp(40),
    ]);
    let probe = driver.probe();
    let app = App::new(env, ChatConfig::default(), vec![friend(7, "alice")]);

    Runtime::new(driver, app).run().await.expect("session runs to completion");

    assert_eq!(
        probe.outgoing(),
        vec![
            Outbound::FetchHistory { user: ALICE, page: 1 },
            Outbound::Message { recipient_id: ALICE, content: "hi alice".to_string() },
            Outbound::FetchHistory { user: ALICE, page: 2 },
        ]
    );
    assert_eq!(
        server.lock().unwrap().stored_texts(ALICE).last().map(String::as_str),
        Some("hi alice"),
        "the hub stored the sent message"
    );
    assert!(probe.renders() > 0, "the session rendered along the way");
}

/// Scrolling past the end of history goes quiet once the hub reports an
/// empty page.
#[tokio::test]
async fn exhausted_history_quiets_further_scrolling() {
    let env = SimEnv::new();
    let server = create_shared_server(ME);
    {
        let mut hub = server.lock().unwrap();
        for n in 0..3 {
            hub.seed_row(ALICE, ME, &format!("m{n}"));
        }
    }

    // The pauses let each response land before the next scroll.
    let driver = SimDriver::new(env.clone()).with_server(Arc::clone(&server)).with_script([
        SimStep::Open("alice".to_string()),
        SimStep::Advance(Duration::from_secs(1)),
        SimStep::ScrollUp(40),
        SimStep::Advance(Duration::from_secs(1)),
        SimStep::ScrollUp(40),
        SimStep::Advance(Duration::from_secs(1)),
        SimStep::ScrollUp(40),
    ]);
    let probe = driver.probe();
    let app = App::new(env, ChatConfig::default(), vec![friend(7, "alice")]);

    Runtime::new(driver, app).run().await.expect("session runs to completion");

    assert_eq!(
        fetched_pages(&probe.outgoing()),
        vec![1, 2],
        "one page of rows, one empty page, then silence"
    );
}

/// A send after the link dies stays local: nothing reaches the wire or the
/// hub, and the runtime shuts down cleanly.
#[tokio::test]
async fn dead_link_keeps_late_messages_local() {
    let env = SimEnv::new();
    let server = create_shared_server(ME);

    let driver = SimDriver::new(env.clone()).with_server(Arc::clone(&server)).with_script([
        SimStep::Open("alice".to_string()),
        SimStep::SeverLink,
        SimStep::Send("late".to_string()),
    ]);
    let probe = driver.probe();
    let app = App::new(env, ChatConfig::default(), vec![friend(7, "alice")]);

    Runtime::new(driver, app).run().await.expect("session runs to completion");

    assert!(!probe.connected());
    assert_eq!(probe.outgoing(), vec![Outbound::FetchHistory { user: ALICE, page: 1 }]);
    assert!(server.lock().unwrap().stored_texts(ALICE).is_empty());
}
