//! Integration tests for App behavior across whole conversations.
//!
//! # Oracle Pattern
//!
//! Each test drives the App the way a frontend would (API calls plus
//! transport events) and ends with oracle checks on the derived state:
//! buffer order, focus, unread counts, and the frames that went out.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use irie_app::{App, AppAction, AppEvent};
use irie_client::Friend;
use irie_core::{ChatConfig, ConnectionState, Environment};
use irie_proto::{HistoryEntry, Inbound, Outbound, UserId};

const ME: UserId = UserId(1);
const ALICE: UserId = UserId(7);
const BOB: UserId = UserId(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TestInstant(u64);

impl std::ops::Sub for TestInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Clone, Default)]
struct TestEnv {
    millis: Arc<AtomicU64>,
}

impl TestEnv {
    fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Environment for TestEnv {
    type Instant = TestInstant;

    fn now(&self) -> TestInstant {
        TestInstant(self.millis.load(Ordering::SeqCst))
    }

    fn wall_now(&self) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH
            + chrono::Duration::milliseconds(self.millis.load(Ordering::SeqCst) as i64)
    }

    fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        std::future::ready(())
    }
}

fn friend(id: UserId, username: &str) -> Friend {
    Friend {
        id,
        first_name: String::new(),
        last_name: String::new(),
        avatar_url: None,
        username: username.to_string(),
    }
}

/// Create a connected App with alice and bob as friends.
fn connected_app() -> (App<TestEnv>, TestEnv) {
    let env = TestEnv::default();
    let friends = vec![friend(ALICE, "alice"), friend(BOB, "bob")];
    let mut app = App::new(env.clone(), ChatConfig::default(), friends);
    app.handle(AppEvent::TransportOpened);
    (app, env)
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + chrono::Duration::seconds(secs)
}

fn row(id: i64, sender: UserId, receiver: UserId, text: &str, secs: i64) -> HistoryEntry {
    HistoryEntry {
        id,
        text: text.to_string(),
        sender,
        receiver: Some(receiver),
        timestamp: at(secs),
    }
}

fn page(rows: Vec<HistoryEntry>) -> AppEvent {
    AppEvent::FrameReceived(Inbound::History { content: rows })
}

fn live(sender: UserId, text: &str, secs: i64) -> AppEvent {
    AppEvent::FrameReceived(Inbound::Message {
        sender,
        content: text.to_string(),
        timestamp: at(secs),
        id: None,
    })
}

/// Frames transmitted by a batch of actions.
fn sent(actions: &[AppAction]) -> Vec<Outbound> {
    actions
        .iter()
        .filter_map(|action| match action {
            AppAction::Transmit(frame) => Some(frame.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn window_fills_from_history_and_live_traffic() {
    let (mut app, _env) = connected_app();

    let actions = app.open_conversation("alice");
    assert_eq!(sent(&actions), vec![Outbound::FetchHistory { user: ALICE, page: 1 }]);

    // Page rows arrive newest first; the buffer reorders them.
    app.handle(page(vec![
        row(12, ALICE, ME, "how are you", 40),
        row(11, ME, ALICE, "hi alice", 30),
    ]));
    app.handle(live(ALICE, "still there?", 50));
    let actions = app.send_active("yes");
    assert_eq!(sent(&actions).len(), 1, "send should transmit one frame");

    // Oracle: oldest to newest, with server rows before local entries.
    let window = app.focused().expect("alice window");
    let texts: Vec<&str> = window.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hi alice", "how are you", "still there?", "yes"]);

    // Oracle: history direction comes from the row's sender.
    assert_eq!(window.messages()[0].direction, irie_core::Direction::Outgoing);
    assert_eq!(window.messages()[1].direction, irie_core::Direction::Incoming);
}

#[test]
fn scrolling_loads_older_pages_without_moving_the_view() {
    let (mut app, _env) = connected_app();
    app.open_conversation("alice");
    app.set_chat_height(4);

    // First page: rows 20..=29, delivered newest first.
    let first: Vec<HistoryEntry> =
        (20..30).rev().map(|n| row(n, ALICE, ME, &format!("m{n}"), n)).collect();
    app.handle(page(first));

    let actions = app.scroll_up(30);
    assert_eq!(sent(&actions), vec![Outbound::FetchHistory { user: ALICE, page: 2 }]);

    let visible_before: Vec<String> = visible_texts(&app);

    // Second page prepends rows 10..=19 above the anchor.
    let second: Vec<HistoryEntry> =
        (10..20).rev().map(|n| row(n, ALICE, ME, &format!("m{n}"), n)).collect();
    app.handle(page(second));

    // Oracle: the reader still sees the same messages.
    assert_eq!(visible_texts(&app), visible_before);

    // Oracle: the full buffer is ordered oldest to newest.
    let window = app.focused().expect("alice window");
    let ids: Vec<_> = window.messages().iter().map(|m| m.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(window.len(), 20);
}

#[test]
fn exhausted_window_stops_requesting_pages() {
    let (mut app, _env) = connected_app();
    app.open_conversation("alice");
    app.set_chat_height(4);
    app.handle(page(vec![row(5, ALICE, ME, "only one", 5)]));

    // The backend signals the end of history with an empty page.
    let actions = app.scroll_up(10);
    assert_eq!(sent(&actions).len(), 1);
    app.handle(page(vec![]));

    let actions = app.scroll_up(10);
    assert!(sent(&actions).is_empty(), "no fetch after the end of history");
    assert!(app.focused().expect("alice window").exhausted());
}

#[test]
fn history_row_replaces_the_optimistic_entry() {
    let (mut app, env) = connected_app();
    app.open_conversation("alice");
    env.advance(30_000);

    app.send_active("hello");
    let window = app.focused().expect("alice window");
    assert_eq!(window.len(), 1);
    assert!(window.messages()[0].id.is_local());

    // The same message comes back as a stored row within the window.
    app.handle(page(vec![row(42, ME, ALICE, "hello", 31)]));

    let window = app.focused().expect("alice window");
    assert_eq!(window.len(), 1, "row and local entry must merge");
    assert!(window.messages()[0].id.is_server());
}

#[test]
fn presence_frames_toggle_the_online_set() {
    let (mut app, _env) = connected_app();

    app.handle(AppEvent::FrameReceived(Inbound::UserOnline { data: ALICE }));
    assert!(app.is_online(ALICE));
    assert!(!app.is_online(BOB));

    app.handle(AppEvent::FrameReceived(Inbound::UserOffline { data: ALICE }));
    assert!(!app.is_online(ALICE));
}

#[test]
fn unread_follows_focus_across_windows() {
    let (mut app, _env) = connected_app();
    app.open_conversation("alice");
    app.open_conversation("bob");

    app.handle(live(ALICE, "ping", 10));
    app.handle(live(BOB, "pong", 11));

    // Oracle: the focused window reads on arrival, the background one
    // accrues.
    assert_eq!(app.unread(ALICE), 1);
    assert_eq!(app.unread(BOB), 0);

    app.open_conversation("alice");
    assert_eq!(app.unread(ALICE), 0);
}

#[test]
fn disconnect_keeps_windows_readable_and_sends_local() {
    let (mut app, _env) = connected_app();
    app.open_conversation("alice");
    app.handle(page(vec![row(3, ALICE, ME, "before the cut", 3)]));

    app.handle(AppEvent::TransportClosed { reason: "connection lost".to_string() });
    assert_eq!(app.connection_state(), ConnectionState::Closed);
    assert!(app.status_message().is_some_and(|status| status.contains("Disconnected")));

    // Sends no longer reach the wire but stay visible in the window.
    let actions = app.send_active("anyone?");
    assert!(sent(&actions).is_empty());
    let texts = visible_texts(&app);
    assert_eq!(texts, vec!["before the cut", "anyone?"]);
}

#[test]
fn fetch_timeout_rearms_the_page_for_retry() {
    let (mut app, env) = connected_app();
    app.open_conversation("alice");
    assert_eq!(app.focused().expect("alice window").next_page(), 2);

    env.advance(11_000);
    app.handle(AppEvent::Tick);

    // Oracle: the unanswered page may be requested again.
    assert_eq!(app.focused().expect("alice window").next_page(), 1);
    assert!(app.status_message().is_some_and(|status| status.contains("timed out")));
}

#[test]
fn opening_while_connecting_queues_the_fetch() {
    let env = TestEnv::default();
    let friends = vec![friend(ALICE, "alice")];
    let mut app = App::new(env.clone(), ChatConfig::default(), friends);

    // No handshake yet: the fetch must wait, not hit the wire.
    let actions = app.open_conversation("alice");
    assert!(sent(&actions).is_empty());

    let actions = app.handle(AppEvent::TransportOpened);
    assert_eq!(sent(&actions), vec![Outbound::FetchHistory { user: ALICE, page: 1 }]);
}

fn visible_texts(app: &App<TestEnv>) -> Vec<String> {
    let window = app.focused().expect("focused window");
    let range =
        app.focused_viewport().visible_range(window.len(), usize::from(app.chat_height()));
    window.messages()[range].iter().map(|m| m.text.clone()).collect()
}
