//! Fuzz target for the chat client state machine
//!
//! Drive arbitrary operation sequences through `ChatClient` and check the
//! structural invariants after every step.
//!
//! # Strategy
//!
//! - Small user pool: operations collide on the same few windows
//! - Hostile pages: duplicate row ids, unordered rows, foreign counterparts
//! - Full lifecycle: open, drop, and tick the link on a virtual clock
//! - Contract checks: send errors match window and text state exactly
//!
//! # Invariants
//!
//! - Every buffer stays strictly ordered by message id
//! - The open set never holds two windows for one counterpart
//! - A closed connection leaves no fetch in flight
//! - Focusing a window zeroes its unread counter
//! - The state machine never panics

#![no_main]

use std::collections::HashSet;
use std::ops::Sub;
use std::time::Duration;

use arbitrary::Arbitrary;
use chrono::{DateTime, Utc};
use irie_core::{ChatClient, ChatConfig, ClientError, ConnectionState, ConversationDescriptor};
use irie_proto::{HistoryEntry, Inbound, UserId};
use libfuzzer_sys::fuzz_target;

/// The session user's own account id, outside the counterpart pool.
const SELF_ID: UserId = UserId(999);

/// Virtual monotonic instant, millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Tick(u64);

impl Sub for Tick {
    type Output = Duration;

    fn sub(self, rhs: Tick) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum ClientOp {
    OpenTransport,
    DropTransport,
    Open { user: u8 },
    Close { user: u8 },
    Focus { user: u8 },
    Send { user: u8, text: TextChoice },
    Scroll { user: u8 },
    Live { sender: u8, text: TextChoice, id: Option<i64> },
    Page { rows: Vec<RowSpec> },
    Presence { user: u8, online: bool },
    Advance { millis: u16 },
    Tick,
}

#[derive(Debug, Clone, Arbitrary)]
enum TextChoice {
    Word(u8),
    Blank,
    Raw(String),
}

#[derive(Debug, Clone, Arbitrary)]
struct RowSpec {
    id: i8,
    peer: u8,
    incoming: bool,
    word: u8,
    at_secs: u16,
}

fuzz_target!(|ops: Vec<ClientOp>| {
    let mut clock = Tick(0);
    let mut client = ChatClient::new(clock, ChatConfig::default());

    for op in ops {
        match op {
            ClientOp::OpenTransport => {
                let _ = client.transport_opened(clock);
            }

            ClientOp::DropTransport => {
                let _ = client.transport_closed("fuzzer dropped the link");
            }

            ClientOp::Open { user } => {
                let user = pool(user);
                let _ = client.open_conversation(descriptor(user), clock);
                assert!(client.conversation(user).is_some());
                assert_eq!(client.unread(user), 0, "focus left an unread count");
            }

            ClientOp::Close { user } => {
                let user = pool(user);
                let was_open = client.conversation(user).is_some();
                assert_eq!(client.close_conversation(user), was_open);
                assert!(client.conversation(user).is_none());
            }

            ClientOp::Focus { user } => {
                let user = pool(user);
                client.mark_read(user);
                assert_eq!(client.unread(user), 0);
            }

            ClientOp::Send { user, text } => {
                let user = pool(user);
                let text = text.render();
                let was_open = client.conversation(user).is_some();

                match client.send_message(user, &text, wall(clock)) {
                    Ok(_) => {
                        assert!(was_open, "send succeeded without a window");
                        assert!(!text.trim().is_empty(), "send accepted blank text");
                    }
                    Err(ClientError::EmptyMessage) => {
                        assert!(text.trim().is_empty(), "non-blank text rejected as empty");
                    }
                    Err(ClientError::UnknownConversation(reported)) => {
                        assert_eq!(reported, user);
                        assert!(!was_open, "send rejected an open window");
                    }
                }
            }

            ClientOp::Scroll { user } => {
                let _ = client.request_older_messages(pool(user), clock);
            }

            ClientOp::Live { sender, text, id } => {
                let sender = pool(sender);
                let before = client.unread(sender);
                let _ = client.handle_frame(Inbound::Message {
                    sender,
                    content: text.render(),
                    timestamp: wall(clock),
                    id,
                });
                assert_eq!(client.unread(sender), before + 1, "live message did not count");
            }

            ClientOp::Page { rows } => {
                let content = rows.iter().map(entry).collect();
                let _ = client.handle_frame(Inbound::History { content });
            }

            ClientOp::Presence { user, online } => {
                let user = pool(user);
                let frame = if online {
                    Inbound::UserOnline { data: user }
                } else {
                    Inbound::UserOffline { data: user }
                };
                let _ = client.handle_frame(frame);
                assert_eq!(client.is_online(user), online);
            }

            ClientOp::Advance { millis } => {
                clock = Tick(clock.0 + u64::from(millis));
            }

            ClientOp::Tick => {
                let _ = client.tick(clock);
            }
        }

        assert_invariants(&client);
    }
});

impl TextChoice {
    fn render(&self) -> String {
        match self {
            Self::Word(n) => format!("hello {n}"),
            Self::Blank => "   ".to_string(),
            Self::Raw(text) => text.clone(),
        }
    }
}

fn assert_invariants(client: &ChatClient<Tick>) {
    let mut counterparts = HashSet::new();
    for conversation in client.conversations() {
        assert!(
            counterparts.insert(conversation.user()),
            "two windows share counterpart {}",
            conversation.user()
        );
        for pair in conversation.messages().windows(2) {
            assert!(
                pair[0].id < pair[1].id,
                "buffer out of order: {} then {}",
                pair[0].id,
                pair[1].id
            );
        }
    }

    if client.connection_state() == ConnectionState::Closed {
        assert_eq!(client.pending_fetches(), 0, "fetch left in flight after close");
    }
}

fn pool(raw: u8) -> UserId {
    UserId(i64::from(raw % 5) + 1)
}

fn wall(clock: Tick) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + chrono::Duration::milliseconds(clock.0 as i64)
}

fn descriptor(user: UserId) -> ConversationDescriptor {
    ConversationDescriptor {
        user,
        display_name: format!("peer-{user}"),
        avatar_url: None,
    }
}

fn entry(row: &RowSpec) -> HistoryEntry {
    let peer = pool(row.peer);
    let (sender, receiver) = if row.incoming { (peer, SELF_ID) } else { (SELF_ID, peer) };
    HistoryEntry {
        id: i64::from(row.id),
        text: format!("m{}", row.word),
        sender,
        receiver: Some(receiver),
        timestamp: DateTime::UNIX_EPOCH + chrono::Duration::seconds(i64::from(row.at_secs)),
    }
}
