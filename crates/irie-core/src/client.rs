//! Session-level chat state machine.
//!
//! [`ChatClient`] owns the roster and the connection and is the single entry
//! point drivers talk to: inbound frames are routed by `action`, user
//! operations become outbound frames, and `tick` drives every timeout. Like
//! the rest of the crate it is pure state; methods take the current time and
//! return actions for the driver to execute.
//!
//! # Frame routing
//!
//! - `send_message`: bump the sender's unread counter, then append to the
//!   sender's window if one is open. The hub attaches no row id, so live
//!   messages enter under a local id and reconcile if a later history page
//!   re-serves them.
//! - `chat_history`: attribute the page to an in-flight fetch, then merge
//!   its rows into that window. An empty page marks the window exhausted.
//! - `newUser` / `disconnectUser`: update the online set.
//!
//! # History attribution
//!
//! `chat_history` replies carry no correlation id, so the client keeps a
//! FIFO of in-flight fetches. A non-empty page belongs to the oldest fetch
//! whose counterpart appears among the rows' sender/receiver ids; an empty
//! page can only be attributed by order and belongs to the oldest fetch
//! outright. Pages matching no fetch are dropped. Entries that outlive
//! [`ChatConfig::fetch_timeout`] are expired by `tick`, which re-arms the
//! window's page counter so the user can retry.

use std::{
    collections::VecDeque,
    ops::Sub,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use irie_proto::{HistoryEntry, Inbound, MessageId, Outbound, UserId};

use crate::{
    connection::{Connection, ConnectionAction, ConnectionConfig, ConnectionState, Dispatch},
    conversation::{Conversation, ConversationDescriptor, Direction, Message},
    error::{ClientError, ConnectionError},
    roster::Roster,
};

/// Time allowed for a history fetch to produce a page.
///
/// The backend sends no reply at all when a fetch fails server-side, so a
/// timeout is the only way to notice a lost page.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How far apart a provisional local message and a server row may sit in
/// wall-clock time and still be treated as the same message.
pub const DEFAULT_RECONCILE_WINDOW: Duration = Duration::from_secs(120);

/// Actions returned by the chat state machine for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Encode and send this frame to the server.
    Transmit(Outbound),

    /// The connection ended and will not come back; surface it to the user.
    SessionEnded {
        /// Why the session ended.
        reason: String,
    },

    /// A history fetch produced no page in time; surface it to the user.
    FetchTimedOut {
        /// Conversation counterpart the fetch was for.
        user: UserId,
        /// Page that went unanswered. Requestable again.
        page: u32,
    },
}

/// Chat client configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Socket lifecycle settings.
    pub connection: ConnectionConfig,
    /// Deadline for history fetches.
    pub fetch_timeout: Duration,
    /// Tolerance for matching provisional messages against server rows.
    pub reconcile_window: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            reconcile_window: DEFAULT_RECONCILE_WINDOW,
        }
    }
}

/// One in-flight history fetch.
#[derive(Debug, Clone, Copy)]
struct PendingFetch<I> {
    user: UserId,
    page: u32,
    issued_at: I,
}

/// The session's chat state: connection, open windows, in-flight fetches.
///
/// Pure state, no I/O. Generic over `Instant` so tests can drive a virtual
/// clock.
#[derive(Debug, Clone)]
pub struct ChatClient<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    connection: Connection<I>,
    roster: Roster,
    /// In-flight history fetches, oldest first.
    pending: VecDeque<PendingFetch<I>>,
    /// Source of provisional message ids, unique per session.
    next_local_id: u64,
    config: ChatConfig,
}

impl<I> ChatClient<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a client whose connection is in `Connecting`.
    pub fn new(now: I, config: ChatConfig) -> Self {
        Self {
            connection: Connection::new(now, config.connection.clone()),
            roster: Roster::new(),
            pending: VecDeque::new(),
            next_local_id: 0,
            config,
        }
    }

    /// The transport handshake finished; flush anything queued meanwhile.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::InvalidState`] when called on anything but a
    /// connecting client. That is a driver bug, not a protocol event.
    pub fn transport_opened(&mut self, now: I) -> Result<Vec<ClientAction>, ConnectionError> {
        let actions = self.connection.handshake_complete(now)?;
        Ok(actions.into_iter().map(lift).collect())
    }

    /// The transport reported a close or error. Terminal and idempotent.
    ///
    /// In-flight fetches are abandoned: no page is coming, and the windows
    /// stay readable as they are.
    pub fn transport_closed(&mut self, reason: impl Into<String>) -> Vec<ClientAction> {
        let actions = self.connection.peer_closed(reason);
        if !actions.is_empty() {
            self.pending.clear();
        }
        actions.into_iter().map(lift).collect()
    }

    /// Route one inbound frame.
    ///
    /// Frames that match nothing (a page without a fetch, a message for a
    /// counterpart with no window beyond its unread bump) are absorbed
    /// without error; the session always survives an inbound frame.
    pub fn handle_frame(&mut self, frame: Inbound) -> Vec<ClientAction> {
        match frame {
            Inbound::Message { sender, content, timestamp, id } => {
                self.handle_message(sender, content, timestamp, id);
            },
            Inbound::History { content } => self.handle_history(content),
            Inbound::UserOnline { data } => self.roster.set_online(data, true),
            Inbound::UserOffline { data } => self.roster.set_online(data, false),
        }
        vec![]
    }

    /// Open (or re-focus) the window for `descriptor.user`.
    ///
    /// A new window starts its page-1 history fetch immediately; reopening
    /// an existing window re-focuses it without refetching. Focusing clears
    /// the unread counter either way.
    pub fn open_conversation(
        &mut self,
        descriptor: ConversationDescriptor,
        now: I,
    ) -> Vec<ClientAction> {
        let user = descriptor.user;
        let newly_created = self.roster.open(descriptor);
        self.roster.clear_unread(user);
        if newly_created { self.issue_fetch(user, now) } else { vec![] }
    }

    /// Close the window for `user`, discarding its buffer and abandoning its
    /// in-flight fetches. Returns `false` when no such window is open.
    pub fn close_conversation(&mut self, user: UserId) -> bool {
        // Dropping the pending entries keeps a late page for the old window
        // from being attributed to a future reopen of the same counterpart.
        self.pending.retain(|fetch| fetch.user != user);
        self.roster.close(user)
    }

    /// Compose and send a message to `to`.
    ///
    /// The trimmed text is appended to the window under a provisional local
    /// id before the frame goes out; the backend never acknowledges sends,
    /// so the local copy is what the user sees. On a connecting socket the
    /// frame queues for the open flush; on a closed one it is dropped and
    /// only the local copy remains.
    ///
    /// # Errors
    ///
    /// [`ClientError::EmptyMessage`] when the text trims to nothing, and
    /// [`ClientError::UnknownConversation`] when no window for `to` is open.
    pub fn send_message(
        &mut self,
        to: UserId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        let window = self.config.reconcile_window;
        let conversation =
            self.roster.get_mut(to).ok_or(ClientError::UnknownConversation(to))?;
        let id = MessageId::Local(self.next_local_id);
        self.next_local_id += 1;
        conversation.insert(
            Message {
                id,
                text: trimmed.to_string(),
                direction: Direction::Outgoing,
                timestamp,
            },
            window,
        );

        let frame = Outbound::Message { recipient_id: to, content: trimmed.to_string() };
        match self.connection.dispatch(frame) {
            Dispatch::Sent(frame) => Ok(vec![ClientAction::Transmit(frame)]),
            Dispatch::Queued | Dispatch::Dropped => Ok(vec![]),
        }
    }

    /// The user scrolled to the top of `user`'s window; fetch the next
    /// older page.
    ///
    /// Each call claims the next page at issue time, so rapid triggers
    /// request successive pages instead of duplicating one. Exhausted and
    /// unknown windows produce nothing.
    pub fn request_older_messages(&mut self, user: UserId, now: I) -> Vec<ClientAction> {
        self.issue_fetch(user, now)
    }

    /// The user focused `user`'s window; reset its unread counter.
    pub fn mark_read(&mut self, user: UserId) {
        self.roster.clear_unread(user);
    }

    /// Periodic maintenance: connect timeout, fetch timeouts.
    ///
    /// Call at a coarse interval (once a second is plenty).
    pub fn tick(&mut self, now: I) -> Vec<ClientAction> {
        let mut out = Vec::new();

        for action in self.connection.tick(now) {
            if matches!(action, ConnectionAction::Close { .. }) {
                self.pending.clear();
            }
            out.push(lift(action));
        }

        let timeout = self.config.fetch_timeout;
        let mut expired = Vec::new();
        self.pending.retain(|fetch| {
            if now - fetch.issued_at > timeout {
                expired.push((fetch.user, fetch.page));
                false
            } else {
                true
            }
        });

        for (user, page) in expired {
            // Only re-arm the page counter when no other fetch for this
            // window is still in flight; a younger fetch may yet answer.
            if !self.pending.iter().any(|fetch| fetch.user == user) {
                if let Some(conversation) = self.roster.get_mut(user) {
                    conversation.rollback_page(page);
                }
            }
            out.push(ClientAction::FetchTimedOut { user, page });
        }

        out
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Open windows in activation order, most recently focused last.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.roster.iter()
    }

    /// The open window for `user`, if any.
    #[must_use]
    pub fn conversation(&self, user: UserId) -> Option<&Conversation> {
        self.roster.get(user)
    }

    /// Unread count for `user`.
    #[must_use]
    pub fn unread(&self, user: UserId) -> u32 {
        self.roster.unread(user)
    }

    /// True when the server has reported `user` online.
    #[must_use]
    pub fn is_online(&self, user: UserId) -> bool {
        self.roster.is_online(user)
    }

    /// Number of history fetches still waiting for a page.
    #[must_use]
    pub fn pending_fetches(&self) -> usize {
        self.pending.len()
    }

    fn handle_message(
        &mut self,
        sender: UserId,
        content: String,
        timestamp: DateTime<Utc>,
        id: Option<i64>,
    ) {
        // Unread is per counterpart, not per window: messages for a closed
        // window still count, and the user sees the badge on the roster.
        self.roster.record_unread(sender);

        let window = self.config.reconcile_window;
        let id = match id {
            Some(row) => MessageId::Server(row),
            None => {
                let id = MessageId::Local(self.next_local_id);
                self.next_local_id += 1;
                id
            },
        };
        if let Some(conversation) = self.roster.get_mut(sender) {
            conversation.insert(
                Message { id, text: content, direction: Direction::Incoming, timestamp },
                window,
            );
        }
        // No window: the body is dropped. It is stored server-side and the
        // page-1 fetch on open will bring it back.
    }

    fn handle_history(&mut self, rows: Vec<HistoryEntry>) {
        let Some(fetch) = self.take_pending_for(&rows) else {
            return;
        };

        let window = self.config.reconcile_window;
        let Some(conversation) = self.roster.get_mut(fetch.user) else {
            // Window closed while the fetch was in flight.
            return;
        };

        if rows.is_empty() {
            conversation.mark_exhausted();
            return;
        }

        for row in rows {
            let direction =
                if row.sender == fetch.user { Direction::Incoming } else { Direction::Outgoing };
            conversation.insert(
                Message {
                    id: MessageId::Server(row.id),
                    text: row.text,
                    direction,
                    timestamp: row.timestamp,
                },
                window,
            );
        }
    }

    /// Match a history page to the in-flight fetch it answers.
    ///
    /// Every row of a page involves the fetched counterpart on one side, so
    /// a non-empty page is attributed to the oldest fetch whose counterpart
    /// appears among the rows. An empty page carries no such signal and is
    /// attributed purely by order.
    fn take_pending_for(&mut self, rows: &[HistoryEntry]) -> Option<PendingFetch<I>> {
        if rows.is_empty() {
            return self.pending.pop_front();
        }
        let position = self.pending.iter().position(|fetch| {
            rows.iter()
                .any(|row| row.sender == fetch.user || row.receiver == Some(fetch.user))
        })?;
        self.pending.remove(position)
    }

    fn issue_fetch(&mut self, user: UserId, now: I) -> Vec<ClientAction> {
        if self.connection.state() == ConnectionState::Closed {
            return vec![];
        }
        let Some(conversation) = self.roster.get_mut(user) else {
            return vec![];
        };
        if conversation.exhausted() {
            return vec![];
        }

        let page = conversation.advance_page();
        self.pending.push_back(PendingFetch { user, page, issued_at: now });
        match self.connection.dispatch(Outbound::FetchHistory { user, page }) {
            Dispatch::Sent(frame) => vec![ClientAction::Transmit(frame)],
            // Queued frames flush on open; the fetch deadline runs from
            // issue time regardless.
            Dispatch::Queued | Dispatch::Dropped => vec![],
        }
    }
}

fn lift(action: ConnectionAction) -> ClientAction {
    match action {
        ConnectionAction::Transmit(frame) => ClientAction::Transmit(frame),
        ConnectionAction::Close { reason } => ClientAction::SessionEnded { reason },
    }
}
