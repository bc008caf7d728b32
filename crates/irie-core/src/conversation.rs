//! One direct-message conversation: ordered buffer plus pagination state.
//!
//! The buffer is the merge point for three producers: live frames append
//! near the end, history pages land near the front, and optimistic sends go
//! at the very end. All three go through [`Conversation::insert`], which
//! keeps the buffer strictly ordered by [`MessageId`] and discards
//! duplicates, so interleaving never corrupts the transcript.
//!
//! # Invariants
//!
//! - `messages` is strictly ascending by id; no two entries share an id
//! - `next_page` starts at 1 and only moves via [`Conversation::advance_page`]
//!   and [`Conversation::rollback_page`]
//! - once `exhausted` is set it never clears for the life of the window

use std::time::Duration;

use chrono::{DateTime, Utc};
use irie_proto::{MessageId, UserId};

/// Who authored a message, relative to the session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Composed locally, addressed to the counterpart.
    Outgoing,
    /// Authored by the counterpart.
    Incoming,
}

/// One message in a conversation buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Buffer ordering key. Local until reconciled with a server row.
    pub id: MessageId,
    /// Message body.
    pub text: String,
    /// Authorship relative to the session user.
    pub direction: Direction,
    /// Author-side wall-clock time.
    pub timestamp: DateTime<Utc>,
}

/// Identity of one open chat window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationDescriptor {
    /// Counterpart account id. Unique within the open set.
    pub user: UserId,
    /// Name shown in the window header.
    pub display_name: String,
    /// Counterpart avatar, when the friends list provides one.
    pub avatar_url: Option<String>,
}

/// What [`Conversation::insert`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New entry added at its sorted position.
    Added,
    /// An entry with the same id already exists; the message was discarded.
    Duplicate,
    /// The message replaced a provisional local entry it reconciles with.
    Reconciled,
}

/// Per-window conversation state.
#[derive(Debug, Clone)]
pub struct Conversation {
    descriptor: ConversationDescriptor,
    /// Strictly ascending by id.
    messages: Vec<Message>,
    /// Next history page to request, 1-based.
    next_page: u32,
    /// Set when the server returned an empty page; no further fetches.
    exhausted: bool,
}

impl Conversation {
    /// Fresh window state: empty buffer, first page not yet requested.
    pub fn new(descriptor: ConversationDescriptor) -> Self {
        Self { descriptor, messages: Vec::new(), next_page: 1, exhausted: false }
    }

    /// Counterpart account id.
    #[must_use]
    pub fn user(&self) -> UserId {
        self.descriptor.user
    }

    /// Window identity.
    #[must_use]
    pub fn descriptor(&self) -> &ConversationDescriptor {
        &self.descriptor
    }

    /// The transcript, strictly ascending by id.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the buffer holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Next history page a fetch would request.
    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    /// True once the server has reported no further history.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Claim the next page number and advance past it.
    ///
    /// Advancing happens at issue time, before any response arrives, so a
    /// second trigger while the first fetch is in flight requests the next
    /// page rather than a duplicate.
    pub fn advance_page(&mut self) -> u32 {
        let page = self.next_page;
        self.next_page += 1;
        page
    }

    /// A fetch for `page` was lost; make that range requestable again.
    pub fn rollback_page(&mut self, page: u32) {
        self.next_page = self.next_page.min(page);
    }

    /// Record that the server returned an empty page.
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    /// Insert a message at its sorted position.
    ///
    /// Duplicates (same id) are discarded. A server-id message additionally
    /// scans for a provisional local entry with the same direction, the same
    /// text, and a timestamp within `reconcile_window`; if one exists the
    /// local entry is replaced rather than doubled. That covers both
    /// optimistic sends (the backend sends no ack) and live messages that
    /// arrived without a row id and later reappear in a history page.
    pub fn insert(&mut self, message: Message, reconcile_window: Duration) -> InsertOutcome {
        let position = match self.messages.binary_search_by(|m| m.id.cmp(&message.id)) {
            Ok(_) => return InsertOutcome::Duplicate,
            Err(position) => position,
        };

        if message.id.is_server() {
            if let Some(local) = self.find_reconcilable(&message, reconcile_window) {
                self.messages.remove(local);
                // Local ids sort after every server id, so the removal
                // cannot shift the insertion point of a server-id message.
                self.messages.insert(position, message);
                return InsertOutcome::Reconciled;
            }
        }

        self.messages.insert(position, message);
        InsertOutcome::Added
    }

    fn find_reconcilable(&self, message: &Message, window: Duration) -> Option<usize> {
        let tolerance = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
        self.messages.iter().position(|candidate| {
            candidate.id.is_local()
                && candidate.direction == message.direction
                && candidate.text == message.text
                && (candidate.timestamp - message.timestamp).abs() <= tolerance
        })
    }
}
