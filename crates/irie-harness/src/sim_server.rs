//! In-process stand-in for the chat hub.
//!
//! `SimServer` models the parts of the hub the client can observe: it
//! stores rows for messages, serves history pages newest first, forwards
//! peer messages without row ids, and broadcasts presence. It never echoes
//! a client's own message back, matching the real hub.

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use irie_proto::{HistoryEntry, Inbound, Outbound, UserId};

/// Rows per history page, matching the real hub.
pub const PAGE_SIZE: usize = 10;

/// One stored message row.
struct StoredRow {
    id: i64,
    sender: UserId,
    receiver: UserId,
    text: String,
    timestamp: DateTime<Utc>,
}

/// Simulated hub for a single client socket.
///
/// Payloads from the client go in through [`SimServer::handle_payload`];
/// everything addressed to the client accumulates in an outbox the driver
/// drains. Tests script the rest of the world with the `peer_*` methods.
pub struct SimServer {
    client: UserId,
    rows: Vec<StoredRow>,
    next_id: i64,
    online: HashSet<UserId>,
    outbox: VecDeque<String>,
}

impl SimServer {
    /// Create a hub with one connected client and no history.
    pub fn new(client: UserId) -> Self {
        Self {
            client,
            rows: Vec::new(),
            next_id: 1,
            online: HashSet::new(),
            outbox: VecDeque::new(),
        }
    }

    /// Process one payload from the client socket.
    pub fn handle_payload(&mut self, payload: &str) {
        let frame: Outbound = match serde_json::from_str(payload.trim()) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(%error, "sim hub ignoring undecodable payload");
                return;
            },
        };

        match frame {
            Outbound::Message { recipient_id, content } => {
                // Stored for history, never echoed to the author.
                self.store(self.client, recipient_id, content);
            },
            Outbound::FetchHistory { user, page } => self.serve_page(user, page),
        }
    }

    /// Insert a stored row without notifying anyone. Returns the row id.
    pub fn seed_row(&mut self, sender: UserId, receiver: UserId, text: &str) -> i64 {
        self.store(sender, receiver, text.to_string())
    }

    /// A peer sends the client a message: store it and forward it live,
    /// without the row id, like the real hub.
    pub fn peer_message(&mut self, from: UserId, text: &str) {
        let id = self.store(from, self.client, text.to_string());
        let timestamp = row_time(id);
        self.emit(&Inbound::Message {
            sender: from,
            content: text.to_string(),
            timestamp,
            id: None,
        });
    }

    /// A peer connects to the hub.
    pub fn peer_online(&mut self, user: UserId) {
        self.online.insert(user);
        self.emit(&Inbound::UserOnline { data: user });
    }

    /// A peer disconnects from the hub.
    pub fn peer_offline(&mut self, user: UserId) {
        self.online.remove(&user);
        self.emit(&Inbound::UserOffline { data: user });
    }

    /// Take the payloads queued for the client socket.
    pub fn drain_outbox(&mut self) -> Vec<String> {
        self.outbox.drain(..).collect()
    }

    /// Texts stored for the conversation between the client and `user`,
    /// oldest first.
    pub fn stored_texts(&self, user: UserId) -> Vec<String> {
        self.pair_rows(user).map(|row| row.text.clone()).collect()
    }

    fn store(&mut self, sender: UserId, receiver: UserId, text: String) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(StoredRow { id, sender, receiver, text, timestamp: row_time(id) });
        id
    }

    fn serve_page(&mut self, user: UserId, page: u32) {
        let skip = (page.saturating_sub(1) as usize).saturating_mul(PAGE_SIZE);
        let mut newest_first: Vec<&StoredRow> = self.pair_rows(user).collect();
        newest_first.sort_by(|a, b| b.id.cmp(&a.id));

        let content: Vec<HistoryEntry> = newest_first
            .into_iter()
            .skip(skip)
            .take(PAGE_SIZE)
            .map(|row| HistoryEntry {
                id: row.id,
                text: row.text.clone(),
                sender: row.sender,
                receiver: Some(row.receiver),
                timestamp: row.timestamp,
            })
            .collect();

        self.emit(&Inbound::History { content });
    }

    fn pair_rows(&self, user: UserId) -> impl Iterator<Item = &StoredRow> {
        self.rows.iter().filter(move |row| {
            (row.sender == self.client && row.receiver == user)
                || (row.sender == user && row.receiver == self.client)
        })
    }

    fn emit(&mut self, frame: &Inbound) {
        match serde_json::to_string(frame) {
            Ok(payload) => self.outbox.push_back(payload),
            Err(error) => tracing::warn!(%error, "sim hub failed to encode frame"),
        }
    }
}

/// Shared handle so a test and a driver can both reach the hub.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a hub behind a shared handle.
pub fn create_shared_server(client: UserId) -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new(client)))
}

fn row_time(id: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + chrono::Duration::seconds(id)
}
