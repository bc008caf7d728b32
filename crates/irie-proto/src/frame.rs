//! Frame types and codecs for the chat socket.
//!
//! Every frame is one JSON object with an `action` discriminator. Key
//! spellings follow the backend exactly (`recipientID`, `user`, `page`,
//! `data`); a mismatch here is invisible until a live server ignores us.
//!
//! # Invariants
//!
//! - Unknown `action` values decode to an error, never a panic; callers drop
//!   the frame and keep the session.
//! - Unknown fields inside a known frame are tolerated (the backend forwards
//!   the sender's payload verbatim plus its own additions, so inbound
//!   `send_message` frames still carry the sender's `recipientID`).
//! - One transport payload may hold several frames separated by `\n`: the
//!   backend write pump batches queued frames into a single text message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ProtocolError, UserId};

/// One historical message row, as returned inside `chat_history`.
///
/// `receiver` is present in backend rows but optional here so a trimmed-down
/// peer still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Database row id. Strictly increasing with insertion order.
    pub id: i64,

    /// Message body.
    pub text: String,

    /// Account that authored the message.
    pub sender: UserId,

    /// Account the message was addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserId>,

    /// Row creation time, in the SQL wire format on real backends.
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// A frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Inbound {
    /// A live direct message forwarded by the hub. The hub only forwards to
    /// the recipient, never back to the author, and it does not attach the
    /// stored row id.
    #[serde(rename = "send_message")]
    Message {
        /// Author of the message.
        sender: UserId,
        /// Message body.
        content: String,
        /// Server receive time, RFC 3339.
        #[serde(with = "crate::timestamp")]
        timestamp: DateTime<Utc>,
        /// Row id, absent on every observed backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
    },

    /// One page of history rows, newest first. An empty page means the
    /// requested offset is past the end of the conversation.
    #[serde(rename = "chat_history")]
    History {
        /// The rows. Backends encode an exhausted page as `[]` or `null`.
        #[serde(default, deserialize_with = "null_as_empty")]
        content: Vec<HistoryEntry>,
    },

    /// Broadcast: an account connected to the hub.
    #[serde(rename = "newUser")]
    UserOnline {
        /// The account that came online.
        data: UserId,
    },

    /// Broadcast: an account disconnected from the hub.
    #[serde(rename = "disconnectUser")]
    UserOffline {
        /// The account that went offline.
        data: UserId,
    },
}

/// A frame sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Outbound {
    /// Direct message to one recipient.
    #[serde(rename = "send_message")]
    Message {
        /// Target account.
        #[serde(rename = "recipientID")]
        recipient_id: UserId,
        /// Message body.
        content: String,
    },

    /// Request one page of history for the conversation with `user`.
    /// Pages start at 1.
    #[serde(rename = "fetch_chat_history")]
    FetchHistory {
        /// Conversation counterpart.
        user: UserId,
        /// 1-based page number.
        page: u32,
    },
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<HistoryEntry>>::deserialize(deserializer)?;
    Ok(rows.unwrap_or_default())
}

/// Decode a single JSON frame.
///
/// # Errors
///
/// [`ProtocolError::Decode`] for anything that is not exactly one known
/// frame.
pub fn decode_frame(text: &str) -> Result<Inbound, ProtocolError> {
    serde_json::from_str(text).map_err(|err| ProtocolError::Decode { reason: err.to_string() })
}

/// Decode every frame in one transport payload.
///
/// Payloads are split on newlines before decoding because the backend write
/// pump coalesces queued frames. Blank lines are skipped; each remaining line
/// decodes independently so one bad frame never poisons its neighbors.
pub fn decode_payload(payload: &str) -> Vec<Result<Inbound, ProtocolError>> {
    payload
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_frame)
        .collect()
}

/// Encode one outbound frame as a JSON text payload.
///
/// # Errors
///
/// [`ProtocolError::Encode`] if serialization fails.
pub fn encode_frame(frame: &Outbound) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(|err| ProtocolError::Encode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_live_message_without_id() {
        // Shape the hub actually forwards: the sender's payload plus
        // `sender` and `timestamp`.
        let raw = r#"{"action":"send_message","recipientID":7,"content":"hi","timestamp":"2024-05-06T12:30:00+03:00","sender":42}"#;
        let frame = decode_frame(raw).unwrap();
        match frame {
            Inbound::Message { sender, content, id, .. } => {
                assert_eq!(sender, UserId(42));
                assert_eq!(content, "hi");
                assert_eq!(id, None);
            },
            other => panic!("expected live message, got {other:?}"),
        }
    }

    #[test]
    fn decodes_history_page() {
        let raw = r#"{"action":"chat_history","content":[
            {"id":12,"sender":42,"receiver":7,"text":"later","timestamp":"2024-05-06 12:31:00"},
            {"id":11,"sender":7,"receiver":42,"text":"earlier","timestamp":"2024-05-06 12:30:00"}
        ]}"#;
        let frame = decode_frame(raw).unwrap();
        match frame {
            Inbound::History { content } => {
                assert_eq!(content.len(), 2);
                assert_eq!(content[0].id, 12);
                assert_eq!(content[1].sender, UserId(7));
                assert_eq!(content[1].receiver, Some(UserId(42)));
            },
            other => panic!("expected history, got {other:?}"),
        }
    }

    #[test]
    fn history_null_content_is_empty_page() {
        let frame = decode_frame(r#"{"action":"chat_history","content":null}"#).unwrap();
        assert_eq!(frame, Inbound::History { content: vec![] });

        let frame = decode_frame(r#"{"action":"chat_history","content":[]}"#).unwrap();
        assert_eq!(frame, Inbound::History { content: vec![] });
    }

    #[test]
    fn decodes_presence_broadcasts() {
        let online = decode_frame(r#"{"action":"newUser","data":9}"#).unwrap();
        assert_eq!(online, Inbound::UserOnline { data: UserId(9) });

        let offline = decode_frame(r#"{"action":"disconnectUser","data":9}"#).unwrap();
        assert_eq!(offline, Inbound::UserOffline { data: UserId(9) });
    }

    #[test]
    fn unknown_action_is_a_decode_error() {
        let result = decode_frame(r#"{"action":"typing_indicator","user":3}"#);
        assert!(matches!(result, Err(ProtocolError::Decode { .. })));
    }

    #[test]
    fn missing_action_is_a_decode_error() {
        assert!(decode_frame(r#"{"content":"hi"}"#).is_err());
        assert!(decode_frame("not json").is_err());
    }

    #[test]
    fn payload_splits_on_newlines() {
        let payload = concat!(
            r#"{"action":"newUser","data":1}"#,
            "\n",
            r#"{"action":"garbage"}"#,
            "\n\n",
            r#"{"action":"disconnectUser","data":1}"#,
        );
        let frames = decode_payload(payload);
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_ok());
        assert!(frames[1].is_err());
        assert!(frames[2].is_ok());
    }

    #[test]
    fn encodes_outbound_with_backend_key_spellings() {
        let send = Outbound::Message { recipient_id: UserId(7), content: "hello".to_string() };
        let json = encode_frame(&send).unwrap();
        assert!(json.contains(r#""action":"send_message""#));
        assert!(json.contains(r#""recipientID":7"#));

        let fetch = Outbound::FetchHistory { user: UserId(7), page: 1 };
        let json = encode_frame(&fetch).unwrap();
        assert!(json.contains(r#""action":"fetch_chat_history""#));
        assert!(json.contains(r#""user":7"#));
        assert!(json.contains(r#""page":1"#));
    }
}
