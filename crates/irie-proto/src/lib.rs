//! Wire protocol for the IrieSphere chat socket.
//!
//! The backend speaks JSON text frames over a single WebSocket, discriminated
//! by an `action` field. This crate owns the frame types, the two timestamp
//! formats the backend emits, and the id types shared by every layer above.
//!
//! Frames that do not match a known `action` are a decode error here; callers
//! ignore them rather than failing the session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod id;
pub mod timestamp;

pub use error::ProtocolError;
pub use frame::{HistoryEntry, Inbound, Outbound, decode_frame, decode_payload, encode_frame};
pub use id::{MessageId, UserId};
