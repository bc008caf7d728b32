//! Pure state machines for the IrieSphere chat client.
//!
//! Everything in this crate follows the action pattern: methods take the
//! current time as a parameter and return actions for a driver to execute.
//! No I/O, no clocks, no logging side effects. The same code runs under the
//! terminal client and under deterministic simulation tests.
//!
//! # Components
//!
//! - [`Connection`]: socket lifecycle (`Connecting → Open → Closed`) with a
//!   pending-send queue
//! - [`Conversation`]: one ordered message buffer with pagination state
//! - [`Roster`]: the open-conversation set, unread counters, online set
//! - [`ChatClient`]: routes inbound frames, issues history fetches, composes
//!   outbound messages
//! - [`Environment`]: time abstraction for drivers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod connection;
mod conversation;
mod env;
mod error;
mod roster;

pub use client::{
    ChatClient, ChatConfig, ClientAction, DEFAULT_FETCH_TIMEOUT, DEFAULT_RECONCILE_WINDOW,
};
pub use connection::{
    Connection, ConnectionAction, ConnectionConfig, ConnectionState, DEFAULT_CONNECT_TIMEOUT,
    Dispatch,
};
pub use conversation::{
    Conversation, ConversationDescriptor, Direction, InsertOutcome, Message,
};
pub use env::Environment;
pub use error::{ClientError, ConnectionError};
pub use roster::Roster;
