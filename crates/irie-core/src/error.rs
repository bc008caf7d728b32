//! Error types for the client state machines.
//!
//! Nothing here is fatal to the session. Frame-level problems are handled by
//! dropping the frame; these errors cover misuse of the state machine API
//! (caller bugs) and rejected user operations.

use irie_proto::UserId;
use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors from the connection lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Invalid state transition attempted.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred.
        state: ConnectionState,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

/// Errors from user-initiated chat operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Message text was empty after trimming.
    #[error("refusing to send an empty message")]
    EmptyMessage,

    /// Operation targeted a conversation that is not open.
    #[error("no open conversation with user {0}")]
    UnknownConversation(UserId),
}
