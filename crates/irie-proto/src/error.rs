//! Protocol error types.
//!
//! Decode failures are per-frame and never fatal: the socket layer drops the
//! offending frame and keeps the session alive. Errors carry the raw material
//! as text so the failure is diagnosable from logs alone.

use thiserror::Error;

/// Errors produced while encoding or decoding wire frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Inbound text that is not a known frame (bad JSON, unknown `action`,
    /// or mismatched fields).
    #[error("undecodable frame: {reason}")]
    Decode {
        /// Decoder failure, including the unknown `action` if that was the
        /// cause.
        reason: String,
    },

    /// An outbound frame failed to serialize.
    #[error("frame encoding failed: {0}")]
    Encode(String),

    /// A timestamp string matching neither wire format.
    #[error("unparseable timestamp: {0:?}")]
    Timestamp(String),
}
