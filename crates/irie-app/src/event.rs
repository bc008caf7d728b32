//! Events fed into the application state machine.

use irie_proto::Inbound;

/// External events the [`crate::App`] reacts to.
///
/// Key handling does not go through here: frontends own their input state
/// and call the [`crate::App`] API directly, so only transport-originated
/// events and the timer cadence arrive as `AppEvent`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The websocket completed its handshake.
    TransportOpened,

    /// The websocket is gone and will not come back on its own.
    TransportClosed {
        /// Why the transport closed, for the status line.
        reason: String,
    },

    /// A decoded frame arrived from the server.
    FrameReceived(Inbound),

    /// Periodic timer for timeout bookkeeping and repaints.
    Tick,
}
