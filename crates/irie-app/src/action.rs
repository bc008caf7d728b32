//! Actions the application asks the runtime to perform.

use irie_proto::Outbound;

/// Instructions returned by [`crate::App::handle`] and the [`crate::App`]
/// API methods for the [`crate::Runtime`] to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Encode and send a frame over the websocket.
    Transmit(Outbound),

    /// Repaint the UI from current state.
    Render,

    /// Shut down the runtime.
    Quit,
}
