//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use irie_core::Environment;
use irie_proto::Outbound;

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic, so the same
/// orchestration code runs against the real terminal and websocket and
/// under deterministic simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for key events, tungstenite for the websocket
/// - **Simulation**: scripted events and captured frames, virtual time
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time source shared with the [`App`]. Virtual in simulation.
    type Env: Environment;

    /// Poll for input, feed it to the app, and return the resulting
    /// actions.
    ///
    /// Returns an empty vector when no input is ready. Implementations own
    /// their text-editing state, which is why the app is handed in rather
    /// than events handed out.
    fn poll_event(
        &mut self,
        app: &mut App<Self::Env>,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Establish the server connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Encode and send a frame to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the send fails.
    fn send_frame(&mut self, frame: Outbound) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Take the next raw payload from the server, if one is buffered.
    ///
    /// A payload may hold several newline-separated frames; the runtime
    /// does the decoding.
    fn recv_payload(&mut self) -> impl Future<Output = Option<String>> + Send;

    /// Whether the server connection is still up.
    fn is_connected(&self) -> bool;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App<Self::Env>) -> Result<(), Self::Error>;

    /// Stop the connection and clean up resources.
    fn stop(&mut self);
}
