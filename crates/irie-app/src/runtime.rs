//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine over the chat client
//! - [`Driver`]: platform-specific I/O

use irie_proto::decode_payload;

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
///
/// One cycle polls input, drains buffered server payloads, and watches the
/// transport. All state changes flow through [`App::handle`] or the app API
/// called from the driver's input handling; the runtime only executes the
/// returned actions.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App<D::Env>,
    link_up: bool,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime from a driver and an app.
    pub fn new(driver: D, app: App<D::Env>) -> Self {
        Self { driver, app, link_up: false }
    }

    /// Run the main event loop.
    ///
    /// Connects, then cycles until an action asks to quit or the driver
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot connect, render, or poll.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        self.driver.connect().await?;
        self.link_up = true;

        let actions = self.app.handle(AppEvent::TransportOpened);
        if !self.process_actions(actions).await? {
            loop {
                if self.process_cycle().await? {
                    break;
                }
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_event(&mut self.app).await?;
        if self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(payload) = self.driver.recv_payload().await {
            for decoded in decode_payload(&payload) {
                match decoded {
                    Ok(frame) => {
                        let actions = self.app.handle(AppEvent::FrameReceived(frame));
                        if self.process_actions(actions).await? {
                            return Ok(true);
                        }
                    },
                    Err(error) => tracing::warn!(%error, "discarding undecodable frame"),
                }
            }
        }

        if self.link_up && !self.driver.is_connected() {
            self.link_up = false;
            let actions =
                self.app.handle(AppEvent::TransportClosed { reason: "connection lost".to_string() });
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Execute actions returned by the App.
    ///
    /// Renders at most once per batch, after sends. Returns `true` if the
    /// application should quit.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut quit = false;
        let mut render = false;

        for action in actions {
            match action {
                AppAction::Transmit(frame) => {
                    if let Err(error) = self.driver.send_frame(frame).await {
                        // The link check in the next cycle turns a dead
                        // socket into a TransportClosed event.
                        tracing::warn!(%error, "failed to send frame");
                    }
                },
                AppAction::Render => render = true,
                AppAction::Quit => quit = true,
            }
        }

        if render {
            self.driver.render(&self.app)?;
        }
        Ok(quit)
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App<D::Env> {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App<D::Env> {
        &mut self.app
    }
}
