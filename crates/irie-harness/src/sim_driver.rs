//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`irie_app::Runtime`] orchestration code runs in both production and
//! simulation, with a scripted user and an in-process hub in place of a
//! keyboard and a websocket.

#![allow(clippy::unwrap_used, reason = "Lock poisoning aborts the harness")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use irie_app::{App, AppAction, AppEvent, Driver};
use irie_proto::{Outbound, encode_frame};

use crate::{sim_env::SimEnv, sim_server::SharedSimServer};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// One scripted user action.
///
/// Steps run one per poll, so every step sees the frames that arrived
/// since the previous one.
#[derive(Debug, Clone)]
pub enum SimStep {
    /// Open a conversation window by friend name.
    Open(String),
    /// Send a message in the focused window.
    Send(String),
    /// Close the focused window.
    CloseActive,
    /// Cycle focus to the next window.
    FocusNext,
    /// Scroll the focused window up by this many entries.
    ScrollUp(usize),
    /// Scroll the focused window down by this many entries.
    ScrollDown(usize),
    /// Advance virtual time and deliver a tick.
    Advance(Duration),
    /// Kill the link without telling the app.
    SeverLink,
}

/// Shared state between the driver and its probe.
///
/// The runtime consumes the driver, so assertions after a run go through
/// a [`SimProbe`] holding the same state.
#[derive(Default)]
struct SharedState {
    script: VecDeque<SimStep>,
    incoming: VecDeque<String>,
    outgoing: Vec<Outbound>,
    connected: bool,
    renders: usize,
    idle_polls: u8,
}

/// Simulation driver for deterministic testing.
///
/// Feeds a script of [`SimStep`]s to the app one poll at a time, pumps
/// payloads between the app and an optional [`SimServer`](crate::SimServer),
/// and quits on its own once the script is spent and the wires are quiet.
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
    server: Option<SharedSimServer>,
}

impl SimDriver {
    /// Create a driver on the given virtual clock, with no script and no
    /// hub.
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::new(Mutex::new(SharedState::default())), server: None }
    }

    /// Attach an in-process hub. Sent frames are delivered to it and its
    /// outbox is pumped into the receive path.
    #[must_use]
    pub fn with_server(mut self, server: SharedSimServer) -> Self {
        self.server = Some(server);
        self
    }

    /// Queue scripted user actions.
    #[must_use]
    pub fn with_script(self, steps: impl IntoIterator<Item = SimStep>) -> Self {
        self.state.lock().unwrap().script.extend(steps);
        self
    }

    /// A handle for inspecting driver state after the runtime consumed the
    /// driver.
    pub fn probe(&self) -> SimProbe {
        SimProbe { state: Arc::clone(&self.state) }
    }

    /// Pump the hub outbox into the receive buffer.
    fn pump_server(&self) {
        let Some(server) = &self.server else { return };
        let payloads = server.lock().unwrap().drain_outbox();
        if !payloads.is_empty() {
            self.state.lock().unwrap().incoming.extend(payloads);
        }
    }
}

/// Inspection handle over a [`SimDriver`]'s shared state.
pub struct SimProbe {
    state: Arc<Mutex<SharedState>>,
}

impl SimProbe {
    /// Frames that reached the wire, in send order.
    pub fn outgoing(&self) -> Vec<Outbound> {
        self.state.lock().unwrap().outgoing.clone()
    }

    /// Number of render calls.
    pub fn renders(&self) -> usize {
        self.state.lock().unwrap().renders
    }

    /// Whether the link was up when the run ended.
    pub fn connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    /// Queue a raw payload as if the server pushed it.
    pub fn inject_payload(&self, payload: impl Into<String>) {
        self.state.lock().unwrap().incoming.push_back(payload.into());
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Env = SimEnv;

    async fn poll_event(&mut self, app: &mut App<SimEnv>) -> Result<Vec<AppAction>, Self::Error> {
        self.pump_server();

        let step = self.state.lock().unwrap().script.pop_front();
        if let Some(step) = step {
            return Ok(match step {
                SimStep::Open(name) => app.open_conversation(&name),
                SimStep::Send(text) => app.send_active(&text),
                SimStep::CloseActive => app.close_active(),
                SimStep::FocusNext => app.focus_next(),
                SimStep::ScrollUp(lines) => app.scroll_up(lines),
                SimStep::ScrollDown(lines) => app.scroll_down(lines),
                SimStep::Advance(duration) => {
                    self.env.advance(duration);
                    app.handle(AppEvent::Tick)
                },
                SimStep::SeverLink => {
                    self.state.lock().unwrap().connected = false;
                    Vec::new()
                },
            });
        }

        // Script spent. Poll idle a couple of times so frames in flight
        // land and the runtime's link check runs, then quit on its own.
        // Payloads buffered behind a severed link will never drain and do
        // not count as pending work.
        let mut state = self.state.lock().unwrap();
        if state.incoming.is_empty() || !state.connected {
            state.idle_polls += 1;
            if state.idle_polls >= 2 {
                return Ok(app.quit());
            }
        } else {
            state.idle_polls = 0;
        }
        Ok(Vec::new())
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        self.state.lock().unwrap().connected = true;
        Ok(())
    }

    async fn send_frame(&mut self, frame: Outbound) -> Result<(), Self::Error> {
        {
            let mut state = self.state.lock().unwrap();
            if !state.connected {
                return Err(SimDriverError("link severed".to_string()));
            }
            state.outgoing.push(frame.clone());
        }

        if let Some(server) = &self.server {
            let payload =
                encode_frame(&frame).map_err(|error| SimDriverError(error.to_string()))?;
            server.lock().unwrap().handle_payload(&payload);
        }
        Ok(())
    }

    async fn recv_payload(&mut self) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return None;
        }
        state.incoming.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    fn render(&mut self, _app: &App<SimEnv>) -> Result<(), Self::Error> {
        self.state.lock().unwrap().renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().connected = false;
    }
}
