//! Socket lifecycle state machine.
//!
//! Tracks the single WebSocket a session owns and solves the not-yet-open
//! problem: frames submitted before the handshake finishes are queued and
//! flushed in order once the transport opens. Uses the action pattern:
//! methods take time as input and return actions for the driver to execute,
//! keeping the state machine pure and trivially testable.
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐  handshake_complete  ┌──────┐
//! │ Connecting │─────────────────────>│ Open │
//! └────────────┘                      └──────┘
//!       │                                │
//!       │ timeout / peer close           │ peer close
//!       ↓                                ↓
//!  ┌────────┐                       ┌────────┐
//!  │ Closed │                       │ Closed │
//!  └────────┘                       └────────┘
//! ```
//!
//! `Closed` is terminal. There is no reconnect here: a new session builds a
//! new `Connection`.

use std::{
    collections::VecDeque,
    ops::Sub,
    time::{Duration, Instant},
};

use irie_proto::Outbound;

use crate::error::ConnectionError;

/// Time allowed for the WebSocket handshake to complete.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Actions returned by the connection state machine.
///
/// The driver executes these:
/// - `Transmit`: encode and send the frame over the transport
/// - `Close`: the session is over for the given reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Send this frame to the server.
    Transmit(Outbound),

    /// The connection ended; halt chat operation.
    Close {
        /// Why the connection ended.
        reason: String,
    },
}

/// Outcome of handing one frame to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The connection is open; send the frame now.
    Sent(Outbound),
    /// Handshake still pending; the frame is queued for the open flush.
    Queued,
    /// The connection is closed; the frame was dropped.
    Dropped,
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport handshake in progress.
    Connecting,
    /// Frames flow in both directions.
    Open,
    /// Terminal. Covers graceful close, errors, and handshake timeout.
    Closed,
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum time to sit in `Connecting` before giving up.
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }
}

/// Lifecycle state machine for the session's one socket.
///
/// Pure state: no I/O, no stored environment. Time is passed as parameters
/// to the methods that need it. Generic over `Instant` so tests can drive a
/// virtual clock.
#[derive(Debug, Clone)]
pub struct Connection<I = Instant>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    state: ConnectionState,
    config: ConnectionConfig,
    /// When the current state was entered; drives the connect timeout.
    since: I,
    /// Frames accepted while `Connecting`, flushed in order on open.
    queued: VecDeque<Outbound>,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a connection in [`ConnectionState::Connecting`].
    pub fn new(now: I, config: ConnectionConfig) -> Self {
        Self { state: ConnectionState::Connecting, config, since: now, queued: VecDeque::new() }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True once the handshake completed and the connection has not closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Number of frames waiting for the open flush.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    /// Transport handshake finished; flush everything queued, in order.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::InvalidState`] unless currently `Connecting`.
    pub fn handshake_complete(
        &mut self,
        now: I,
    ) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if self.state != ConnectionState::Connecting {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "complete handshake",
            });
        }

        self.state = ConnectionState::Open;
        self.since = now;

        Ok(self.queued.drain(..).map(ConnectionAction::Transmit).collect())
    }

    /// Submit one outbound frame.
    ///
    /// Open connections transmit immediately; connecting ones queue; closed
    /// ones drop. The caller decides whether a drop is worth surfacing.
    pub fn dispatch(&mut self, frame: Outbound) -> Dispatch {
        match self.state {
            ConnectionState::Open => Dispatch::Sent(frame),
            ConnectionState::Connecting => {
                self.queued.push_back(frame);
                Dispatch::Queued
            },
            ConnectionState::Closed => Dispatch::Dropped,
        }
    }

    /// The transport reported a close or error. Terminal; queued frames are
    /// discarded. Idempotent: a second report produces no actions.
    pub fn peer_closed(&mut self, reason: impl Into<String>) -> Vec<ConnectionAction> {
        if self.state == ConnectionState::Closed {
            return vec![];
        }
        self.state = ConnectionState::Closed;
        self.queued.clear();
        vec![ConnectionAction::Close { reason: reason.into() }]
    }

    /// Elapsed time past the connect deadline, if exceeded. `None` otherwise.
    #[must_use]
    pub fn check_timeout(&self, now: I) -> Option<Duration> {
        if self.state != ConnectionState::Connecting {
            return None;
        }
        let elapsed = now - self.since;
        if elapsed > self.config.connect_timeout { Some(elapsed) } else { None }
    }

    /// Periodic maintenance: closes a connection stuck in `Connecting`.
    pub fn tick(&mut self, now: I) -> Vec<ConnectionAction> {
        let Some(elapsed) = self.check_timeout(now) else {
            return vec![];
        };

        self.state = ConnectionState::Closed;
        self.queued.clear();
        vec![ConnectionAction::Close { reason: format!("connect timeout after {elapsed:?}") }]
    }
}
