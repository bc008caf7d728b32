//! Terminal UI for IrieSphere chat.
//!
//! A thin shell over [`irie_app::Driver`] that provides terminal-specific
//! I/O: crossterm for key events, ratatui for rendering, and the websocket
//! transport from `irie-client`. All orchestration logic lives in the
//! generic [`irie_app::Runtime`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod commands;
pub mod input;
pub mod system_env;
pub mod terminal;
pub mod ui;

pub use input::InputState;
pub use irie_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
