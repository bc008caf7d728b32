//! Deterministic simulation harness for the chat client stack.
//!
//! In-process implementations of the app's [`irie_app::Driver`] and of the
//! chat hub, driven by a virtual clock. Whole sessions run reproducibly
//! under the same [`irie_app::Runtime`] orchestration as production, with a
//! [`SimDriver`] in place of the terminal and a [`SimServer`] in place of
//! the real hub.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use sim_driver::{SimDriver, SimDriverError, SimProbe, SimStep};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{PAGE_SIZE, SharedSimServer, SimServer, create_shared_server};
