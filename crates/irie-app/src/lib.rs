//! Application layer for the IrieSphere chat client.
//!
//! Sits between the pure state machines in `irie-core` and the frontends:
//! [`App`] turns input and transport events into actions, [`Runtime`]
//! executes those actions against a platform [`Driver`]. The same runtime
//! drives the terminal client and the deterministic simulation harness.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod app;
pub mod driver;
pub mod event;
pub mod input;
pub mod runtime;
pub mod viewport;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use runtime::Runtime;
pub use viewport::Viewport;
