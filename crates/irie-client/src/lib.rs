//! Backend connectivity for the IrieSphere chat client.
//!
//! The pure state machines in [`irie_core`] know nothing about HTTP or
//! WebSockets; this crate supplies that edge. [`Friend`] models the roster
//! the REST API serves, and with the `transport` feature enabled the crate
//! also provides the I/O itself:
//!
//! - [`session::Session`]: cookie-authenticated REST client (login,
//!   auth check, logout, friends list)
//! - [`transport::connect`]: the chat WebSocket, bridged to channels
//!
//! The split keeps the default build dependency-light so state-machine
//! consumers (the app layer, the simulation harness) never pull in tokio or
//! TLS stacks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod friend;

#[cfg(feature = "transport")]
pub mod session;
#[cfg(feature = "transport")]
pub mod transport;

pub use friend::Friend;
pub use irie_core::ConversationDescriptor;
#[cfg(feature = "transport")]
pub use session::{Session, SessionError};
