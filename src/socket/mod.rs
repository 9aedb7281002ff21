//! Socket lifecycle management
//!
//! [`ListeningSocket`] binds a port and accepts connections;
//! [`ConnectedSocket`] represents one established connection, whether it
//! was accepted or initiated locally. Every operation reports failure as a
//! [`crate::SocketError`] value.

pub mod config;
pub mod connected;
pub mod listener;
pub mod port;
pub mod shutdown;
pub(crate) mod state;
mod sys;

pub use config::SocketConfig;
pub use connected::{ConnectedSocket, Role};
pub use listener::ListeningSocket;
pub use port::validate_port;
pub use shutdown::ShutdownHandle;
