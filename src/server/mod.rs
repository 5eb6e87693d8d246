//! TCP server plumbing shared by the tracker and the peer
//!
//! The listener accepts connections, hands each one its own task and a
//! session ID, and passes the socket to a [`ConnectionHandler`]. Handler
//! errors end only that connection.

pub mod config;
pub mod handler;
pub mod listener;

pub use config::ServerConfig;
pub use handler::{ConnectionContext, ConnectionHandler};
pub use listener::Server;
