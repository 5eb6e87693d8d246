//! Tracker: rendezvous service mapping peers to their catalogs
//!
//! Answers `REGISTER` and `QUERY` against a shared [`PeerRegistry`], one
//! request per connection.
//!
//! [`PeerRegistry`]: crate::registry::PeerRegistry

pub mod client;
pub mod handler;

use std::sync::Arc;

pub use client::TrackerClient;
pub use handler::TrackerHandler;

use crate::registry::PeerRegistry;
use crate::server::{Server, ServerConfig};

/// Tracker server
pub type TrackerServer = Server<TrackerHandler>;

impl Server<TrackerHandler> {
    /// Create a tracker with an empty registry
    pub fn tracker(config: ServerConfig) -> Self {
        let handler = TrackerHandler::new(Arc::new(PeerRegistry::new()), config.max_line_length);
        Server::new(config, handler)
    }

    /// Get the tracker's registry
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        self.handler().registry()
    }
}
