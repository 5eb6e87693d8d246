//! Peer: announces its catalog and serves songs to other peers
//!
//! On the first `REQUEST_SONG` for a song the source file is transcoded into
//! an HLS playlist in the output directory; later requests reuse it.

pub mod catalog;
pub mod client;
pub mod config;
pub mod handler;

use std::sync::Arc;

pub use catalog::SharedCatalog;
pub use client::{fetch_playlist, fetch_segment, register_with_tracker, SongResponse};
pub use config::PeerConfig;
pub use handler::PeerHandler;

use crate::catalog::Catalog;
use crate::server::Server;
use crate::transcode::{TranscodeCache, Transcoder};

/// Peer content server
pub type PeerServer<T> = Server<PeerHandler<T>>;

impl<T: Transcoder> Server<PeerHandler<T>> {
    /// Create a peer serving `catalog` through `transcoder`
    pub fn peer(config: &PeerConfig, catalog: Catalog, transcoder: T) -> Self {
        let handler = PeerHandler::new(
            Arc::new(SharedCatalog::new(catalog)),
            Arc::new(TranscodeCache::new(transcoder, config.output_dir.clone())),
            config.server.max_line_length,
        );
        Server::new(config.server.clone(), handler)
    }

    /// Announce the current catalog to the tracker
    pub async fn register_with_tracker(&self, tracker_addr: &str, config: &PeerConfig) -> bool {
        let catalog = self.handler().catalog().snapshot().await;
        register_with_tracker(tracker_addr, &config.announced_addr(), &catalog).await
    }
}
