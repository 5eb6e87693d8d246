//! # songswarm
//!
//! A tracker and peer pair for swapping songs as HLS playlists.
//!
//! Peers announce their catalogs to a [`tracker`]; other peers ask the
//! tracker who holds a song and then fetch it straight from that [`peer`],
//! which transcodes the source into segments the first time it is asked.
//!
//! ```no_run
//! use songswarm::server::ServerConfig;
//! use songswarm::TrackerServer;
//!
//! # async fn example() -> songswarm::Result<()> {
//! let tracker = TrackerServer::tracker(ServerConfig::default());
//! tracker.run().await
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod logging;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tracker;
pub mod transcode;

pub use catalog::{Catalog, PeerAddress, SongLocator};
pub use error::{Error, Result};
pub use peer::{PeerConfig, PeerServer};
pub use registry::PeerRegistry;
pub use server::{Server, ServerConfig};
pub use tracker::{TrackerClient, TrackerServer};
pub use transcode::{FfmpegConfig, FfmpegTranscoder, Transcoder};
