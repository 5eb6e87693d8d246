//! Peer configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::catalog::PeerAddress;
use crate::protocol::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_PEER_PORT};
use crate::server::ServerConfig;

/// Peer configuration options
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Listener settings for the content server
    pub server: ServerConfig,

    /// Address announced to the tracker (defaults to the bind address)
    pub advertise_addr: Option<PeerAddress>,

    /// Directory holding generated playlists and segments
    pub output_dir: PathBuf,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_addr(SocketAddr::from((
                Ipv4Addr::UNSPECIFIED,
                DEFAULT_PEER_PORT,
            ))),
            advertise_addr: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl PeerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            server: ServerConfig::with_addr(addr),
            ..Default::default()
        }
    }

    /// Set the address announced to the tracker
    pub fn advertise(mut self, addr: impl Into<PeerAddress>) -> Self {
        self.advertise_addr = Some(addr.into());
        self
    }

    /// Set the playlist output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.server = self.server.max_connections(max);
        self
    }

    /// Address other peers should dial
    ///
    /// Falls back to the bind address, which is useless to remote peers when
    /// it is a wildcard like `0.0.0.0`; that case is logged.
    pub fn announced_addr(&self) -> PeerAddress {
        if let Some(addr) = &self.advertise_addr {
            return addr.clone();
        }
        if self.announces_unspecified() {
            tracing::warn!(
                bind = %self.server.bind_addr,
                "Announcing a wildcard address other peers cannot dial; set an advertise address"
            );
        }
        PeerAddress::new(self.server.bind_addr.to_string())
    }

    /// Whether the announced address would be the wildcard bind address
    pub fn announces_unspecified(&self) -> bool {
        self.advertise_addr.is_none() && self.server.bind_addr.ip().is_unspecified()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PeerConfig::default();

        assert_eq!(config.server.bind_addr.port(), DEFAULT_PEER_PORT);
        assert_eq!(config.output_dir, PathBuf::from("playlist"));
        assert!(config.advertise_addr.is_none());
    }

    #[test]
    fn test_announced_addr_falls_back_to_bind() {
        let addr: SocketAddr = "127.0.0.1:8001".parse().unwrap();
        let config = PeerConfig::with_addr(addr);
        assert_eq!(config.announced_addr(), PeerAddress::from("127.0.0.1:8001"));

        let config = config.advertise("music.example:8001");
        assert_eq!(config.announced_addr(), PeerAddress::from("music.example:8001"));
    }

    #[test]
    fn test_wildcard_bind_is_flagged() {
        let config = PeerConfig::default();
        assert!(config.announces_unspecified());
        assert_eq!(config.announced_addr(), PeerAddress::from("0.0.0.0:8001"));

        let config = config.advertise("10.0.0.5:8001");
        assert!(!config.announces_unspecified());

        let loopback: SocketAddr = "127.0.0.1:8001".parse().unwrap();
        assert!(!PeerConfig::with_addr(loopback).announces_unspecified());
    }

    #[test]
    fn test_builder_chaining() {
        let config = PeerConfig::default()
            .output_dir("/var/lib/songswarm")
            .max_connections(16);

        assert_eq!(config.output_dir, PathBuf::from("/var/lib/songswarm"));
        assert_eq!(config.server.max_connections, 16);
    }
}
