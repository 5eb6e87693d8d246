//! Peer registry implementation

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::catalog::{Catalog, PeerAddress};

/// Registry of every peer's announced catalog
///
/// Registration replaces a peer's catalog wholesale; catalogs are never
/// merged. Reads and writes share one exclusive lock since registrations are
/// rare next to queries.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: Mutex<HashMap<PeerAddress, Catalog>>,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog registered for `address`
    pub async fn register(&self, address: PeerAddress, catalog: Catalog) {
        let songs = catalog.len();
        let replaced = self.peers.lock().await.insert(address.clone(), catalog);

        tracing::info!(
            peer = %address,
            songs = songs,
            replaced = replaced.is_some(),
            "Peer registered"
        );
    }

    /// Every peer address whose catalog holds `song`
    ///
    /// Returns an empty list when nobody has it. Order is unspecified.
    pub async fn query(&self, song: &str) -> Vec<PeerAddress> {
        let peers = self.peers.lock().await;

        peers
            .iter()
            .filter(|(_, catalog)| catalog.contains(song))
            .map(|(address, _)| address.clone())
            .collect()
    }

    /// Number of registered peers
    pub async fn peer_count(&self) -> usize {
        self.peers.lock().await.len()
    }

    /// Copy of the catalog registered for `address`
    pub async fn catalog(&self, address: &PeerAddress) -> Option<Catalog> {
        self.peers.lock().await.get(address).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn catalog(pairs: &[(&str, &str)]) -> Catalog {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_register() {
        let registry = PeerRegistry::new();
        let songs = catalog(&[("song1", "hash1"), ("song2", "hash2")]);

        registry.register("peer1:9090".into(), songs.clone()).await;

        assert_eq!(registry.catalog(&"peer1:9090".into()).await, Some(songs));
        assert_eq!(registry.query("song1").await, vec![PeerAddress::from("peer1:9090")]);
        assert!(registry.query("song3").await.is_empty());
    }

    #[tokio::test]
    async fn test_reregister_replaces_catalog() {
        let registry = PeerRegistry::new();
        let addr = PeerAddress::from("peer1:9090");

        registry
            .register(addr.clone(), catalog(&[("song1", "a"), ("song2", "b")]))
            .await;
        registry.register(addr.clone(), catalog(&[("song3", "c")])).await;

        assert!(registry.query("song1").await.is_empty());
        assert!(registry.query("song2").await.is_empty());
        assert_eq!(registry.query("song3").await, vec![addr]);
        assert_eq!(registry.peer_count().await, 1);
    }

    #[tokio::test]
    async fn test_query_collects_all_holders() {
        let registry = PeerRegistry::new();
        registry
            .register("peer1:9090".into(), catalog(&[("song1", "hash1")]))
            .await;
        registry
            .register("peer2:9091".into(), catalog(&[("song2", "hash2")]))
            .await;
        registry
            .register("peer3:9092".into(), catalog(&[("song1", "hash3")]))
            .await;

        let result: HashSet<_> = registry.query("song1").await.into_iter().collect();
        let expected: HashSet<_> = [PeerAddress::from("peer1:9090"), PeerAddress::from("peer3:9092")]
            .into_iter()
            .collect();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_query_no_results() {
        let registry = PeerRegistry::new();
        registry
            .register("peer1:9090".into(), catalog(&[("song1", "hash1")]))
            .await;
        registry
            .register("peer2:9091".into(), catalog(&[("song2", "hash2")]))
            .await;

        assert!(registry.query("song3").await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_still_registered() {
        let registry = PeerRegistry::new();
        registry.register("peer1:9090".into(), Catalog::new()).await;

        assert_eq!(registry.peer_count().await, 1);
        assert!(registry.query("anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_registration() {
        let registry = Arc::new(PeerRegistry::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let own = format!("own{}", i);
                    let songs = catalog(&[("shared", "x"), (own.as_str(), "y")]);
                    registry.register(format!("peer{}:9000", i).into(), songs).await;
                    registry.query("shared").await.len()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap() >= 1);
        }

        assert_eq!(registry.peer_count().await, 32);
        assert_eq!(registry.query("shared").await.len(), 32);
        assert_eq!(registry.query("own7").await, vec![PeerAddress::from("peer7:9000")]);
    }
}
