//! Peer-local catalog shared across connection tasks

use tokio::sync::Mutex;

use crate::catalog::Catalog;

/// The songs this peer serves, behind one exclusive lock
#[derive(Debug, Default)]
pub struct SharedCatalog {
    inner: Mutex<Catalog>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Mutex::new(catalog),
        }
    }

    /// Locator for `song`, if this peer has it
    pub async fn get(&self, song: &str) -> Option<String> {
        self.inner.lock().await.get(song).map(str::to_owned)
    }

    /// Forget `song`, returning its locator
    pub async fn remove(&self, song: &str) -> Option<String> {
        self.inner.lock().await.remove(song)
    }

    /// Copy of the current catalog
    pub async fn snapshot(&self) -> Catalog {
        self.inner.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl From<Catalog> for SharedCatalog {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
