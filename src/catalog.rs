//! Song catalogs and peer identities
//!
//! A catalog maps song names to opaque content locators. The tracker stores
//! one catalog per peer address; a peer keeps its own catalog to serve from.

use std::collections::hash_map;
use std::collections::HashMap;

/// Dial-back address a peer announces to the tracker (`host:port`)
///
/// The tracker never checks that this is reachable or that it matches the
/// socket the announcement arrived on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerAddress(String);

impl PeerAddress {
    /// Create a new peer address
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PeerAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One catalog entry: song name plus where its content lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLocator {
    /// Song name, unique within one catalog
    pub name: String,
    /// Opaque content reference (usually a filesystem path)
    pub locator: String,
}

impl SongLocator {
    /// Create a new song locator
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }
}

/// Mapping from song name to content locator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    songs: HashMap<String, String>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous locator for the same name
    pub fn insert(&mut self, song: SongLocator) -> Option<String> {
        self.songs.insert(song.name, song.locator)
    }

    /// Get the locator for a song
    pub fn get(&self, name: &str) -> Option<&str> {
        self.songs.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.songs.contains_key(name)
    }

    /// Remove a song, returning its locator
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.songs.remove(name)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Iterate over `(name, locator)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.songs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<SongLocator> for Catalog {
    fn from_iter<I: IntoIterator<Item = SongLocator>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for song in iter {
            catalog.insert(song);
        }
        catalog
    }
}

impl<N: Into<String>, L: Into<String>> FromIterator<(N, L)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (N, L)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, locator)| SongLocator::new(name, locator))
            .collect()
    }
}

impl IntoIterator for Catalog {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.songs.into_iter()
    }
}
