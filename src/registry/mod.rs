//! Tracker registry
//!
//! Maps each announced peer address to that peer's full catalog. One
//! exclusive lock guards the whole map and is only held for the duration of a
//! single map operation, never across a connection's I/O.
//!
//! ```text
//!                  Arc<PeerRegistry>
//!            ┌──────────────────────────────┐
//!            │ peers: Mutex<HashMap<        │
//!            │   PeerAddress, Catalog>>     │
//!            └──────────────┬───────────────┘
//!                           │
//!          ┌────────────────┼────────────────┐
//!          ▼                ▼                ▼
//!     [REGISTER]        [QUERY]          [QUERY]
//!     register()        query()          query()
//! ```
//!
//! Entries are never removed. A peer that goes away stays registered until
//! the tracker restarts.

pub mod store;

pub use store::PeerRegistry;
