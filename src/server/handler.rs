//! Connection handler trait
//!
//! Each protocol (tracker, peer) plugs into the listener by implementing
//! [`ConnectionHandler`]. A handler gets one accepted stream, serves the one
//! request on it and returns; dropping the stream closes the connection.

use std::future::Future;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// Per-connection information passed to the handler
#[derive(Debug, Clone, Copy)]
pub struct ConnectionContext {
    /// Unique session ID
    pub session_id: u64,

    /// Remote socket address
    pub remote_addr: SocketAddr,
}

impl ConnectionContext {
    pub fn new(session_id: u64, remote_addr: SocketAddr) -> Self {
        Self {
            session_id,
            remote_addr,
        }
    }
}

/// Serves a single request on an accepted connection
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handle one connection to completion
    ///
    /// An `Err` is logged by the listener and ends only this connection.
    fn handle<S>(&self, ctx: ConnectionContext, stream: S) -> impl Future<Output = Result<()>> + Send
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static;
}
