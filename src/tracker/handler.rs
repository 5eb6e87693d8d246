//! Tracker connection handler
//!
//! Per connection: `AwaitCommand -> {RegisterBody | Respond} -> Closed`.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::catalog::PeerAddress;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::codec::{encode_peers, read_catalog_block, read_line};
use crate::protocol::command::TrackerCommand;
use crate::protocol::constants::{ERR_INVALID_QUERY, ERR_INVALID_REGISTER, RESP_OK};
use crate::registry::PeerRegistry;
use crate::server::handler::{ConnectionContext, ConnectionHandler};

/// Serves `REGISTER` and `QUERY` requests
#[derive(Debug, Clone)]
pub struct TrackerHandler {
    registry: Arc<PeerRegistry>,
    max_line_length: usize,
}

impl TrackerHandler {
    pub fn new(registry: Arc<PeerRegistry>, max_line_length: usize) -> Self {
        Self {
            registry,
            max_line_length,
        }
    }

    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    async fn handle_register<S>(
        &self,
        ctx: &ConnectionContext,
        stream: &mut S,
        address: Option<PeerAddress>,
    ) -> Result<()>
    where
        S: AsyncBufRead + AsyncWrite + Unpin,
    {
        let Some(address) = address else {
            stream.write_all(ERR_INVALID_REGISTER.as_bytes()).await?;
            stream.flush().await?;

            // The block is still consumed, but nothing gets registered
            match read_catalog_block(stream, self.max_line_length).await {
                Ok(_) | Err(Error::Protocol(ProtocolError::UnexpectedEof)) => {}
                Err(e) => return Err(e),
            }
            tracing::debug!(session_id = ctx.session_id, "Discarded REGISTER without address");
            return Ok(());
        };

        // A partial block is dropped when the connection ends early
        let catalog = read_catalog_block(stream, self.max_line_length).await?;
        self.registry.register(address, catalog).await;

        stream.write_all(RESP_OK.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn handle_query<S>(
        &self,
        ctx: &ConnectionContext,
        stream: &mut S,
        song: Option<String>,
    ) -> Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        let response = match song {
            Some(song) => {
                let peers = self.registry.query(&song).await;
                tracing::debug!(
                    session_id = ctx.session_id,
                    song = %song,
                    holders = peers.len(),
                    "Query answered"
                );
                encode_peers(&peers)
            }
            None => ERR_INVALID_QUERY.to_owned(),
        };

        stream.write_all(response.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }
}

impl ConnectionHandler for TrackerHandler {
    async fn handle<S>(&self, ctx: ConnectionContext, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let mut stream = BufReader::new(stream);

        let Some(line) = read_line(&mut stream, self.max_line_length).await? else {
            tracing::debug!(session_id = ctx.session_id, "Connection closed before request");
            return Ok(());
        };

        // Unknown verbs fail this connection only
        match TrackerCommand::parse(&line)? {
            TrackerCommand::Register { address } => {
                self.handle_register(&ctx, &mut stream, address).await
            }
            TrackerCommand::Query { song } => self.handle_query(&ctx, &mut stream, song).await,
        }
    }
}
