//! Peer content server handler
//!
//! Serves `REQUEST_SONG` and `REQUEST_SEGMENT`, one per connection. Payloads
//! have no length prefix; the receiver reads until the connection closes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::protocol::codec::read_line;
use crate::protocol::command::PeerCommand;
use crate::protocol::constants::{RESP_PLAYLIST, RESP_SEGMENT, SONG_DOES_NOT_EXIST};
use crate::server::handler::{ConnectionContext, ConnectionHandler};
use crate::transcode::{resolve_segment, TranscodeCache, Transcoder};

use super::catalog::SharedCatalog;

/// Serves playlists and segments from the local catalog
pub struct PeerHandler<T> {
    catalog: Arc<SharedCatalog>,
    cache: Arc<TranscodeCache<T>>,
    max_line_length: usize,
}

impl<T: Transcoder> PeerHandler<T> {
    pub fn new(
        catalog: Arc<SharedCatalog>,
        cache: Arc<TranscodeCache<T>>,
        max_line_length: usize,
    ) -> Self {
        Self {
            catalog,
            cache,
            max_line_length,
        }
    }

    pub fn catalog(&self) -> &Arc<SharedCatalog> {
        &self.catalog
    }

    pub fn cache(&self) -> &Arc<TranscodeCache<T>> {
        &self.cache
    }

    async fn serve_song<S>(&self, ctx: &ConnectionContext, stream: &mut S, song: &str) -> Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        let Some(source) = self.catalog.get(song).await else {
            tracing::debug!(session_id = ctx.session_id, song = %song, "Song not in catalog");
            return reply_not_found(stream).await;
        };

        let source = PathBuf::from(source);
        if !source_exists(&source).await {
            self.catalog.remove(song).await;
            tracing::warn!(
                session_id = ctx.session_id,
                song = %song,
                source = %source.display(),
                "Source file vanished, dropped from catalog"
            );
            return reply_not_found(stream).await;
        }

        let manifest = self.cache.ensure_manifest(song, &source).await?;
        let mut file = File::open(&manifest).await?;

        let header = format!("{} {}\n", RESP_PLAYLIST, song);
        stream.write_all(header.as_bytes()).await?;
        let sent = tokio::io::copy(&mut file, stream).await?;
        stream.flush().await?;

        tracing::debug!(session_id = ctx.session_id, song = %song, bytes = sent, "Playlist sent");
        Ok(())
    }

    async fn serve_segment<S>(
        &self,
        ctx: &ConnectionContext,
        stream: &mut S,
        segment: &str,
    ) -> Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        let path = resolve_segment(self.cache.output_dir(), segment)?;
        // Opened before the header so a missing file yields no response at all
        let mut file = File::open(&path).await?;

        let header = format!("{} {}\n", RESP_SEGMENT, segment);
        stream.write_all(header.as_bytes()).await?;
        let sent = tokio::io::copy(&mut file, stream).await?;
        stream.flush().await?;

        tracing::debug!(
            session_id = ctx.session_id,
            segment = %segment,
            bytes = sent,
            "Segment sent"
        );
        Ok(())
    }
}

impl<T: Transcoder> ConnectionHandler for PeerHandler<T> {
    async fn handle<S>(&self, ctx: ConnectionContext, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let mut stream = BufReader::new(stream);

        let Some(line) = read_line(&mut stream, self.max_line_length).await? else {
            return Ok(());
        };

        match PeerCommand::parse(&line) {
            Ok(PeerCommand::RequestSong { song }) => self.serve_song(&ctx, &mut stream, &song).await,
            Ok(PeerCommand::RequestSegment { segment }) => {
                self.serve_segment(&ctx, &mut stream, &segment).await
            }
            Err(e) => {
                // No reply: the connection just closes
                tracing::debug!(session_id = ctx.session_id, error = %e, "Ignoring request");
                Ok(())
            }
        }
    }
}

async fn reply_not_found<S: AsyncWrite + Unpin>(stream: &mut S) -> Result<()> {
    stream.write_all(SONG_DOES_NOT_EXIST.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

/// Anything other than a definite "not found" counts as present
async fn source_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(true)
}
