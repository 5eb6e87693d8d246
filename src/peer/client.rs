//! Client side of the peer protocol
//!
//! Fetching from another peer, and announcing this peer to the tracker.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::catalog::{Catalog, PeerAddress};
use crate::error::{ProtocolError, Result};
use crate::protocol::codec::{encode_request, read_line};
use crate::protocol::constants::{
    CLIENT_MAX_LINE_LENGTH, CMD_REQUEST_SEGMENT, CMD_REQUEST_SONG, RESP_PLAYLIST, RESP_SEGMENT,
    SONG_DOES_NOT_EXIST,
};
use crate::tracker::client::register_over;

/// Answer to a `REQUEST_SONG`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongResponse {
    /// Playlist contents, verbatim
    Playlist(Bytes),
    /// The peer does not have the song (or its source is gone)
    NotFound,
}

/// Fetch a song's playlist from the peer at `addr`
pub async fn fetch_playlist(addr: &PeerAddress, song: &str) -> Result<SongResponse> {
    let stream = TcpStream::connect(addr.as_str()).await?;
    request_playlist(stream, song).await
}

/// Fetch one segment from the peer at `addr`
pub async fn fetch_segment(addr: &PeerAddress, segment: &str) -> Result<Bytes> {
    let stream = TcpStream::connect(addr.as_str()).await?;
    request_segment(stream, segment).await
}

/// Send `REQUEST_SONG` over an established connection
pub async fn request_playlist<S>(stream: S, song: &str) -> Result<SongResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    stream
        .write_all(encode_request(CMD_REQUEST_SONG, song).as_bytes())
        .await?;
    stream.flush().await?;

    let header = read_line(&mut stream, CLIENT_MAX_LINE_LENGTH)
        .await?
        .ok_or(ProtocolError::UnexpectedEof)?;

    if header == SONG_DOES_NOT_EXIST {
        return Ok(SongResponse::NotFound);
    }
    expect_header(&header, RESP_PLAYLIST, song)?;

    Ok(SongResponse::Playlist(read_body(&mut stream).await?))
}

/// Send `REQUEST_SEGMENT` over an established connection
pub async fn request_segment<S>(stream: S, segment: &str) -> Result<Bytes>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);
    stream
        .write_all(encode_request(CMD_REQUEST_SEGMENT, segment).as_bytes())
        .await?;
    stream.flush().await?;

    let header = read_line(&mut stream, CLIENT_MAX_LINE_LENGTH)
        .await?
        .ok_or(ProtocolError::UnexpectedEof)?;
    expect_header(&header, RESP_SEGMENT, segment)?;

    read_body(&mut stream).await
}

fn expect_header(header: &str, verb: &str, name: &str) -> std::result::Result<(), ProtocolError> {
    let expected = format!("{} {}\n", verb, name);
    if header == expected {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedResponse(header.to_owned()))
    }
}

/// Body runs until the peer closes the connection
async fn read_body<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Bytes> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await?;
    Ok(Bytes::from(body))
}

/// Announce this peer's catalog to the tracker at `tracker_addr`
///
/// Failure is logged and reported as `false`; callers go on serving either
/// way.
pub async fn register_with_tracker(
    tracker_addr: &str,
    address: &PeerAddress,
    catalog: &Catalog,
) -> bool {
    let stream = match TcpStream::connect(tracker_addr).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(tracker = %tracker_addr, error = %e, "Could not reach tracker");
            return false;
        }
    };

    match register_over(stream, address, catalog).await {
        Ok(()) => {
            tracing::info!(
                tracker = %tracker_addr,
                address = %address,
                songs = catalog.len(),
                "Registered with tracker"
            );
            true
        }
        Err(e) => {
            tracing::error!(tracker = %tracker_addr, error = %e, "Failed to register with tracker");
            false
        }
    }
}
