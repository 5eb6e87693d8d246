//! Tracker client
//!
//! Each request opens a fresh connection, since the tracker serves exactly
//! one command per connection.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::catalog::{Catalog, PeerAddress};
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::codec::{encode_register, encode_request, parse_peers, read_line};
use crate::protocol::constants::{CLIENT_MAX_LINE_LENGTH, CMD_QUERY, RESP_OK};

/// Client for a tracker at a fixed address
#[derive(Debug, Clone)]
pub struct TrackerClient {
    addr: String,
}

impl TrackerClient {
    /// Create a client for the tracker at `addr` (`host:port`)
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Announce `catalog` under `address`, replacing any earlier announcement
    pub async fn register(&self, address: &PeerAddress, catalog: &Catalog) -> Result<()> {
        let stream = TcpStream::connect(&self.addr).await?;
        register_over(stream, address, catalog).await
    }

    /// Addresses of every peer holding `song`
    pub async fn query(&self, song: &str) -> Result<Vec<PeerAddress>> {
        let stream = TcpStream::connect(&self.addr).await?;
        query_over(stream, song).await
    }
}

/// Send a `REGISTER` request over an established connection
///
/// Succeeds only when the tracker answers exactly `OK\n`.
pub async fn register_over<S>(stream: S, address: &PeerAddress, catalog: &Catalog) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);

    let payload = encode_register(address, catalog);
    stream.write_all(&payload).await?;
    stream.flush().await?;

    match read_line(&mut stream, CLIENT_MAX_LINE_LENGTH).await? {
        Some(line) if line == RESP_OK => Ok(()),
        Some(line) => Err(Error::Registration(line.trim_end().to_owned())),
        None => Err(ProtocolError::UnexpectedEof.into()),
    }
}

/// Send a `QUERY` request over an established connection
pub async fn query_over<S>(stream: S, song: &str) -> Result<Vec<PeerAddress>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufReader::new(stream);

    stream
        .write_all(encode_request(CMD_QUERY, song).as_bytes())
        .await?;
    stream.flush().await?;

    let line = read_line(&mut stream, CLIENT_MAX_LINE_LENGTH)
        .await?
        .ok_or(ProtocolError::UnexpectedEof)?;

    Ok(parse_peers(&line)?)
}
