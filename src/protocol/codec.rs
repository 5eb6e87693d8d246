//! Line framing and payload encoding
//!
//! Lines end with `\n`. A catalog block is a run of `<song> <locator>` lines
//! closed by one blank line; reaching EOF before the blank line means the
//! block never completed.

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::catalog::{Catalog, PeerAddress, SongLocator};
use crate::error::{ProtocolError, Result};

use super::constants::{CMD_REGISTER, ERR_PREFIX, RESP_PEERS};

/// Read one `\n`-terminated line of at most `max_len` bytes
///
/// Returns `Ok(None)` on a clean EOF. A final line that ends at EOF without a
/// newline is still returned. The terminator is kept in the returned string.
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = max_len as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Ok(None);
    }

    if !buf.ends_with(b"\n") && buf.len() > max_len {
        return Err(ProtocolError::LineTooLong { limit: max_len }.into());
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| ProtocolError::InvalidUtf8.into())
}

/// Parse one catalog line (`<song> <locator>`)
///
/// The locator is everything after the first space. Lines without a locator
/// yield `None`.
pub fn parse_catalog_line(line: &str) -> Option<SongLocator> {
    let (name, locator) = line.trim().split_once(' ')?;
    let locator = locator.trim_start();
    if name.is_empty() || locator.is_empty() {
        return None;
    }
    Some(SongLocator::new(name, locator))
}

/// Read a catalog block up to and including its blank terminator line
pub async fn read_catalog_block<R>(reader: &mut R, max_len: usize) -> Result<Catalog>
where
    R: AsyncBufRead + Unpin,
{
    let mut catalog = Catalog::new();

    loop {
        let line = read_line(reader, max_len)
            .await?
            .ok_or(ProtocolError::UnexpectedEof)?;

        let line = line.trim();
        if line.is_empty() {
            return Ok(catalog);
        }

        match parse_catalog_line(line) {
            Some(song) => {
                catalog.insert(song);
            }
            None => tracing::warn!(line = %line, "Skipping catalog line without locator"),
        }
    }
}

/// Build the `REGISTER` payload for a catalog
///
/// Entries that could not survive the line format (whitespace in the name,
/// line breaks in the locator) are left out.
pub fn encode_register(address: &PeerAddress, catalog: &Catalog) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(CMD_REGISTER.as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(address.as_str().as_bytes());
    buf.put_u8(b'\n');

    for (name, locator) in catalog.iter() {
        if name.is_empty() || name.contains(char::is_whitespace) || locator.contains('\n') {
            tracing::warn!(song = %name, "Song cannot be announced, skipping");
            continue;
        }
        buf.put_slice(name.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(locator.as_bytes());
        buf.put_u8(b'\n');
    }

    buf.put_u8(b'\n');
    buf.freeze()
}

/// Build a single-line request (`<verb> <arg>\n`)
pub fn encode_request(verb: &str, arg: &str) -> String {
    format!("{} {}\n", verb, arg)
}

/// Build a `PEERS` response line
///
/// An empty list renders as `PEERS \n`, keeping the trailing space.
pub fn encode_peers(peers: &[PeerAddress]) -> String {
    let joined = peers
        .iter()
        .map(PeerAddress::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} {}\n", RESP_PEERS, joined)
}

/// Parse a `PEERS` response line
pub fn parse_peers(line: &str) -> std::result::Result<Vec<PeerAddress>, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.starts_with(ERR_PREFIX) {
        return Err(ProtocolError::UnexpectedResponse(line.to_owned()));
    }

    let rest = match line.strip_prefix(RESP_PEERS) {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest,
        _ => return Err(ProtocolError::UnexpectedResponse(line.to_owned())),
    };

    Ok(rest.split_whitespace().map(PeerAddress::from).collect())
}
