//! Request line parsing
//!
//! A request line is trimmed, then split on its first space into a verb and
//! an optional argument. The argument is everything after that space, so
//! song names and segment names are passed through untouched.

use crate::catalog::PeerAddress;
use crate::error::ProtocolError;

use super::constants::{CMD_QUERY, CMD_REGISTER, CMD_REQUEST_SEGMENT, CMD_REQUEST_SONG};

/// A request line split into verb and argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    pub verb: &'a str,
    pub arg: Option<&'a str>,
}

/// Split a raw request line into verb and argument
pub fn split_request_line(line: &str) -> RequestLine<'_> {
    let line = line.trim();
    match line.split_once(' ') {
        Some((verb, arg)) => RequestLine {
            verb,
            arg: Some(arg).filter(|a| !a.is_empty()),
        },
        None => RequestLine {
            verb: line,
            arg: None,
        },
    }
}

/// Commands understood by the tracker
///
/// A missing argument is kept as `None` so the handler can answer with the
/// matching `ERROR` line instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCommand {
    /// `REGISTER <address>`, followed by a catalog block
    Register { address: Option<PeerAddress> },
    /// `QUERY <song>`
    Query { song: Option<String> },
}

impl TrackerCommand {
    /// Parse a tracker request line
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let request = split_request_line(line);
        match request.verb {
            CMD_REGISTER => Ok(TrackerCommand::Register {
                address: request.arg.map(PeerAddress::from),
            }),
            CMD_QUERY => Ok(TrackerCommand::Query {
                song: request.arg.map(str::to_owned),
            }),
            other => Err(ProtocolError::UnknownCommand(other.to_owned())),
        }
    }
}

/// Commands understood by a peer's content server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCommand {
    /// `REQUEST_SONG <song>`
    RequestSong { song: String },
    /// `REQUEST_SEGMENT <segment>`
    RequestSegment { segment: String },
}

impl PeerCommand {
    /// Parse a peer request line
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let request = split_request_line(line);
        match request.verb {
            CMD_REQUEST_SONG => request
                .arg
                .map(|song| PeerCommand::RequestSong {
                    song: song.to_owned(),
                })
                .ok_or(ProtocolError::MissingArgument(CMD_REQUEST_SONG)),
            CMD_REQUEST_SEGMENT => request
                .arg
                .map(|segment| PeerCommand::RequestSegment {
                    segment: segment.to_owned(),
                })
                .ok_or(ProtocolError::MissingArgument(CMD_REQUEST_SEGMENT)),
            other => Err(ProtocolError::UnknownCommand(other.to_owned())),
        }
    }
}
