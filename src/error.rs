//! Error types for songswarm
//!
//! Every failure is scoped to the connection or call that produced it. The
//! listeners log the error and drop that one connection; nothing here is
//! allowed to take the process down.

use std::path::PathBuf;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Registration rejected by tracker: {0}")]
    Registration(String),
}

/// Wire protocol violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error("Line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Connection closed before end of block")]
    UnexpectedEof,

    #[error("Unexpected response: {0:?}")]
    UnexpectedResponse(String),

    #[error("Line is not valid UTF-8")]
    InvalidUtf8,
}

/// Transcoder failures
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Process spawn failed: {reason}")]
    SpawnFailed { reason: String },

    #[error("Transcoder process failed: {reason}")]
    ProcessFailed { reason: String },

    #[error("Invalid song name: {0}")]
    InvalidName(#[from] PathError),

    #[error("Transcoder finished but manifest is missing: {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected file names for manifests and segments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Empty file name")]
    Empty,

    #[error("Name escapes the output directory: {0}")]
    NotContained(String),
}
