//! Protocol verbs, literal responses and defaults

/// Peer announces its catalog to the tracker
pub const CMD_REGISTER: &str = "REGISTER";
/// Ask the tracker which peers hold a song
pub const CMD_QUERY: &str = "QUERY";
/// Ask a peer for a song's playlist
pub const CMD_REQUEST_SONG: &str = "REQUEST_SONG";
/// Ask a peer for one segment file
pub const CMD_REQUEST_SEGMENT: &str = "REQUEST_SEGMENT";

pub const RESP_OK: &str = "OK\n";
pub const RESP_PEERS: &str = "PEERS";
pub const RESP_PLAYLIST: &str = "PLAYLIST";
pub const RESP_SEGMENT: &str = "SEGMENT";

pub const ERR_INVALID_REGISTER: &str = "ERROR Invalid REGISTER request\n";
pub const ERR_INVALID_QUERY: &str = "ERROR Invalid QUERY request\n";
pub const ERR_PREFIX: &str = "ERROR";

/// Sent with no trailing newline and no header
pub const SONG_DOES_NOT_EXIST: &str = "Song does not exist";

/// Longest request or catalog line accepted by the servers
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;

/// Longest response header accepted by the clients (PEERS lines can be long)
pub const CLIENT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Extension of generated HLS playlists
pub const MANIFEST_EXTENSION: &str = "m3u8";

/// Default directory for playlists and segments
pub const DEFAULT_OUTPUT_DIR: &str = "playlist";

pub const DEFAULT_TRACKER_PORT: u16 = 8000;
pub const DEFAULT_PEER_PORT: u16 = 8001;
