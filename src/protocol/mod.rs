//! Line-oriented wire protocol shared by tracker and peers
//!
//! Every connection carries exactly one request. The first line is a verb
//! followed by a single space and an argument:
//!
//! ```text
//! Peer                Tracker                 Peer (holder)
//!   |-- REGISTER addr -->|                         |
//!   |-- song locator --->|                         |
//!   |-- <blank line> --->|                         |
//!   |<------ OK ---------|                         |
//!   |                    |                         |
//!   |-- QUERY song ----->|                         |
//!   |<-- PEERS a b ... --|                         |
//!   |                                              |
//!   |----------------- REQUEST_SONG song --------->|
//!   |<---------------- PLAYLIST song + bytes ------| (EOF terminated)
//!   |----------------- REQUEST_SEGMENT name ------>|
//!   |<---------------- SEGMENT name + bytes -------| (EOF terminated)
//! ```

pub mod codec;
pub mod command;
pub mod constants;

pub use codec::{
    encode_peers, encode_register, encode_request, parse_catalog_line, parse_peers,
    read_catalog_block, read_line,
};
pub use command::{split_request_line, PeerCommand, RequestLine, TrackerCommand};
