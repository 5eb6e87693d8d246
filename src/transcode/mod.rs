//! On-demand transcoding into segmented playlists
//!
//! A [`Transcoder`] turns one source audio file into an HLS playlist plus
//! segment files inside an output directory. [`TranscodeCache`] wraps it so a
//! song is only ever transcoded when its playlist is missing, and concurrent
//! first requests for the same song share one transcoder run.
//!
//! ```text
//! REQUEST_SONG ──► TranscodeCache::ensure_manifest(song, source)
//!                      │ manifest exists? ──yes──► reuse
//!                      │ no
//!                      ▼
//!                  per-song gate ──► Transcoder::transcode() ──► <dir>/<song>.m3u8
//!                                                              <dir>/<song>N.ts
//! ```

pub mod cache;
pub mod ffmpeg;
pub mod paths;

use std::future::Future;
use std::path::{Path, PathBuf};

pub use cache::TranscodeCache;
pub use ffmpeg::{FfmpegConfig, FfmpegTranscoder};
pub use paths::{manifest_path, resolve_segment};

use crate::error::TranscodeError;

/// Converts a source audio file into a playlist and segments
///
/// Implementations must write the playlist to
/// [`manifest_path(output_dir, song)`](paths::manifest_path) and may block for
/// as long as the conversion takes.
pub trait Transcoder: Send + Sync + 'static {
    /// Transcode `source` for `song`, returning the playlist path
    fn transcode(
        &self,
        source: &Path,
        song: &str,
        output_dir: &Path,
    ) -> impl Future<Output = Result<PathBuf, TranscodeError>> + Send;
}
