//! Output directory layout
//!
//! Playlists live at `<output_dir>/<song>.m3u8` with their segments next to
//! them. Names coming off the wire are only accepted when they stay inside
//! the output directory.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;
use crate::protocol::constants::MANIFEST_EXTENSION;

/// Playlist path for `song`
///
/// The song name must be a single plain file name component.
pub fn manifest_path(output_dir: &Path, song: &str) -> Result<PathBuf, PathError> {
    check_contained(song)?;
    // "a/" still has one component, so compare against the file name itself
    if Path::new(song).file_name() != Some(OsStr::new(song)) {
        return Err(PathError::NotContained(song.to_owned()));
    }
    Ok(output_dir.join(format!("{}.{}", song, MANIFEST_EXTENSION)))
}

/// Resolve a segment name to a file beneath `output_dir`
///
/// Absolute paths, `..`, `.` and drive prefixes are rejected. Nothing is
/// checked against the filesystem here.
pub fn resolve_segment(output_dir: &Path, segment: &str) -> Result<PathBuf, PathError> {
    check_contained(segment)?;
    Ok(output_dir.join(segment))
}

fn check_contained(name: &str) -> Result<(), PathError> {
    if name.is_empty() {
        return Err(PathError::Empty);
    }

    if Path::new(name).components().all(|c| matches!(c, Component::Normal(_))) {
        Ok(())
    } else {
        Err(PathError::NotContained(name.to_owned()))
    }
}
