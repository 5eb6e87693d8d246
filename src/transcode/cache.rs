//! Playlist cache with in-flight deduplication
//!
//! A playlist that exists on disk is always reused, no matter whether the
//! source changed since. Removing it by hand is the only invalidation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::TranscodeError;

use super::paths::manifest_path;
use super::Transcoder;

/// Per-song gate; holding it means "this song is being transcoded"
type Gate = Arc<Mutex<()>>;

/// Transcodes songs on first use and reuses the result afterwards
pub struct TranscodeCache<T> {
    transcoder: T,
    output_dir: PathBuf,
    in_flight: Mutex<HashMap<String, Gate>>,
}

impl<T: Transcoder> TranscodeCache<T> {
    /// Create a cache writing into `output_dir`
    pub fn new(transcoder: T, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcoder,
            output_dir: output_dir.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Return the playlist for `song`, transcoding `source` if it is missing
    ///
    /// Concurrent callers for the same song wait on a single transcode. Calls
    /// for different songs never wait on each other. A playlist is only
    /// trusted when no transcode for the song is running, since the
    /// transcoder may write it before it is complete.
    pub async fn ensure_manifest(&self, song: &str, source: &Path) -> Result<PathBuf, TranscodeError> {
        let manifest = manifest_path(&self.output_dir, song)?;

        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.contains_key(song) && path_exists(&manifest).await {
                tracing::debug!(song = %song, "Reusing cached playlist");
                return Ok(manifest);
            }
            Arc::clone(in_flight.entry(song.to_owned()).or_default())
        };

        let result = {
            let _running = gate.lock().await;

            // Someone else may have finished while we waited
            if path_exists(&manifest).await {
                tracing::debug!(song = %song, "Playlist produced by concurrent request");
                Ok(manifest.clone())
            } else {
                self.run_transcoder(song, source, &manifest).await
            }
        };

        self.release(song, gate).await;
        result
    }

    async fn run_transcoder(
        &self,
        song: &str,
        source: &Path,
        manifest: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let produced = match self.transcoder.transcode(source, song, &self.output_dir).await {
            Ok(produced) => produced,
            Err(e) => {
                discard_partial(song, manifest).await;
                return Err(e);
            }
        };

        if produced != manifest {
            tracing::warn!(
                song = %song,
                expected = %manifest.display(),
                produced = %produced.display(),
                "Transcoder wrote playlist to unexpected path"
            );
        }

        if !path_exists(manifest).await {
            return Err(TranscodeError::MissingManifest(manifest.to_path_buf()));
        }

        Ok(manifest.to_path_buf())
    }

    /// Drop the gate from the map once nobody else is holding a clone
    async fn release(&self, song: &str, gate: Gate) {
        let mut in_flight = self.in_flight.lock().await;
        // One reference in the map, one here
        if Arc::strong_count(&gate) <= 2 {
            in_flight.remove(song);
        }
    }

    /// Number of songs with a transcode in progress or waiters queued
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Remove whatever a failed run left behind so the next request retries
async fn discard_partial(song: &str, manifest: &Path) {
    match tokio::fs::remove_file(manifest).await {
        Ok(()) => tracing::debug!(song = %song, "Removed partial playlist"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(song = %song, error = %e, "Could not remove partial playlist"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Writes a one-line playlist and counts invocations
    #[derive(Default)]
    struct CountingTranscoder {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl Transcoder for CountingTranscoder {
        async fn transcode(
            &self,
            _source: &Path,
            song: &str,
            output_dir: &Path,
        ) -> Result<PathBuf, TranscodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(TranscodeError::ProcessFailed {
                    reason: "exit status: 1".into(),
                });
            }
            let manifest = manifest_path(output_dir, song)?;
            tokio::fs::create_dir_all(output_dir).await?;
            tokio::fs::write(&manifest, format!("#EXTM3U\n{}0.ts\n", song)).await?;
            Ok(manifest)
        }
    }

    #[tokio::test]
    async fn test_second_request_reuses_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranscodeCache::new(CountingTranscoder::default(), dir.path().join("playlist"));

        let first = cache.ensure_manifest("SongA", Path::new("SongA.mp3")).await.unwrap();
        let contents = tokio::fs::read(&first).await.unwrap();

        let second = cache.ensure_manifest("SongA", Path::new("SongA.mp3")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(tokio::fs::read(&second).await.unwrap(), contents);
        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_existing_playlist_skips_transcoder() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("SongB.m3u8"), "#EXTM3U\n").await.unwrap();
        let cache = TranscodeCache::new(CountingTranscoder::default(), dir.path());

        let manifest = cache.ensure_manifest("SongB", Path::new("gone.mp3")).await.unwrap();
        assert_eq!(manifest, dir.path().join("SongB.m3u8"));
        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_share_one_transcode() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = CountingTranscoder {
            delay: Duration::from_millis(50),
            ..Default::default()
        };
        let cache = Arc::new(TranscodeCache::new(transcoder, dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    cache.ensure_manifest("SongA", Path::new("SongA.mp3")).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_different_songs_transcode_independently() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(TranscodeCache::new(CountingTranscoder::default(), dir.path()));

        let a = cache.ensure_manifest("SongA", Path::new("a.mp3"));
        let b = cache.ensure_manifest("SongB", Path::new("b.mp3"));
        let (a, b) = tokio::join!(a, b);

        assert_ne!(a.unwrap(), b.unwrap());
        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_returned_and_retried_next_time() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = CountingTranscoder {
            fail: true,
            ..Default::default()
        };
        let cache = TranscodeCache::new(transcoder, dir.path());

        let err = cache.ensure_manifest("SongA", Path::new("a.mp3")).await.unwrap_err();
        assert!(matches!(err, TranscodeError::ProcessFailed { .. }));

        cache.ensure_manifest("SongA", Path::new("a.mp3")).await.unwrap_err();
        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.in_flight().await, 0);
    }

    /// Reports success without writing anything
    struct LyingTranscoder;

    impl Transcoder for LyingTranscoder {
        async fn transcode(
            &self,
            _source: &Path,
            song: &str,
            output_dir: &Path,
        ) -> Result<PathBuf, TranscodeError> {
            Ok(manifest_path(output_dir, song)?)
        }
    }

    #[tokio::test]
    async fn test_missing_manifest_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TranscodeCache::new(LyingTranscoder, dir.path());

        let err = cache.ensure_manifest("SongA", Path::new("a.mp3")).await.unwrap_err();
        assert!(matches!(err, TranscodeError::MissingManifest(_)));
    }

    /// Writes the playlist up front, then fails partway through
    #[derive(Default)]
    struct PartialTranscoder {
        calls: AtomicUsize,
    }

    impl Transcoder for PartialTranscoder {
        async fn transcode(
            &self,
            _source: &Path,
            song: &str,
            output_dir: &Path,
        ) -> Result<PathBuf, TranscodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let manifest = manifest_path(output_dir, song)?;
            tokio::fs::create_dir_all(output_dir).await?;
            tokio::fs::write(&manifest, "#EXTM3U\n#EXTINF:6.0,\n").await?;
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err(TranscodeError::ProcessFailed {
                reason: "exit status: 1".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_partial_playlist_is_never_served() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(TranscodeCache::new(PartialTranscoder::default(), dir.path()));

        let first = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.ensure_manifest("SongA", Path::new("a.mp3")).await })
        };

        // Arrives while the playlist is on disk but the run is still going
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(dir.path().join("SongA.m3u8").exists());
        let during = cache.ensure_manifest("SongA", Path::new("a.mp3")).await;
        assert!(during.is_err());

        let first = first.await.unwrap();
        assert!(matches!(first, Err(TranscodeError::ProcessFailed { .. })));
        assert!(!dir.path().join("SongA.m3u8").exists());

        // Next request runs the transcoder again instead of reusing leftovers
        let calls_before = cache.transcoder().calls.load(Ordering::SeqCst);
        cache.ensure_manifest("SongA", Path::new("a.mp3")).await.unwrap_err();
        assert_eq!(cache.transcoder().calls.load(Ordering::SeqCst), calls_before + 1);
        assert_eq!(cache.in_flight().await, 0);
    }
}
