//! FFmpeg-backed transcoder
//!
//! Runs `ffmpeg` as a child process to produce an audio-only HLS playlist:
//! AAC at a fixed bitrate, fixed-length segments, `event` playlist type.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::error::TranscodeError;

use super::paths::manifest_path;
use super::Transcoder;

/// FFmpeg invocation settings
#[derive(Debug, Clone)]
pub struct FfmpegConfig {
    /// Program to execute
    pub program: PathBuf,

    /// Audio codec passed to `-c:a`
    pub audio_codec: String,

    /// Audio bitrate passed to `-b:a`
    pub audio_bitrate: String,

    /// Target segment length (`-hls_time`)
    pub segment_duration: Duration,

    /// HLS playlist type (`-hls_playlist_type`)
    pub playlist_type: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            audio_codec: "aac".into(),
            audio_bitrate: "128k".into(),
            segment_duration: Duration::from_secs(6),
            playlist_type: "event".into(),
        }
    }
}

impl FfmpegConfig {
    /// Use a different ffmpeg binary
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the audio bitrate (e.g. `"192k"`)
    pub fn audio_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        self.audio_bitrate = bitrate.into();
        self
    }

    /// Set the target segment length, rounded up to whole seconds
    pub fn segment_duration(mut self, duration: Duration) -> Self {
        self.segment_duration = duration;
        self
    }

    fn hls_time(&self) -> u64 {
        let secs = self.segment_duration.as_secs();
        let rounded = if self.segment_duration.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        };
        rounded.max(1)
    }
}

/// Transcoder that shells out to ffmpeg
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    /// Build the command for one transcode job
    pub fn command(&self, source: &Path, manifest: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);

        cmd.arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-vn") // Drop embedded cover art
            .arg("-c:a")
            .arg(&self.config.audio_codec)
            .arg("-b:a")
            .arg(&self.config.audio_bitrate)
            .arg("-f")
            .arg("hls")
            .arg("-hls_time")
            .arg(self.config.hls_time().to_string())
            .arg("-hls_playlist_type")
            .arg(&self.config.playlist_type)
            .arg(manifest);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        source: &Path,
        song: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let manifest = manifest_path(output_dir, song)?;

        tokio::fs::create_dir_all(output_dir).await?;

        tracing::info!(
            song = %song,
            source = %source.display(),
            manifest = %manifest.display(),
            "Transcoding song"
        );

        let started = Instant::now();
        let output = self
            .command(source, &manifest)
            .output()
            .await
            .map_err(|e| TranscodeError::SpawnFailed {
                reason: format!("{}: {}", self.config.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::ProcessFailed {
                reason: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        tracing::info!(
            song = %song,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Transcode finished"
        );

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = FfmpegConfig::default();

        assert_eq!(config.program, PathBuf::from("ffmpeg"));
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.audio_bitrate, "128k");
        assert_eq!(config.segment_duration, Duration::from_secs(6));
        assert_eq!(config.playlist_type, "event");
    }

    #[test]
    fn test_hls_time_rounds_up() {
        let config = FfmpegConfig::default().segment_duration(Duration::from_millis(2500));
        assert_eq!(config.hls_time(), 3);

        let config = FfmpegConfig::default().segment_duration(Duration::ZERO);
        assert_eq!(config.hls_time(), 1);
    }

    #[test]
    fn test_command_arguments() {
        let transcoder = FfmpegTranscoder::new(FfmpegConfig::default().audio_bitrate("192k"));
        let cmd = transcoder.command(Path::new("/music/SongA.mp3"), Path::new("playlist/SongA.m3u8"));

        assert_eq!(cmd.as_std().get_program(), "ffmpeg");
        assert_eq!(
            args(&cmd),
            [
                "-y",
                "-i",
                "/music/SongA.mp3",
                "-vn",
                "-c:a",
                "aac",
                "-b:a",
                "192k",
                "-f",
                "hls",
                "-hls_time",
                "6",
                "-hls_playlist_type",
                "event",
                "playlist/SongA.m3u8",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder =
            FfmpegTranscoder::new(FfmpegConfig::default().program("/nonexistent/ffmpeg-binary"));

        let err = transcoder
            .transcode(Path::new("/music/SongA.mp3"), "SongA", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_rejects_song_names_outside_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::default();

        let err = transcoder
            .transcode(Path::new("/music/SongA.mp3"), "../SongA", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::InvalidName(_)));
    }
}
