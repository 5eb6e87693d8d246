//! Peer binary
//!
//! Run with:
//!   cargo run --bin peer -- --tracker 127.0.0.1:8000 --song SongA=./SongA.mp3

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use songswarm::logging::init_tracing;
use songswarm::{
    Catalog, FfmpegConfig, FfmpegTranscoder, PeerConfig, PeerServer, SongLocator,
};

#[derive(Parser)]
#[command(name = "peer")]
#[command(about = "Announce songs to a tracker and serve them to other peers")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8001")]
    bind: SocketAddr,

    /// Address other peers should dial (defaults to --bind, which is not
    /// dialable when it is 0.0.0.0)
    #[arg(long)]
    advertise: Option<String>,

    /// Tracker address
    #[arg(long, default_value = "127.0.0.1:8000")]
    tracker: String,

    /// Song to share, as NAME=PATH (repeatable)
    #[arg(long = "song", value_parser = parse_song)]
    songs: Vec<SongLocator>,

    /// Directory for generated playlists and segments
    #[arg(long, default_value = "playlist")]
    output_dir: PathBuf,

    /// ffmpeg binary
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Audio bitrate for transcoded segments
    #[arg(long, default_value = "128k")]
    bitrate: String,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn parse_song(s: &str) -> Result<SongLocator, String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got {:?}", s))?;
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("invalid song name {:?}", name));
    }

    // Locators are announced as absolute paths when they resolve
    let path = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
    Ok(SongLocator::new(name, path.to_string_lossy()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;

    let mut config = PeerConfig::with_addr(cli.bind)
        .output_dir(cli.output_dir)
        .max_connections(cli.max_connections);
    if let Some(advertise) = cli.advertise {
        config = config.advertise(advertise);
    }

    let catalog: Catalog = cli.songs.into_iter().collect();
    let transcoder = FfmpegTranscoder::new(
        FfmpegConfig::default()
            .program(cli.ffmpeg)
            .audio_bitrate(cli.bitrate),
    );

    let peer = PeerServer::peer(&config, catalog, transcoder);

    // Serving goes ahead whether or not the tracker accepted us
    peer.register_with_tracker(&cli.tracker, &config).await;

    peer.run_until(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}
