//! Tracker binary
//!
//! Run with: cargo run --bin tracker -- --bind 0.0.0.0:8000

use std::net::SocketAddr;

use clap::Parser;
use tracing::Level;

use songswarm::logging::init_tracing;
use songswarm::{ServerConfig, TrackerServer};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Rendezvous tracker for songswarm peers")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level)?;

    let config = ServerConfig::with_addr(cli.bind).max_connections(cli.max_connections);
    let tracker = TrackerServer::tracker(config);

    tracker
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
