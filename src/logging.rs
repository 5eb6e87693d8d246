//! Tracing setup for the binaries

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber
///
/// `RUST_LOG` wins when set; otherwise `level` applies to this crate and
/// everything else logs at `warn`.
pub fn init_tracing(level: Level) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn").add_directive(format!("songswarm={}", level).parse()?),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()?;

    Ok(())
}
