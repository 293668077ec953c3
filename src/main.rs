//! urlshort redirect server.
//!
//! ```text
//!  Client ──▶ listener ──▶ request ID / trace / timeout layers
//!                               │
//!                               ▼
//!                     redirect file table ──hit──▶ 301 Location
//!                               │ miss
//!                               ▼
//!                     inline paths table  ──hit──▶ 301 Location
//!                               │ miss
//!                               ▼
//!                        "Hello, world!"
//! ```

use std::path::PathBuf;

use clap::Parser;

use urlshort::config::{load_config, validate_config, ConfigError, ServerConfig};
use urlshort::lifecycle::{self, Shutdown};
use urlshort::observability::logging;

#[derive(Parser)]
#[command(name = "urlshort")]
#[command(
    about = "Redirect mapped request paths, fall back to a default responder",
    long_about = None
)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability.log_level)?;

    tracing::info!("urlshort v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        redirect_file = ?config.redirects.file,
        inline_redirects = config.redirects.paths.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await?;
    tokio::spawn(shutdown.trigger_on_signal());

    running.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
