//! mira viewer — entry point.
//!
//! ```text
//! mira-viewer                    Connect with defaults
//! mira-viewer --config <path>   Use custom config TOML
//! mira-viewer --name frames_1   Override the stream name
//! mira-viewer --gen-config      Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mira_core::FrameReader;

use mira_viewer::config::ViewerConfig;
use mira_viewer::present::Presenter;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mira-viewer", about = "Shared-memory screen mirror viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "mira-viewer.toml")]
    config: PathBuf,

    /// Stream name (overrides config). Example: frames_8888
    #[arg(short, long)]
    name: Option<String>,

    /// Region backend (overrides config): file | shm
    #[arg(short, long)]
    backend: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ViewerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ViewerConfig::load(&cli.config);
    if let Some(name) = cli.name {
        config.stream.name = name;
    }
    if let Some(backend) = cli.backend {
        config.stream.backend = backend;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("mira-viewer v{}", env!("CARGO_PKG_VERSION"));

    let options = config.connect_options();
    let reader_config = config.reader_config();

    // ── Connect / reconnect loop ────────────────────────────────

    loop {
        // 1. Open the region the engine publishes. While the engine
        //    is not running this fails; stay disconnected and retry.
        let reader = match FrameReader::with_config(&options, reader_config.clone()) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("mirror engine not available: {e}; retrying");
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => continue,
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        };
        info!(stream = %options.stream_name, "connected to shared region");

        // 2. Start the poll loop and the presentation adapter on
        //    their own tasks, bridged by a bounded frame channel.
        let token = reader.cancellation_token();
        let (tx, rx) = mpsc::channel(4);
        let mut reader_handle = tokio::spawn(reader.run(tx));
        let presenter_handle = tokio::spawn(Presenter::new().run(rx));

        // 3. Wait for Ctrl-C or for the reader to stop on its own.
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                token.cancel();
                let _ = reader_handle.await;
                let _ = presenter_handle.await;
                break;
            }
            joined = &mut reader_handle => {
                match joined {
                    Ok(Ok(())) => info!("frame reader stopped"),
                    Ok(Err(e)) => error!("monitoring stopped unexpectedly: {e}"),
                    Err(e) => error!("frame reader task failed: {e}"),
                }
                let _ = presenter_handle.await;
                // Fall through to reconnect.
            }
        }
    }

    Ok(())
}
