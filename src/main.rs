//! Redraft - rewrite selected text anywhere with a hotkey
//!
//! Run with `redraft` to start the daemon. Configuration is read from
//! `$REDRAFT_CONFIG`, `./config.yaml`, or the user config directory.

use anyhow::Context;
use clap::Parser;
use redraft::cli::Cli;
use redraft::config::{self, LoggingConfig};
use redraft::daemon::Daemon;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    println!("{}", "=".repeat(60));
    println!("Redraft - writing assistant powered by Gemini");
    println!("{}", "=".repeat(60));

    // Load configuration
    let path = config::resolve_config_path();
    let config = config::load_config(&path)?;

    init_logging(&config.logging);
    tracing::info!("Redraft {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Loaded configuration from {:?}", path);

    let mut daemon = Daemon::new(config).context("Initialization failed")?;
    daemon.run().await?;

    Ok(())
}

/// Console plus file logging; `RUST_LOG` overrides the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    let console = fmt::layer().with_target(false);

    let file_layer = match open_log_file(&logging.file) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!(
                "Warning: cannot open log file {}: {}",
                logging.file.display(),
                e
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
