//! Tracing subscriber setup for the binary

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error; fine for headless runs
    Stderr,
    /// A file, so the TUI's alternate screen is left alone
    File(PathBuf),
}

/// Default log file for TUI mode
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("algovis.log")
}

/// Build the filter from `RUST_LOG`, falling back to `level`
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
pub fn init_logging(level: &str, target: LogTarget) -> eyre::Result<()> {
    let filter = build_filter(level);

    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| eyre::eyre!("Failed to initialize logging: {}", e))?;
        }
        LogTarget::File(path) => {
            let file = File::create(&path)
                .map_err(|e| eyre::eyre!("Failed to create log file {:?}: {}", path, e))?;
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Arc::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .map_err(|e| eyre::eyre!("Failed to initialize logging: {}", e))?;
        }
    }

    Ok(())
}
