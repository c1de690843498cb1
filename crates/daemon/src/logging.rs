//! Logging setup for the daemon
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `poolwarden=info`)
//! - `POOLWARDEN_LOG_FORMAT`: `json` for production, anything else is pretty
//! - `POOLWARDEN_LOG_FILE`: write to this file instead of stderr
//!
//! # Example
//!
//! ```text
//! POOLWARDEN_LOG_FORMAT=json \
//! POOLWARDEN_LOG_FILE=~/poolwarden/supervisor.log \
//!     ./poolwarden
//! ```

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "poolwarden=info";
const ENV_LOG_FORMAT: &str = "POOLWARDEN_LOG_FORMAT";
const ENV_LOG_FILE: &str = "POOLWARDEN_LOG_FILE";

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; hold it until exit.
pub fn init_logging() -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let (writer, guard) = match std::env::var(ENV_LOG_FILE) {
        Ok(path) => {
            let (non_blocking, guard) = file_writer(&path)?;
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        Err(_) => (BoxMakeWriter::new(std::io::stderr), None),
    };
    // No color escapes in log files
    let ansi = guard.is_none();

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(writer))
                .try_init()?;
        }
        _ => {
            // Development: Pretty formatting
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
                .try_init()?;
        }
    }

    Ok(guard)
}

fn file_writer(path: &str) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = PathBuf::from(shellexpand::tilde(path).into_owned());
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("{} has no file name: {}", ENV_LOG_FILE, path.display()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
