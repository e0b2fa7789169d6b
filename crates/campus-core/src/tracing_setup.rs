use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter directives, e.g. `CAMPUS_LOG=campus_core=debug`
pub const ENV_LOG: &str = "CAMPUS_LOG";
/// Log file path for the TUI, which cannot write to the terminal it draws on
pub const ENV_LOG_FILE: &str = "CAMPUS_LOG_FILE";

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// No subscriber is installed; every event is dropped.
    Discard,
}

impl LogTarget {
    /// `CAMPUS_LOG_FILE` when set, otherwise nothing.
    pub fn file_from_env() -> Self {
        match std::env::var(ENV_LOG_FILE) {
            Ok(path) if !path.trim().is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Discard,
        }
    }
}

fn env_filter() -> EnvFilter {
    std::env::var(ENV_LOG)
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

pub fn init_tracing(service: &str, target: LogTarget) -> Result<()> {
    match target {
        LogTarget::Discard => return Ok(()),
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter());
            tracing_subscriber::registry()
                .with(layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let layer = fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(env_filter());
            tracing_subscriber::registry()
                .with(layer)
                .try_init()
                .context("Failed to install tracing subscriber")?;
        }
    }
    tracing::info!(service, "logging initialised");
    Ok(())
}
