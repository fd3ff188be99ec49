use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{data_dir, AppConfig};

/// Install the global subscriber. The terminal belongs to the TUI, so events
/// go to `~/.planny/logs/planny.log`. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(config: &AppConfig) -> Result<WorkerGuard> {
    let dir = data_dir().join("logs");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "planny.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = config
        .log_level
        .as_deref()
        .map(EnvFilter::new)
        .unwrap_or_else(|| {
            EnvFilter::try_from_env("PLANNY_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
