//! Global `tracing` subscriber for the application.

use anyhow::{Context, Result};
use specflow_core::LogConfig;
use std::fs::File;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer thread alive; drop it last
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Fresh log file for this run, after pruning the oldest ones
fn open_log_file(config: &LogConfig) -> Result<(NonBlocking, WorkerGuard)> {
    config
        .ensure_log_directory()
        .context("Failed to create log directory")?;
    if let Err(e) = config.cleanup_old_logs() {
        eprintln!("Warning: could not prune old logs in {:?}: {}", config.log_path, e);
    }

    let path = config.current_log_path();
    let file =
        File::create(&path).with_context(|| format!("Failed to create log file: {:?}", path))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. RUST_LOG overrides the configured level.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let level_filter = || {
        EnvFilter::builder()
            .with_default_directive(config.parse_level().into())
            .from_env_lossy()
    };

    // stderr keeps stdout free for --list-devices
    let console_layer = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(level_filter())
    });

    let mut guard = None;
    let file_layer = if config.file_output {
        let (writer, worker_guard) = open_log_file(config)?;
        guard = Some(LogGuard {
            _guard: worker_guard,
        });
        Some(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(level_filter()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!(
        "Logging at {} (console: {}, file: {})",
        config.level,
        config.console_output,
        config.file_output
    );
    if guard.is_some() {
        tracing::info!("Log file: {:?}", config.current_log_path());
    }

    Ok(guard)
}
