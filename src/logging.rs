//! Tracing setup.
//!
//! The full-screen UI owns stdout and stderr, so interactive sessions log to
//! a daily file instead.
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise everything at `default` and above.
fn env_filter(default: tracing::Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default.as_str()))
}

/// Logs to `<log_dir>/guess-duel.log.<date>`. Keep the guard alive until exit
/// so buffered lines get flushed.
pub fn init_file(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "guess-duel.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(tracing::Level::INFO))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// For the one-shot subcommands, whose stdout is the actual output.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(tracing::Level::WARN))
        .with_writer(std::io::stderr)
        .init();
}
