//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output on stderr plus a daily-rotated `ubicasure.log`, optionally
//! in JSON. HTTP plumbing crates are capped at `warn` unless the filter names
//! them explicitly.

use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling;

use crate::error::{UbError, UbResult};

/// Directives appended to every filter.
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// Build the filter for `level`, falling back to `info` when it does not parse.
fn build_filter(level: &str) -> EnvFilter {
    let mut directives = vec![level.to_string()];
    for quiet in QUIET_DEPENDENCIES {
        let target = quiet.split('=').next().unwrap_or_default();
        if !level.contains(target) {
            directives.push((*quiet).to_string());
        }
    }
    EnvFilter::try_new(directives.join(","))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// # Arguments
/// * `level` - Log level or filter directive ("info", "ub_live=debug,info", ...)
/// * `log_dir` - Directory for log files
/// * `json_output` - If true, use JSON format for file output
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> UbResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, "ubicasure.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();
    let registry = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(console_layer);

    let installed = if json_output {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_current_span(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    };
    installed.map_err(|e| UbError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Keeps the non-blocking file writer alive; dropping it flushes the log.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Console-only logger for tests and one-shot commands.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
