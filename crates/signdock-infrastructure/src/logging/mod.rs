//! Logging bootstrap.
//!
//! Two sinks share one `tracing` registry:
//! - a daily-rolling file (`signdock.log`) with one JSON object per line;
//! - in debug builds, a coloured human-readable stdout stream.
//!
//! Each JSON record carries timestamp (ISO 8601, millis, offset), level, target,
//! pid, tid, file and line, the message, any structured fields, and the crate version.
//! `log` records from dependencies are bridged in through `LogTracer`.

mod format;

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use format::{HumanReadableFormatter, JsonFormatter};

pub const LOG_FILE_NAME: &str = "signdock.log";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static LOGGER_READY: OnceLock<()> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber. Later calls are no-ops.
///
/// `level` overrides the build-profile default when `RUST_LOG` is unset.
pub fn init_logger(log_dir: PathBuf, level: Option<&str>) -> anyhow::Result<()> {
    if LOGGER_READY.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&log_dir)?;
    let _ = LOG_DIR.set(log_dir.clone());

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = FILE_GUARD.set(guard);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .event_format(JsonFormatter::new(env!("CARGO_PKG_VERSION")))
        .with_filter(build_filter(level, default_directives()));

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_ansi(true)
                .event_format(HumanReadableFormatter::new())
                .with_filter(build_filter(level, "debug,signdock=trace")),
        )
    } else {
        None
    };

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = LOGGER_READY.set(());

    tracing::info!(
        target: "signdock::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "Debug" } else { "Release" },
        "Logger initialized"
    );

    Ok(())
}

fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,signdock=trace"
    } else {
        "info,signdock=info"
    }
}

/// `RUST_LOG` wins, then the configured level, then `fallback`.
fn build_filter(level: Option<&str>, fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| match level {
            Some(level) => EnvFilter::try_new(format!("{0},signdock={0}", level)),
            None => EnvFilter::try_new(fallback),
        })
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn get_log_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}

pub fn is_initialized() -> bool {
    LOGGER_READY.get().is_some()
}
