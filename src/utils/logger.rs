//! Logging setup: stdout plus a daily-rolling file, filtered via
//! `FLOWWEEK_LOG` with per-subsystem defaults.

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

const DEFAULT_DIRECTIVES: &str = "info,app::ai=debug,app::ai::cache=debug,app::http=info";

/// Initialize the global subscriber. Idempotent; later calls are no-ops.
pub fn init() {
    if FILE_GUARD.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_env("FLOWWEEK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let log_dir = std::env::var("FLOWWEEK_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("logs"));
    let appender = tracing_appender::rolling::daily(log_dir, "flowweek.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false));

    if registry.try_init().is_ok() {
        let _ = FILE_GUARD.set(guard);
    }
}
