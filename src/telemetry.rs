use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs to stdout and to a daily rolling `app.log` under `log_dir`.
///
/// Level comes from `RUST_LOG` (default `info`). Keep the returned guard
/// alive for the lifetime of the process or buffered file output is lost.
pub fn init(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_target(true).with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
