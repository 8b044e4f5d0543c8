use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use super::config::Config;

/// Install the global subscriber: stderr plus a daily log file under ~/.reclaim/logs.
///
/// `RECLAIM_LOG` overrides the filter. Keep the returned guard alive for the
/// life of the process or buffered file output is lost.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let default_filter = if verbose { "reclaim=debug" } else { "reclaim=warn" };
    let filter = std::env::var("RECLAIM_LOG").unwrap_or_else(|_| default_filter.to_string());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let logs_dir = Config::logs_dir();
    let (file_layer, guard) = match std::fs::create_dir_all(&logs_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&logs_dir, "reclaim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
