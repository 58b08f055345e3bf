use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "recco.log";

/// Flushes the file writer when dropped; hold it for the whole run.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Engine events go to stderr so stdout carries only command output.
/// With `log_dir` set, a daily rolling `recco.log` mirrors them without ANSI.
pub fn init_tracing(config: &Config) -> LogGuard {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let (file_layer, guard) = match config.log_dir.as_deref().and_then(open_rolling_log) {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    LogGuard { _file: guard }
}

/// `None` when the directory cannot be created; console logging still works.
fn open_rolling_log(dir: &Path) -> Option<RollingFileAppender> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        return None;
    }
    Some(RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX))
}
