use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// The returned guard must stay alive for the file layer to flush on exit.
pub fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    if fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry()
            .with(default_filter())
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return None;
    }

    // Daily rotation, JSON lines on disk
    let file_appender = tracing_appender::rolling::daily(log_dir, "order_cleaner.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Console output goes to stderr so report tables on stdout stay clean
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(default_filter())
        .with(file_layer)
        .with(console_layer)
        .init();

    Some(guard)
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("order_cleaner=info"))
}
