use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "quake_prep.log";
const DEFAULT_FILTER: &str = "quake_prep=info,warn";

/// Structured JSON to a daily file under `logs/`, human-readable lines on stderr.
///
/// Stdout is left to the run summary and the lookup prompts.
pub fn init_logging() {
    let _ = fs::create_dir_all(LOG_DIR);

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(file_writer);
    let console_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    // RUST_LOG wins when set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // flush worker must outlive main
    std::mem::forget(guard);
}
