//! Logging Infrastructure
//!
//! Human-readable or JSON lines, to stdout or a daily rolling file.

use std::path::Path;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` wins over `log_level` when set. A `log_dir` that does not exist
/// falls back to stdout. Calling this twice is harmless.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match log_dir.map(Path::new) {
        Some(dir) if dir.is_dir() => {
            BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "backoffice-server"))
        }
        _ => BoxMakeWriter::new(std::io::stdout),
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);
    let layer = if json { layer.json().boxed() } else { layer.boxed() };

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
