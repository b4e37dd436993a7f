//! Logging Infrastructure
//!
//! `tracing` subscriber setup: env filter, stdout or daily rolling files.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_FILE_PREFIX: &str = "nota-kiosk";

/// Initialize the logger at `info` on stdout
pub fn init_logger() -> bool {
    init_logger_with_file(None, false, None)
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` takes precedence over `log_level`. When `log_dir` can be
/// created, logs go to a daily rolling file there instead of stdout.
/// Returns `false` if a global subscriber was already installed.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match log_dir {
        Some(dir) if std::fs::create_dir_all(Path::new(dir)).is_ok() => {
            BoxMakeWriter::new(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX))
        }
        _ => BoxMakeWriter::new(std::io::stdout),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .with_writer(writer);

    let installed = if json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        if !init_logger_with_file(Some("debug"), false, log_dir.to_str()) {
            // Another test owns the global subscriber
            return;
        }
        tracing::info!("logger ready");

        let files: Vec<_> = std::fs::read_dir(&log_dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(files.iter().any(|name| name.starts_with(LOG_FILE_PREFIX)));
        assert!(!init_logger(), "second install must be refused");
    }
}
