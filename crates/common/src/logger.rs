use crate::error::RagVecError;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "ragvec.log";

/// Initialize logging
///
/// Console output always; when `log_dir` is given, a second non-ANSI layer
/// appends to `ragvec.log` in that directory. `RUST_LOG` takes precedence
/// over `log_level`.
pub fn setup_logging(log_dir: Option<&Path>, log_level: &str) -> Result<(), RagVecError> {
    parse_log_level(log_level)?;

    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter());

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                RagVecError::config(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;

            let log_file_path = dir.join(LOG_FILE_NAME);
            let log_file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file_path)
                .map_err(|e| {
                    RagVecError::config(format!(
                        "Failed to open log file {}: {}",
                        log_file_path.display(),
                        e
                    ))
                })?;

            Some(
                fmt::layer()
                    .with_writer(log_file)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| RagVecError::config(format!("Logging already initialized: {}", e)))?;

    match log_dir {
        Some(dir) => tracing::info!(
            "Logging initialized: level={}, log_file={}",
            log_level,
            dir.join(LOG_FILE_NAME).display()
        ),
        None => tracing::info!("Console logging initialized: level={}", log_level),
    }

    Ok(())
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level, RagVecError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(RagVecError::config(format!("Invalid log level '{}'", level))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
        assert!(parse_log_level("invalid").is_err());
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
    }

    #[test]
    fn test_setup_rejects_bad_level_before_init() {
        assert!(setup_logging(None, "verbose").is_err());
    }
}
