//! Logging initialization for coachflow.
//!
//! TUI mode: logs to `<state>/logs/coachflow-{datetime}.log`
//! CLI mode: logs to stderr

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file output when dropped; keep it alive until exit.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in TUI mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Log file name for a run started at `started`
pub fn log_file_name(started: DateTime<Utc>) -> String {
    format!("coachflow-{}.log", started.format("%Y%m%dT%H%M%SZ"))
}

fn env_filter(config: &Config, debug_override: bool) -> EnvFilter {
    let level = if debug_override {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize logging for the chosen mode.
///
/// The TUI owns the terminal, so it logs to a file; CLI commands log to
/// stderr so stdout stays clean for their output. `--debug` forces the
/// level to debug; `RUST_LOG` overrides both.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = env_filter(config, debug_override);

    if is_tui_mode && config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

        let log_filename = log_file_name(Utc::now());
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_format() {
        let started = Utc.with_ymd_and_hms(2024, 11, 20, 9, 5, 30).unwrap();
        assert_eq!(log_file_name(started), "coachflow-20241120T090530Z.log");
    }

    #[test]
    fn test_debug_override_wins_over_config_level() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter(&config, true).to_string(), "debug");
            assert_eq!(env_filter(&config, false).to_string(), "warn");
        }
    }
}
