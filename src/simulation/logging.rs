//! Logging and tracing configuration
//!
//! Two outputs exist side by side. Diagnostic logging goes through `tracing`
//! and is configured here with [`LoggingConfig`]. The run log is the list of
//! [`LogRecord`]s a simulation produces, one per processed event, which is
//! part of the run's results and is handed to the persistence sink.

use crate::types::Minutes;
use serde::{Deserialize, Serialize};
use std::io;
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Boxed error returned by subscriber initialization
pub type LoggingInitError = Box<dyn std::error::Error + Send + Sync>;

/// One human-readable entry of the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Description of what happened
    pub message: String,
    /// Virtual time of the entry
    pub at: Minutes,
    /// Whether the entry reports a failure
    pub is_error: bool,
}

impl LogRecord {
    /// Informational entry
    pub fn info(message: impl Into<String>, at: Minutes) -> Self {
        Self { message: message.into(), at, is_error: false }
    }

    /// Failure entry
    pub fn error(message: impl Into<String>, at: Minutes) -> Self {
        Self { message: message.into(), at, is_error: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate
    pub level: Level,
    /// Whether to emit JSON lines instead of pretty output
    pub json_format: bool,
    /// Directory for daily rolling log files, if file logging is enabled
    pub log_directory: Option<String>,
    /// Log file prefix
    pub log_file_prefix: String,
    /// Whether to log span open/close events
    pub enable_span_events: bool,
    /// Whether to use ANSI colors on the console
    pub enable_ansi: bool,
    /// Custom filter directive, overriding `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_directory: None,
            log_file_prefix: "shop-floor-simulator".to_string(),
            enable_span_events: false,
            enable_ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration matching the CLI verbosity flags
    pub fn from_verbosity(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => Self::new().with_level(Level::DEBUG).with_span_events(),
            (true, false) => Self::new().with_level(Level::INFO),
            (false, false) => Self::new(),
        }
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable JSON formatting
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable daily rolling file logging
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Set log file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_file_prefix = prefix.into();
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.enable_span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggingInitError> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!(
                    "{}={}",
                    env!("CARGO_PKG_NAME").replace('-', "_"),
                    self.level
                ))
            })),
        }
    }

    /// Initialize the global tracing subscriber
    ///
    /// Console output always goes to stderr so that reports written to stdout
    /// stay machine-readable. The returned guard flushes the log file when
    /// dropped and must be held for the lifetime of the program.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingInitError> {
        let filter = self.build_filter()?;

        let console_layer = if self.json_format {
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(self.span_events())
                .boxed()
        } else {
            fmt::layer()
                .pretty()
                .with_writer(io::stderr)
                .with_ansi(self.enable_ansi)
                .with_span_events(self.span_events())
                .boxed()
        };

        let (file_layer, guard) = match &self.log_directory {
            Some(directory) => {
                let appender = rolling::daily(directory, &self.log_file_prefix);
                let (writer, guard) = non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(self.span_events())
                    .boxed();
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        Registry::default().with(filter).with(console_layer).with(file_layer).try_init()?;

        info!(level = %self.level, json = self.json_format, "Logging initialized");
        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_creation() {
        let config = LoggingConfig::new();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.json_format);
        assert!(config.log_directory.is_none());
        assert_eq!(config.log_file_prefix, "shop-floor-simulator");
        assert!(!config.enable_span_events);
        assert!(config.enable_ansi);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn test_logging_config_builder_pattern() {
        let config = LoggingConfig::new()
            .with_level(Level::DEBUG)
            .with_json_format()
            .with_file_logging("run_logs")
            .with_file_prefix("line-4")
            .with_span_events()
            .without_ansi()
            .with_env_filter("shop_floor_simulator=trace");

        assert_eq!(config.level, Level::DEBUG);
        assert!(config.json_format);
        assert_eq!(config.log_directory, Some("run_logs".to_string()));
        assert_eq!(config.log_file_prefix, "line-4");
        assert!(config.enable_span_events);
        assert!(!config.enable_ansi);
        assert_eq!(config.env_filter, Some("shop_floor_simulator=trace".to_string()));
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(LoggingConfig::from_verbosity(false, false).level, Level::WARN);
        assert_eq!(LoggingConfig::from_verbosity(true, false).level, Level::INFO);

        let debug = LoggingConfig::from_verbosity(true, true);
        assert_eq!(debug.level, Level::DEBUG);
        assert!(debug.enable_span_events);
    }

    #[test]
    fn test_log_record_constructors() {
        let ok = LogRecord::info("Task T1 started by OP1", 12.5);
        assert!(!ok.is_error);
        assert_eq!(ok.at, 12.5);

        let failed = LogRecord::error("Event EVT-000003 failed", 30.0);
        assert!(failed.is_error);
    }
}
