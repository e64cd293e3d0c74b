//! Tracing initialization.
//!
//! Structured logging for the upload pipeline via `tracing` and
//! `tracing-subscriber`: env-filter based level control, a choice of output
//! formats, and idempotent initialization so tests and embedding applications
//! can both call it safely.
//!
//! # Example
//! ```no_run
//! use photobooth_upload::{config::Settings, logging};
//!
//! # fn main() -> Result<(), photobooth_upload::error::UploadError> {
//! let settings = Settings::load()?;
//! logging::init_from_settings(&settings)?;
//! tracing::info!("upload pipeline starting");
//! # Ok(())
//! # }
//! ```

use crate::config::Settings;
use crate::error::{UploadError, UploadResult};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable, colored (development)
    Pretty,
    /// Single-line, no colors (production)
    Compact,
    /// JSON for log aggregation
    Json,
}

/// Options for [`init`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level when `RUST_LOG` is not set
    pub level: Level,
    /// Line format
    pub format: OutputFormat,
    /// Include worker thread names (`uploader-drive` etc.) in output
    pub with_thread_names: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: OutputFormat::Pretty,
            with_thread_names: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Initialize tracing from loaded settings.
///
/// Reads the level from `[application] log_level`; `RUST_LOG` still wins when
/// set.
pub fn init_from_settings(settings: &Settings) -> UploadResult<()> {
    let level = parse_log_level(&settings.application.log_level)?;
    init(LogConfig::new(level))
}

/// Initialize tracing with explicit options.
///
/// Idempotent: when a global subscriber is already installed this returns
/// `Ok(())`, which keeps it safe to call from tests and from applications
/// that embed the crate.
pub fn init(config: LogConfig) -> UploadResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string().to_lowercase()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_thread_names(config.with_thread_names);

    let result = match config.format {
        OutputFormat::Pretty => builder.pretty().try_init(),
        OutputFormat::Compact => builder.compact().with_ansi(false).try_init(),
        OutputFormat::Json => builder.json().try_init(),
    };

    match result {
        Ok(()) => Ok(()),
        // Another subscriber got there first; not an error for us.
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(UploadError::Tracing(e.to_string())),
    }
}

/// Parse a configuration log level string into a tracing [`Level`].
pub fn parse_log_level(level: &str) -> UploadResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(UploadError::Tracing(format!(
            "Invalid log level '{other}'. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_levels() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("Info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn init_is_idempotent() {
        let config = LogConfig::new(Level::WARN).with_format(OutputFormat::Compact);
        assert!(init(config.clone()).is_ok());
        assert!(init(config).is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = LogConfig::new(Level::DEBUG).with_format(OutputFormat::Json);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.with_thread_names);
    }
}
