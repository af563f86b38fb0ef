//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the Reference Library Core.
//!
//! Supports pretty-printed output for interactive use and JSON for log
//! shippers. Filtering honours `RUST_LOG` when present, falling back to the
//! level configured on [`LoggingConfig`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Json))?;
//! tracing::info!("engine started");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Compact single-line output.
    Compact,
    /// Newline-delimited JSON.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Default directive applied when `RUST_LOG` is unset.
    pub default_directive: String,
    /// Include span targets in output.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            default_directive: "info".to_string(),
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the fallback filter directive (e.g. `"core_resolver=debug,info"`).
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    /// Toggle emission of event targets.
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Initialise the global tracing subscriber.
///
/// # Errors
///
/// Returns `Error::Internal` if a global subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| Error::Internal(format!("failed to install tracing subscriber: {}", e)))
}
