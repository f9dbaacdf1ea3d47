//! Log subscriber setup shared by the eventfeed binaries.
//!
//! Logs go to stderr so stdout stays free for piping. The filter is taken
//! from an explicit directive, then `RUST_LOG`, then `eventfeed=<level>`.
//!
//! ```ignore
//! use eventfeed_core::tracing::{init_tracing, TracingConfig};
//!
//! // cron / CI runs feeding a log collector
//! init_tracing(&TracingConfig::scheduled())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Errors from subscriber installation.
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),

    /// The filter directive does not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Layout of emitted log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, human readable
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event
    Json,
}

/// How logs are filtered and laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for eventfeed crates when neither `env_filter` nor `RUST_LOG` is set.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Emit source file and line.
    pub include_location: bool,
    pub include_timestamp: bool,
    /// Explicit filter directive, takes precedence over `RUST_LOG`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Pretty,
            include_location: false,
            include_timestamp: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Debug level, one line per event, with source locations.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            format: TracingOutputFormat::Compact,
            include_location: true,
            include_timestamp: false,
            env_filter: None,
        }
    }

    /// JSON lines for unattended runs.
    #[must_use]
    pub fn scheduled() -> Self {
        Self {
            format: TracingOutputFormat::Json,
            include_location: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Builds the filter: explicit directive, else `RUST_LOG`, else the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit directive does not parse.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match self.env_filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level)))),
        }
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location);

        match (self.format, self.include_timestamp) {
            (TracingOutputFormat::Pretty, true) => base.pretty().boxed(),
            (TracingOutputFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (TracingOutputFormat::Compact, true) => base.compact().boxed(),
            (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
            (TracingOutputFormat::Json, true) => base.json().boxed(),
            (TracingOutputFormat::Json, false) => base.json().without_time().boxed(),
        }
    }
}

/// Returns the filter directive used when `RUST_LOG` is not set.
pub fn default_directive(level: Level) -> String {
    format!("eventfeed={}", level)
}

/// Installs the global subscriber. Call once, first thing in `main`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or the filter
/// directive is invalid.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    tracing_subscriber::registry()
        .with(config.layer())
        .with(filter)
        .try_init()?;
    Ok(())
}
