//! Crawler error types.

use eventfeed_providers::SourceError;
use thiserror::Error;

/// Result type for crawler operations.
pub type CrawlerResult<T> = Result<T, CrawlerError>;

/// Errors that end a crawl run.
///
/// Failures of individual sources are not represented here; they are
/// isolated by the aggregator and only reported.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Shared fetch setup failed, e.g. the HTTP client could not be built.
    #[error("Fetcher setup failed: {0}")]
    Fetcher(#[from] SourceError),

    /// Writing the aggregated collection failed.
    #[error("Failed to write {path}: {message}")]
    Sink { path: String, message: String },
}

impl CrawlerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a sink error.
    pub fn sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            path: path.into(),
            message: message.into(),
        }
    }
}
