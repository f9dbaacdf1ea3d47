//! Error types for event source operations.
//!
//! A [`SourceError`] describes why one source produced no events. It never
//! escapes the per-source pipeline as a fatal error; the aggregator logs it
//! with the organizer label and carries on with the other sources.

use std::fmt;
use thiserror::Error;

/// The category of a source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorCode {
    /// Connection failed, DNS resolution failed, body could not be read.
    NetworkError,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The endpoint answered 404.
    NotFound,
    /// The endpoint answered with a 5xx status.
    ServerError,
    /// The endpoint answered with any other non-2xx status.
    HttpStatus,
    /// The payload could not be parsed as the expected format.
    InvalidPayload,
    /// The source or HTTP client is misconfigured.
    ConfigurationError,
    /// The pipeline failed unexpectedly (e.g. the task panicked).
    InternalError,
}

impl SourceErrorCode {
    /// Returns true if the error happened while retrieving the payload.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::Timeout | Self::NotFound | Self::ServerError | Self::HttpStatus
        )
    }

    /// Returns true if the payload was retrieved but could not be parsed.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::InvalidPayload)
    }

    /// Returns a machine-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::ServerError => "server_error",
            Self::HttpStatus => "http_status",
            Self::InvalidPayload => "invalid_payload",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that made one source contribute zero events.
#[derive(Debug, Error)]
pub struct SourceError {
    code: SourceErrorCode,
    message: String,
    /// Organizer label of the failing source.
    organizer: Option<String>,
    /// HTTP status, when the endpoint answered with a non-2xx status.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Creates a new source error with the given code and message.
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            organizer: None,
            status: None,
            source: None,
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Timeout, message)
    }

    /// Creates an error for a non-2xx HTTP status, picking the code from it.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            404 => SourceErrorCode::NotFound,
            500..=599 => SourceErrorCode::ServerError,
            _ => SourceErrorCode::HttpStatus,
        };
        let mut err = Self::new(code, message);
        err.status = Some(status);
        err
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::InvalidPayload, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::InternalError, message)
    }

    /// Sets the organizer label of the failing source.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = Some(organizer.into());
        self
    }

    /// Sets the underlying error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> SourceErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the organizer label, if set.
    pub fn organizer(&self) -> Option<&str> {
        self.organizer.as_deref()
    }

    /// Returns the HTTP status, if the failure was a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref organizer) = self.organizer {
            write!(f, "[{}] ", organizer)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_categories() {
        assert!(SourceErrorCode::NetworkError.is_fetch_failure());
        assert!(SourceErrorCode::Timeout.is_fetch_failure());
        assert!(SourceErrorCode::ServerError.is_fetch_failure());
        assert!(!SourceErrorCode::InvalidPayload.is_fetch_failure());
        assert!(SourceErrorCode::InvalidPayload.is_parse_failure());
        assert!(!SourceErrorCode::InternalError.is_parse_failure());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(SourceErrorCode::InvalidPayload.as_str(), "invalid_payload");
        assert_eq!(SourceErrorCode::NotFound.to_string(), "not_found");
    }

    #[test]
    fn http_status_picks_code() {
        let err = SourceError::http_status(404, "gone");
        assert_eq!(err.code(), SourceErrorCode::NotFound);
        assert_eq!(err.status(), Some(404));

        let err = SourceError::http_status(503, "maintenance");
        assert_eq!(err.code(), SourceErrorCode::ServerError);

        let err = SourceError::http_status(403, "private calendar");
        assert_eq!(err.code(), SourceErrorCode::HttpStatus);
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn source_error_with_organizer() {
        let err = SourceError::network("connection reset").with_organizer("Luuppi");
        assert_eq!(err.code(), SourceErrorCode::NetworkError);
        assert_eq!(err.organizer(), Some("Luuppi"));
        assert!(err.status().is_none());
    }

    #[test]
    fn source_error_display() {
        let err = SourceError::http_status(500, "upstream failure").with_organizer("Skilta");
        let display = format!("{}", err);
        assert_eq!(display, "[Skilta] server_error: upstream failure");
    }

    #[test]
    fn source_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("broken pipe");
        let err = SourceError::network("read failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
