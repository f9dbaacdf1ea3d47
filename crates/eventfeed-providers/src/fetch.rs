//! Fetching source payloads over HTTP.
//!
//! [`Fetcher`] is the seam between the pipeline and the network: the
//! production [`HttpFetcher`] performs one GET per call with a bounded
//! timeout and no retries, and tests substitute their own implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{trace, warn};

use crate::error::{SourceError, SourceResult};
use crate::raw_payload::RawPayload;
use crate::source::SourceDescriptor;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retrieves the raw payload of one source.
///
/// Implementations perform exactly one retrieval per call and report every
/// failure as a [`SourceError`] carrying the source's organizer label.
pub trait Fetcher: Send + Sync {
    /// Fetches the payload of `source`.
    fn fetch<'a>(&'a self, source: &'a SourceDescriptor)
    -> BoxFuture<'a, SourceResult<RawPayload<'a>>>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound for one request, connect to last body byte.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl FetchConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

/// Returns the default user agent, `eventfeed/<version>`.
pub fn default_user_agent() -> String {
    format!("eventfeed/{}", env!("CARGO_PKG_VERSION"))
}

/// Fetches payloads with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                SourceError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client })
    }

    /// Creates a fetcher around an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get<'a>(&self, source: &'a SourceDescriptor) -> SourceResult<RawPayload<'a>> {
        let organizer = source.organizer.as_str();
        trace!(organizer, url = %source.endpoint, "sending request");

        let response = self
            .client
            .get(source.endpoint.clone())
            .send()
            .await
            .map_err(|e| transport_error(e, "request failed").with_organizer(organizer))?;

        let body = read_body(response)
            .await
            .map_err(|e| e.with_organizer(organizer))?;

        Ok(RawPayload::new(source, body))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        source: &'a SourceDescriptor,
    ) -> BoxFuture<'a, SourceResult<RawPayload<'a>>> {
        Box::pin(self.get(source))
    }
}

/// Checks the status and extracts the body.
async fn read_body(response: Response) -> SourceResult<String> {
    let status = response.status();
    trace!(status = %status, "received response");

    if status.is_success() {
        return response
            .text()
            .await
            .map_err(|e| transport_error(e, "failed to read response"));
    }

    let reason = status.canonical_reason().unwrap_or("unknown status");
    if status != StatusCode::NOT_FOUND && !status.is_server_error() {
        warn!(status = %status, "unexpected response status");
    }
    Err(SourceError::http_status(
        status.as_u16(),
        format!("endpoint answered {} {}", status.as_u16(), reason),
    ))
}

fn transport_error(e: reqwest::Error, context: &str) -> SourceError {
    let err = if e.is_timeout() {
        SourceError::timeout(format!("{}: timed out", context))
    } else {
        SourceError::network(format!("{}: {}", context, e))
    };
    err.with_source(e)
}
