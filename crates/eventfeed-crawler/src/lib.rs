//! Crawl orchestration for eventfeed.
//!
//! - [`Aggregator`] - concurrent fan-out over sources, fan-in of events
//! - [`EventSink`] / [`JsonFileSink`] - where the merged collection goes
//! - [`CrawlerConfig`] - TOML configuration
//! - [`crawl`] - one complete run from configuration to written file

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod sink;

use std::sync::Arc;

use eventfeed_providers::HttpFetcher;
use tracing::info;

pub use aggregator::{Aggregator, RunReport, SourceOutcome, SourceReport};
pub use config::CrawlerConfig;
pub use error::{CrawlerError, CrawlerResult};
pub use sink::{EventSink, JsonFileSink};

/// Crawls every configured source once and writes the merged collection.
///
/// # Errors
///
/// Fails only if the HTTP client cannot be built or the output cannot be
/// written. Individual sources failing is reported, not returned.
pub async fn crawl(config: &CrawlerConfig) -> CrawlerResult<RunReport> {
    let fetcher = HttpFetcher::new(&config.fetch_config())?;
    let aggregator = Aggregator::new(Arc::new(fetcher), config.parse_options());
    let sink = JsonFileSink::new(&config.output);
    let sources = config.sources();

    info!(
        sources = sources.len(),
        output = %config.output.display(),
        cutoff = %config.cutoff,
        "starting crawl"
    );
    aggregator.crawl(sources, &sink).await
}
