//! Crawler configuration.
//!
//! Everything is optional: without a config file the crawler writes
//! `events.json` from the built-in source registry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use eventfeed_core::default_cutoff;
use eventfeed_providers::{
    FeedZone, FetchConfig, ParseOptions, SourceDescriptor, default_sources, default_user_agent,
};
use serde::{Deserialize, Serialize};

use crate::error::{CrawlerError, CrawlerResult};

/// Configuration for one crawl run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Where the aggregated collection is written.
    pub output: PathBuf,

    /// Per-fetch timeout in seconds.
    pub timeout_secs: u64,

    /// HTTP User-Agent.
    pub user_agent: String,

    /// Structured API events starting before this instant are dropped.
    pub cutoff: DateTime<Utc>,

    /// Zone for feed times without an explicit offset.
    pub feed_timezone: FeedZone,

    /// Sources to crawl. Empty means the built-in registry.
    pub sources: Vec<SourceDescriptor>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("events.json"),
            timeout_secs: FetchConfig::DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            cutoff: default_cutoff(),
            feed_timezone: FeedZone::default(),
            sources: Vec::new(),
        }
    }
}

impl CrawlerConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn load_from(path: &Path) -> CrawlerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrawlerError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| CrawlerError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> CrawlerResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CrawlerError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: set the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Builder: set the sources.
    pub fn with_sources(mut self, sources: Vec<SourceDescriptor>) -> Self {
        self.sources = sources;
        self
    }

    /// Checks what deserialization alone cannot.
    pub fn validate(&self) -> CrawlerResult<()> {
        if self.timeout_secs == 0 {
            return Err(CrawlerError::config("timeout_secs must be positive"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(CrawlerError::config("output path is empty"));
        }
        for source in &self.sources {
            source
                .validate()
                .map_err(|e| CrawlerError::config(e.to_string()))?;
        }
        Ok(())
    }

    /// Returns the sources to crawl, falling back to the built-in registry.
    pub fn sources(&self) -> Vec<SourceDescriptor> {
        if self.sources.is_empty() {
            default_sources()
        } else {
            self.sources.clone()
        }
    }

    /// Returns the HTTP fetcher settings.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_user_agent(&self.user_agent)
    }

    /// Returns the parser settings.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
            .with_cutoff(self.cutoff)
            .with_feed_zone(self.feed_timezone)
    }
}
