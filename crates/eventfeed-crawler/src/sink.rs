//! Output sinks for the aggregated collection.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use eventfeed_core::CanonicalEvent;
use eventfeed_providers::BoxFuture;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{CrawlerError, CrawlerResult};

/// Receives the final collection of a run.
pub trait EventSink: Send + Sync {
    /// Writes the collection, replacing whatever a previous run wrote.
    fn write<'a>(&'a self, events: &'a [CanonicalEvent]) -> BoxFuture<'a, CrawlerResult<()>>;
}

/// Writes the collection as one compact JSON array to a file.
///
/// The array is written to a sibling `.tmp` file, synced to disk and renamed
/// over the target, so readers never observe a partially written file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn write_json(&self, events: &[CanonicalEvent]) -> CrawlerResult<()> {
        let display = self.path.display().to_string();
        let sink_error = |e: &dyn std::fmt::Display| CrawlerError::sink(&display, e.to_string());

        let bytes = serde_json::to_vec(events).map_err(|e| sink_error(&e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| sink_error(&e))?;
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| sink_error(&e))?;
        file.write_all(&bytes).await.map_err(|e| sink_error(&e))?;
        file.flush().await.map_err(|e| sink_error(&e))?;
        file.sync_all().await.map_err(|e| sink_error(&e))?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(sink_error(&e));
        }

        let path = &display;
        info!(path = %path, events = events.len(), bytes = bytes.len(), "events written");
        Ok(())
    }
}

impl EventSink for JsonFileSink {
    fn write<'a>(&'a self, events: &'a [CanonicalEvent]) -> BoxFuture<'a, CrawlerResult<()>> {
        Box::pin(self.write_json(events))
    }
}
