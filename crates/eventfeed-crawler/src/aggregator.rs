//! Concurrent fan-out over all sources and fan-in of their events.
//!
//! Every source runs its own pipeline in a separate task. A failing or
//! panicking source contributes nothing and is reported; the others are
//! unaffected. Successful lists are concatenated in the order the tasks
//! settle, so the output order across sources is not stable between runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use eventfeed_core::CanonicalEvent;
use eventfeed_providers::{
    Fetcher, ParseOptions, SourceDescriptor, SourceErrorCode, SourceKind, run_pipeline,
};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::CrawlerResult;
use crate::sink::EventSink;

/// How one source's pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source contributed this many events.
    Succeeded { events: usize },
    /// The source contributed nothing.
    Failed {
        /// Error code, `None` when the task panicked.
        code: Option<SourceErrorCode>,
        /// Human-readable reason.
        error: String,
    },
}

/// Outcome of one source within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub organizer: String,
    pub kind: SourceKind,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    /// Returns true if the source contributed its events.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SourceOutcome::Succeeded { .. })
    }
}

impl fmt::Display for SourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SourceOutcome::Succeeded { events } => {
                write!(f, "{} ({}): {} events", self.organizer, self.kind, events)
            }
            SourceOutcome::Failed { error, .. } => {
                write!(f, "{} ({}): failed: {}", self.organizer, self.kind, error)
            }
        }
    }
}

/// Result of a whole run: the merged collection and one report per source.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Concatenation of every successful source's events.
    pub events: Vec<CanonicalEvent>,
    /// Per-source reports in settlement order.
    pub sources: Vec<SourceReport>,
}

impl RunReport {
    /// Number of sources that contributed.
    pub fn succeeded(&self) -> usize {
        self.sources.iter().filter(|s| s.is_success()).count()
    }

    /// Number of sources that failed.
    pub fn failed(&self) -> usize {
        self.sources.len() - self.succeeded()
    }

    /// Returns the report for `organizer`, if that source ran.
    pub fn source(&self, organizer: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.organizer == organizer)
    }
}

/// Runs all source pipelines concurrently and merges their output.
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn Fetcher>,
    options: ParseOptions,
}

impl Aggregator {
    /// Creates an aggregator using `fetcher` for every source.
    pub fn new(fetcher: Arc<dyn Fetcher>, options: ParseOptions) -> Self {
        Self { fetcher, options }
    }

    /// Runs every source to completion and merges the successful results.
    ///
    /// Never fails: source errors and task panics end up in the report.
    pub async fn run(&self, sources: Vec<SourceDescriptor>) -> RunReport {
        let mut tasks = JoinSet::new();
        let mut labels = HashMap::with_capacity(sources.len());

        for source in sources {
            let fetcher = Arc::clone(&self.fetcher);
            let options = self.options;
            let label = (source.organizer.clone(), source.kind);

            debug!(
                organizer = %source.organizer,
                kind = %source.kind,
                endpoint = %source.endpoint,
                "starting source"
            );
            let handle = tasks.spawn(async move {
                run_pipeline(fetcher.as_ref(), &source, &options).await
            });
            labels.insert(handle.id(), label);
        }

        let mut report = RunReport::default();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, Ok(events))) => {
                    let count = events.len();
                    report.events.extend(events);
                    (id, SourceOutcome::Succeeded { events: count })
                }
                Ok((id, Err(e))) => (
                    id,
                    SourceOutcome::Failed {
                        code: Some(e.code()),
                        error: e.to_string(),
                    },
                ),
                Err(e) => (
                    e.id(),
                    SourceOutcome::Failed {
                        code: None,
                        error: format!("source task failed: {}", e),
                    },
                ),
            };

            let Some((organizer, kind)) = labels.remove(&id) else {
                continue;
            };
            match &outcome {
                SourceOutcome::Succeeded { events } => {
                    info!(
                        organizer = %organizer,
                        kind = %kind,
                        events,
                        "read and processed calendar"
                    );
                }
                SourceOutcome::Failed { error, .. } => {
                    error!(
                        organizer = %organizer,
                        kind = %kind,
                        error = %error,
                        "could not retrieve calendar"
                    );
                }
            }
            report.sources.push(SourceReport {
                organizer,
                kind,
                outcome,
            });
        }

        info!(
            events = report.events.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "all sources settled"
        );
        report
    }

    /// Runs every source and hands the merged collection to `sink`.
    ///
    /// An empty collection is written too.
    ///
    /// # Errors
    ///
    /// Returns the sink error; source failures never fail the run.
    pub async fn crawl(
        &self,
        sources: Vec<SourceDescriptor>,
        sink: &dyn EventSink,
    ) -> CrawlerResult<RunReport> {
        let report = self.run(sources).await;
        sink.write(&report.events).await?;
        Ok(report)
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{Offset, Utc};
    use eventfeed_providers::{BoxFuture, FeedZone, RawPayload, SourceError, SourceResult};

    use super::*;

    /// Serves canned bodies or statuses keyed by organizer.
    struct ScriptedFetcher {
        bodies: HashMap<&'static str, Result<String, u16>>,
        delays: HashMap<&'static str, Duration>,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                delays: HashMap::new(),
            }
        }

        fn body(mut self, organizer: &'static str, body: impl Into<String>) -> Self {
            self.bodies.insert(organizer, Ok(body.into()));
            self
        }

        fn status(mut self, organizer: &'static str, status: u16) -> Self {
            self.bodies.insert(organizer, Err(status));
            self
        }

        fn delay(mut self, organizer: &'static str, delay: Duration) -> Self {
            self.delays.insert(organizer, delay);
            self
        }
    }

    impl Fetcher for ScriptedFetcher {
        fn fetch<'a>(
            &'a self,
            source: &'a SourceDescriptor,
        ) -> BoxFuture<'a, SourceResult<RawPayload<'a>>> {
            Box::pin(async move {
                let organizer = source.organizer.as_str();
                if organizer == "Panics" {
                    panic!("fetcher bug");
                }
                if let Some(delay) = self.delays.get(organizer) {
                    tokio::time::sleep(*delay).await;
                }
                match self.bodies.get(organizer) {
                    Some(Ok(body)) => Ok(RawPayload::new(source, body.clone())),
                    Some(Err(status)) => Err(SourceError::http_status(*status, "scripted")
                        .with_organizer(organizer)),
                    None => Err(SourceError::network("no route").with_organizer(organizer)),
                }
            })
        }
    }

    /// Keeps the last written collection.
    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Option<Vec<CanonicalEvent>>>,
    }

    impl EventSink for MemorySink {
        fn write<'a>(&'a self, events: &'a [CanonicalEvent]) -> BoxFuture<'a, CrawlerResult<()>> {
            *self.written.lock().unwrap() = Some(events.to_vec());
            Box::pin(async { Ok(()) })
        }
    }

    fn feed(summary: &str, start: &str, end: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:{summary}@test\r\n\
             DTSTART:{start}\r\nDTEND:{end}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
        )
    }

    fn api_body() -> String {
        serde_json::json!([{
            "id": 7,
            "starts": "2024-03-01T18:00:00+02:00",
            "ends": "2024-03-01T23:00:00+02:00",
            "signup_starts": "2024-02-20T12:00:00+02:00",
            "signup_ends": null,
            "name_fi": "Sitsit",
            "name_en": "Sitsit party",
            "description_fi": "Perinteiset sitsit",
            "description_en": null,
            "location_fi": "Hervanta",
            "location_en": "Hervanta",
            "max_attendees": 80,
            "reserve_spots": true,
            "group": "hallitus",
            "signup": true,
            "participants_public": false,
            "email": true,
            "email_required": true,
            "email_public": false,
            "phone": false,
            "phone_required": false,
            "phone_public": false,
            "created": "2024-02-01T10:00:00+02:00"
        }])
        .to_string()
    }

    fn feed_source(organizer: &str) -> SourceDescriptor {
        SourceDescriptor::calendar_feed(format!("https://example.com/{organizer}.ics"), organizer)
            .unwrap()
    }

    fn api_source() -> SourceDescriptor {
        SourceDescriptor::structured_api("https://example.com/api/events", "TiTe").unwrap()
    }

    fn aggregator(fetcher: ScriptedFetcher) -> Aggregator {
        let options = ParseOptions::default().with_feed_zone(FeedZone::Fixed(Utc.fix()));
        Aggregator::new(Arc::new(fetcher), options)
    }

    fn keys(events: &[CanonicalEvent]) -> HashSet<(String, String)> {
        events
            .iter()
            .map(|e| (e.primary_organizer().to_string(), e.name.primary.clone()))
            .collect()
    }

    #[tokio::test]
    async fn merges_all_successful_sources() {
        let fetcher = ScriptedFetcher::new()
            .body("TiTe", api_body())
            .body("Skilta", feed("Sauna", "20240301T160000Z", "20240301T200000Z"))
            .body("Luuppi", feed("Excursion", "20240305T000000Z", "20240306T000000Z"));
        let sources = vec![api_source(), feed_source("Skilta"), feed_source("Luuppi")];

        let report = aggregator(fetcher).run(sources).await;

        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(
            keys(&report.events),
            HashSet::from([
                ("TiTe".to_string(), "Sitsit".to_string()),
                ("Skilta".to_string(), "Sauna".to_string()),
                ("Luuppi".to_string(), "Excursion".to_string()),
            ])
        );
        let excursion = report
            .events
            .iter()
            .find(|e| e.name.primary == "Excursion")
            .unwrap();
        assert!(excursion.is_full_day);
        assert_eq!(report.source("TiTe").unwrap().outcome, SourceOutcome::Succeeded { events: 1 });
    }

    #[tokio::test]
    async fn failing_source_is_isolated() {
        let fetcher = ScriptedFetcher::new()
            .status("Indecs", 503)
            .body("Skilta", feed("Sauna", "20240301T160000Z", "20240301T200000Z"))
            .body("Urbanum", "<html>moved</html>");
        let sources = vec![feed_source("Indecs"), feed_source("Skilta"), feed_source("Urbanum")];

        let report = aggregator(fetcher).run(sources).await;

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].organizers, vec!["Skilta"]);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);

        let indecs = report.source("Indecs").unwrap();
        assert!(matches!(
            indecs.outcome,
            SourceOutcome::Failed { code: Some(SourceErrorCode::ServerError), .. }
        ));
        assert!(indecs.to_string().starts_with("Indecs (calendar_feed): failed:"));
        let urbanum = report.source("Urbanum").unwrap();
        assert!(matches!(
            urbanum.outcome,
            SourceOutcome::Failed { code: Some(SourceErrorCode::InvalidPayload), .. }
        ));
    }

    #[tokio::test]
    async fn panicking_source_is_isolated() {
        let fetcher = ScriptedFetcher::new()
            .body("Skilta", feed("Sauna", "20240301T160000Z", "20240301T200000Z"));
        let sources = vec![feed_source("Panics"), feed_source("Skilta")];

        let report = aggregator(fetcher).run(sources).await;

        assert_eq!(report.events.len(), 1);
        let panicked = report.source("Panics").unwrap();
        assert!(matches!(panicked.outcome, SourceOutcome::Failed { code: None, .. }));
    }

    #[tokio::test]
    async fn all_failing_still_writes_empty_collection() {
        let fetcher = ScriptedFetcher::new().status("Indecs", 404).status("TiTe", 500);
        let sink = MemorySink::default();

        let report = aggregator(fetcher)
            .crawl(vec![api_source(), feed_source("Indecs")], &sink)
            .await
            .unwrap();

        assert_eq!(report.failed(), 2);
        assert_eq!(sink.written.lock().unwrap().as_deref(), Some(&[][..]));
    }

    #[tokio::test]
    async fn no_sources_writes_empty_collection() {
        let sink = MemorySink::default();
        let report = aggregator(ScriptedFetcher::new())
            .crawl(Vec::new(), &sink)
            .await
            .unwrap();
        assert!(report.sources.is_empty());
        assert_eq!(sink.written.lock().unwrap().as_deref(), Some(&[][..]));
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_settlement_order() {
        let fetcher = ScriptedFetcher::new()
            .body("Slow", feed("Late", "20240301T160000Z", "20240301T200000Z"))
            .delay("Slow", Duration::from_secs(5))
            .body("Fast", feed("Early", "20240302T160000Z", "20240302T200000Z"))
            .delay("Fast", Duration::from_secs(1));
        let sources = vec![feed_source("Slow"), feed_source("Fast")];

        let report = aggregator(fetcher).run(sources).await;

        let organizers: Vec<_> = report.sources.iter().map(|s| s.organizer.as_str()).collect();
        assert_eq!(organizers, vec!["Fast", "Slow"]);
        assert_eq!(report.events[0].name.primary, "Early");
        assert_eq!(report.events[1].name.primary, "Late");
    }

    #[tokio::test]
    async fn repeated_runs_are_equal_as_sets() {
        let make = || {
            ScriptedFetcher::new()
                .body("TiTe", api_body())
                .body("Skilta", feed("Sauna", "20240301T160000Z", "20240301T200000Z"))
                .status("Indecs", 500)
        };
        let sources = || vec![api_source(), feed_source("Skilta"), feed_source("Indecs")];

        let first = aggregator(make()).run(sources()).await;
        let second = aggregator(make()).run(sources()).await;

        let as_set = |r: &RunReport| r.events.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(as_set(&first), as_set(&second));
        assert_eq!(first.events.len(), second.events.len());
    }
}
