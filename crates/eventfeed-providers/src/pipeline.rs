//! The per-source pipeline: Fetch → Parse → Normalize.
//!
//! [`run_pipeline`] is what the aggregator runs once per source. The only
//! suspension point is the fetch; parsing and normalization are synchronous.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use eventfeed_core::{CanonicalEvent, default_cutoff};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::api::parse_api_payload;
use crate::candidate::CandidateEvent;
use crate::error::SourceResult;
use crate::feed::parse_feed_payload;
use crate::fetch::Fetcher;
use crate::normalize::normalize_candidate;
use crate::raw_payload::RawPayload;
use crate::source::{SourceDescriptor, SourceKind};

/// Zone every feed time is expressed in. Date-only and floating times are
/// wall clock in it; UTC and IANA `TZID` times are converted into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedZone {
    /// The zone of the machine running the crawler.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl FromStr for FeedZone {
    type Err = String;

    /// Accepts `local`, `utc`, `Z`, `+HH:MM`, `-HH:MM` and `+HHMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(Self::Fixed(Utc.fix()));
        }

        let invalid = || {
            format!(
                "invalid feed timezone {:?}, expected \"local\" or an offset like \"+02:00\"",
                s
            )
        };
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for FeedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl Serialize for FeedZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Options shared by all source pipelines of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Structured API events starting strictly before this are dropped.
    pub cutoff: DateTime<Utc>,
    /// Zone for feed times without an explicit UTC marker.
    pub feed_zone: FeedZone,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            feed_zone: FeedZone::default(),
        }
    }
}

impl ParseOptions {
    /// Sets the historical cutoff.
    pub fn with_cutoff(mut self, cutoff: DateTime<Utc>) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Sets the feed zone.
    pub fn with_feed_zone(mut self, feed_zone: FeedZone) -> Self {
        self.feed_zone = feed_zone;
        self
    }
}

/// Parses a payload with the parser matching its source kind.
///
/// # Errors
///
/// Returns an invalid payload error if the payload as a whole is unusable.
pub fn parse_payload(
    payload: &RawPayload<'_>,
    options: &ParseOptions,
) -> SourceResult<Vec<CandidateEvent>> {
    match payload.source.kind {
        SourceKind::StructuredApi => parse_api_payload(payload, options.cutoff),
        SourceKind::CalendarFeed => match options.feed_zone {
            FeedZone::Local => parse_feed_payload(payload, &Local),
            FeedZone::Fixed(offset) => parse_feed_payload(payload, &offset),
        },
    }
}

/// Runs Fetch → Parse → Normalize for one source.
///
/// # Errors
///
/// Returns the fetch or whole-payload parse error, tagged with the source's
/// organizer label. Per-record problems are logged and skipped instead.
pub async fn run_pipeline(
    fetcher: &dyn Fetcher,
    source: &SourceDescriptor,
    options: &ParseOptions,
) -> SourceResult<Vec<CanonicalEvent>> {
    let payload = fetcher.fetch(source).await?;
    let candidates = parse_payload(&payload, options)?;
    Ok(candidates.into_iter().map(normalize_candidate).collect())
}
