//! Source descriptors and the built-in source registry.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{SourceError, SourceResult};

/// The kind of payload a source serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A JSON array of event records.
    StructuredApi,
    /// An iCalendar feed.
    CalendarFeed,
}

impl SourceKind {
    /// Returns a machine-readable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredApi => "structured_api",
            Self::CalendarFeed => "calendar_feed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured origin of event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// What the endpoint serves.
    pub kind: SourceKind,
    /// Where to fetch from.
    #[serde(rename = "url")]
    pub endpoint: Url,
    /// Human-readable source name used for attribution.
    pub organizer: String,
}

impl SourceDescriptor {
    /// Creates a descriptor, validating the endpoint and organizer label.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse, is not
    /// http(s), or the organizer label is blank.
    pub fn new(
        kind: SourceKind,
        endpoint: impl AsRef<str>,
        organizer: impl Into<String>,
    ) -> SourceResult<Self> {
        let organizer = organizer.into();
        let endpoint = Url::parse(endpoint.as_ref()).map_err(|e| {
            SourceError::configuration(format!("invalid URL {:?}: {}", endpoint.as_ref(), e))
                .with_organizer(organizer.clone())
                .with_source(e)
        })?;
        let descriptor = Self {
            kind,
            endpoint,
            organizer,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Creates a structured API descriptor.
    pub fn structured_api(
        endpoint: impl AsRef<str>,
        organizer: impl Into<String>,
    ) -> SourceResult<Self> {
        Self::new(SourceKind::StructuredApi, endpoint, organizer)
    }

    /// Creates a calendar feed descriptor.
    pub fn calendar_feed(
        endpoint: impl AsRef<str>,
        organizer: impl Into<String>,
    ) -> SourceResult<Self> {
        Self::new(SourceKind::CalendarFeed, endpoint, organizer)
    }

    /// Checks the invariants that deserialization cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a blank organizer or a non-http(s)
    /// endpoint.
    pub fn validate(&self) -> SourceResult<()> {
        if self.organizer.trim().is_empty() {
            return Err(SourceError::configuration(format!(
                "source {} has an empty organizer label",
                self.endpoint
            )));
        }
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(SourceError::configuration(format!(
                "unsupported URL scheme {:?}",
                self.endpoint.scheme()
            ))
            .with_organizer(&self.organizer));
        }
        Ok(())
    }
}

/// Organizer label of the built-in structured API source.
pub const STRUCTURED_API_ORGANIZER: &str = "TiTe";

const STRUCTURED_API_URL: &str = "https://tietoteekkarikilta.fi/api/events";

const CALENDAR_FEEDS: &[(&str, &str)] = &[
    (
        "Skilta",
        "https://calendar.google.com/calendar/ical/tqt8i5n94ih0dagg5birn7d7vk%40group.calendar.google.com/public/basic.ics",
    ),
    (
        "Indecs",
        "https://calendar.google.com/calendar/ical/sq52m06otthqjr8m5ah24l8590%40group.calendar.google.com/public/basic.ics",
    ),
    (
        "Hiukkanen",
        "https://calendar.google.com/calendar/ical/hallitus.hiukkanen%40gmail.com/public/basic.ics",
    ),
    (
        "TaSciEn",
        "https://calendar.google.com/calendar/ical/tascien.tut@gmail.com/public/basic.ics",
    ),
    (
        "TARAKI",
        "https://calendar.google.com/calendar/ical/tampereenrakentajakilta@gmail.com/public/basic.ics",
    ),
    ("Urbanum", "https://www.urbanum.fi/events/list/?ical=1"),
    (
        "MIK",
        "https://calendar.google.com/calendar/ical/fb77e429c7dca0b5f6a33d73ec0711ea5cb96c291ada5a566c4d951558296568@group.calendar.google.com/public/basic.ics",
    ),
    // Published on their website but currently empty.
    (
        "Bioner",
        "https://calendar.google.com/calendar/ical/bq9p6lc2rm4jfjcq43698hchuc%40group.calendar.google.com/public/basic.ics",
    ),
    ("Luuppi", "https://luuppi.fi/service/ics/events.ics?lang=fin"),
    (
        "Reettorit",
        "https://calendar.google.com/calendar/ical/reettorihallitus@gmail.com/public/basic.ics",
    ),
    (
        "Lexica",
        "https://calendar.google.com/calendar/ical/27fu9laon5s5gc9fm4hsbmebk0@group.calendar.google.com/public/basic.ics",
    ),
    (
        "Kopula",
        "https://calendar.google.com/calendar/ical/80hvffjn4olkra53lb753uhi68@group.calendar.google.com/public/basic.ics",
    ),
    (
        "Interaktio",
        "https://calendar.google.com/calendar/ical/interaktiory@gmail.com/public/basic.ics",
    ),
    (
        "Iltakoulu",
        "https://calendar.google.com/calendar/ical/f0a62f9d93ae158e59fef3d8b52ecbfff0344a760e4ab64281525132982552c2@group.calendar.google.com/public/basic.ics",
    ),
    (
        "Teema",
        "https://calendar.google.com/calendar/ical/ainejarjestoteema@gmail.com/public/basic.ics",
    ),
    (
        "Vostok",
        "https://calendar.google.com/calendar/ical/m9u22l5uvc2cv3d9c0tna585vo%40group.calendar.google.com/public/basic.ics",
    ),
    (
        "UDK",
        "https://calendar.google.com/calendar/ical/c_cp5e64tgbc4i32bp77k9titmu8%40group.calendar.google.com/public/basic.ics",
    ),
    (
        "Cortex",
        "https://calendar.google.com/calendar/ical/cortexry@gmail.com/public/basic.ics",
    ),
    (
        "Tipsy",
        "https://calendar.google.com/calendar/ical/tipsyboard@gmail.com/public/basic.ics",
    ),
    // Last event on this calendar is from the end of 2021.
    (
        "Complex",
        "https://calendar.google.com/calendar/ical/complex.tuni@gmail.com/public/basic.ics",
    ),
    (
        "Pointer",
        "https://calendar.google.com/calendar/ical/jd679pacp90m6un5j10kiflo00@group.calendar.google.com/public/basic.ics",
    ),
];

/// Returns the built-in source registry.
///
/// The structured API comes first, followed by the calendar feeds. Entries
/// whose URL fails to parse are skipped with a warning, which only happens
/// if the table above is edited incorrectly.
pub fn default_sources() -> Vec<SourceDescriptor> {
    let api = std::iter::once((SourceKind::StructuredApi, STRUCTURED_API_ORGANIZER, STRUCTURED_API_URL));
    let feeds = CALENDAR_FEEDS
        .iter()
        .map(|(organizer, url)| (SourceKind::CalendarFeed, *organizer, *url));

    api.chain(feeds)
        .filter_map(|(kind, organizer, url)| match SourceDescriptor::new(kind, url, organizer) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::warn!(error = %e, "skipping built-in source");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceErrorCode;

    #[test]
    fn default_registry_is_complete() {
        let sources = default_sources();
        assert_eq!(sources.len(), 1 + CALENDAR_FEEDS.len());
        assert_eq!(sources[0].kind, SourceKind::StructuredApi);
        assert_eq!(sources[0].organizer, STRUCTURED_API_ORGANIZER);
        assert!(
            sources[1..]
                .iter()
                .all(|s| s.kind == SourceKind::CalendarFeed)
        );
    }

    #[test]
    fn default_registry_organizers_are_unique() {
        let sources = default_sources();
        let mut labels: Vec<_> = sources.iter().map(|s| s.organizer.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), sources.len());
    }

    #[test]
    fn descriptor_rejects_bad_url() {
        let err = SourceDescriptor::calendar_feed("not a url", "Skilta").unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::ConfigurationError);
        assert_eq!(err.organizer(), Some("Skilta"));
    }

    #[test]
    fn descriptor_rejects_blank_organizer() {
        let err = SourceDescriptor::calendar_feed("https://example.com/cal.ics", "  ").unwrap_err();
        assert_eq!(err.code(), SourceErrorCode::ConfigurationError);
    }

    #[test]
    fn descriptor_rejects_non_http_scheme() {
        let err = SourceDescriptor::calendar_feed("file:///etc/passwd", "Local").unwrap_err();
        assert!(err.message().contains("scheme"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&SourceKind::CalendarFeed).unwrap();
        assert_eq!(json, "\"calendar_feed\"");
        assert_eq!(SourceKind::StructuredApi.to_string(), "structured_api");
    }

    #[test]
    fn descriptor_deserializes_from_url_field() {
        let json = r#"{"kind":"calendar_feed","url":"https://luuppi.fi/service/ics/events.ics?lang=fin","organizer":"Luuppi"}"#;
        let descriptor: SourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.organizer, "Luuppi");
        assert_eq!(descriptor.endpoint.host_str(), Some("luuppi.fi"));
        assert!(descriptor.validate().is_ok());
    }
}
