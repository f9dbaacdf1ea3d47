//! Event types for the aggregated calendar.
//!
//! This module provides the canonical event shape emitted by the crawler:
//! - [`CanonicalEvent`]: A source-agnostic event record
//! - [`EventName`]: The two-language title slots of an event
//! - [`EventDescription`]: The two-language description slots of an event
//!
//! The serialized form of [`CanonicalEvent`] is the contract consumed by the
//! rendering frontend, so field names and the omission of absent values are
//! part of the public interface.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::time::is_full_day;

/// Title used when an upstream event has no usable title.
pub const UNTITLED: &str = "(No title)";

/// The title of an event in the primary and secondary language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventName {
    /// Title in the primary language. Never empty.
    pub primary: String,
    /// Title in the secondary language, if the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl EventName {
    /// Creates a name with only the primary slot set.
    ///
    /// A blank title is replaced with [`UNTITLED`].
    pub fn new(primary: impl Into<String>) -> Self {
        let primary = primary.into();
        let primary = if primary.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            primary
        };
        Self {
            primary,
            secondary: None,
        }
    }

    /// Builder method to set the secondary title.
    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }
}

/// The description of an event in the primary and secondary language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDescription {
    /// Description in the primary language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Description in the secondary language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl EventDescription {
    /// Creates a description with both slots set as given.
    pub fn new(primary: Option<String>, secondary: Option<String>) -> Self {
        Self { primary, secondary }
    }

    /// Returns true if neither slot carries text.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}

/// A unified event record produced from any source.
///
/// Every event carries at least one organizer; events built from a single
/// source carry exactly one. `ends_at` may precede `starts_at` when the
/// upstream data is malformed; consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// The event title.
    pub name: EventName,
    /// The event description.
    pub description: EventDescription,
    /// When the event starts.
    pub starts_at: DateTime<FixedOffset>,
    /// When the event ends, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<FixedOffset>>,
    /// Whether the event is shown as spanning whole days.
    pub is_full_day: bool,
    /// Labels of the organizers this event is attributed to.
    pub organizers: Vec<String>,
}

impl CanonicalEvent {
    /// Creates a new event attributed to a single organizer.
    ///
    /// The full-day flag is derived from the start alone (always `false`)
    /// until an end is set with [`CanonicalEvent::with_ends_at`].
    pub fn new(
        name: EventName,
        starts_at: DateTime<FixedOffset>,
        organizer: impl Into<String>,
    ) -> Self {
        Self {
            name,
            description: EventDescription::default(),
            starts_at,
            ends_at: None,
            is_full_day: false,
            organizers: vec![organizer.into()],
        }
    }

    /// Builder method to set the end and re-derive the full-day flag.
    pub fn with_ends_at(mut self, ends_at: DateTime<FixedOffset>) -> Self {
        self.ends_at = Some(ends_at);
        self.is_full_day = is_full_day(&self.starts_at, self.ends_at.as_ref());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: EventDescription) -> Self {
        self.description = description;
        self
    }

    /// Builder method to attribute the event to an additional organizer.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizers.push(organizer.into());
        self
    }

    /// Returns the organizer this event was first attributed to.
    pub fn primary_organizer(&self) -> &str {
        // `new` always seeds one organizer and nothing removes it.
        self.organizers.first().map(String::as_str).unwrap_or_default()
    }

    /// Returns the event duration, if the end is known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ends_at.map(|end| end - self.starts_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn name_blank_falls_back() {
        assert_eq!(EventName::new("   ").primary, UNTITLED);
        assert_eq!(EventName::new("").primary, UNTITLED);
        assert_eq!(EventName::new("Sitsit").primary, "Sitsit");
    }

    #[test]
    fn new_event_has_single_organizer() {
        let event = CanonicalEvent::new(
            EventName::new("Sauna"),
            ts("2024-03-01T18:00:00+02:00"),
            "TiTe",
        );
        assert_eq!(event.organizers, vec!["TiTe".to_string()]);
        assert_eq!(event.primary_organizer(), "TiTe");
        assert!(event.ends_at.is_none());
        assert!(!event.is_full_day);
        assert!(event.duration().is_none());
    }

    #[test]
    fn ends_at_derives_full_day() {
        let event = CanonicalEvent::new(
            EventName::new("Vappu"),
            ts("2024-04-30T00:00:00+03:00"),
            "Skilta",
        )
        .with_ends_at(ts("2024-05-02T00:00:00+03:00"));
        assert!(event.is_full_day);
        assert_eq!(event.duration(), Some(chrono::Duration::days(2)));
    }

    #[test]
    fn with_organizer_appends() {
        let event = CanonicalEvent::new(
            EventName::new("Joint sitsit"),
            ts("2024-03-01T18:00:00Z"),
            "Indecs",
        )
        .with_organizer("Luuppi");
        assert_eq!(event.organizers, vec!["Indecs", "Luuppi"]);
        assert_eq!(event.primary_organizer(), "Indecs");
    }

    #[test]
    fn serialized_shape_matches_frontend_contract() {
        let event = CanonicalEvent::new(
            EventName::new("Excursion").with_secondary("Excursion EN"),
            ts("2024-03-01T09:00:00+02:00"),
            "TiTe",
        )
        .with_ends_at(ts("2024-03-01T17:00:00+02:00"))
        .with_description(EventDescription::new(Some("Bus leaves at 9".into()), None));

        insta::assert_json_snapshot!(event, @r#"
        {
          "name": {
            "primary": "Excursion",
            "secondary": "Excursion EN"
          },
          "description": {
            "primary": "Bus leaves at 9"
          },
          "startsAt": "2024-03-01T09:00:00+02:00",
          "endsAt": "2024-03-01T17:00:00+02:00",
          "isFullDay": false,
          "organizers": [
            "TiTe"
          ]
        }
        "#);
    }

    #[test]
    fn absent_fields_are_omitted() {
        let event = CanonicalEvent::new(
            EventName::new("Open house"),
            ts("2024-03-01T12:00:00Z"),
            "Urbanum",
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("endsAt").is_none());
        assert!(json["name"].get("secondary").is_none());
        assert_eq!(json["description"], serde_json::json!({}));
    }

    #[test]
    fn serde_roundtrip() {
        let event = CanonicalEvent::new(
            EventName::new("Gala"),
            ts("2024-11-15T18:00:00+02:00"),
            "MIK",
        )
        .with_ends_at(ts("2024-11-16T02:00:00+02:00"));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: CanonicalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
        assert_eq!(parsed.starts_at.offset().local_minus_utc(), 2 * 3600);
    }
}
