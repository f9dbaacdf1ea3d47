//! Candidate event records produced by the payload parsers.
//!
//! A [`CandidateEvent`] holds what a parser extracted from one upstream
//! record, before the shared derivation in [`crate::normalize`] turns it into
//! a [`CanonicalEvent`](eventfeed_core::CanonicalEvent).

use chrono::{DateTime, FixedOffset};

/// One parsed but not yet normalized event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEvent {
    /// Title in the primary language, as given upstream.
    pub title: Option<String>,
    /// Title in the secondary language.
    pub title_secondary: Option<String>,
    /// Description in the primary language.
    pub description: Option<String>,
    /// Description in the secondary language.
    pub description_secondary: Option<String>,
    /// When the event starts.
    pub starts: DateTime<FixedOffset>,
    /// When the event ends, if known.
    pub ends: Option<DateTime<FixedOffset>>,
    /// Organizer label of the source the record came from.
    pub organizer: String,
}

impl CandidateEvent {
    /// Creates a candidate with the minimum required fields.
    pub fn new(starts: DateTime<FixedOffset>, organizer: impl Into<String>) -> Self {
        Self {
            title: None,
            title_secondary: None,
            description: None,
            description_secondary: None,
            starts,
            ends: None,
            organizer: organizer.into(),
        }
    }

    /// Builder method to set the end.
    pub fn with_ends(mut self, ends: DateTime<FixedOffset>) -> Self {
        self.ends = Some(ends);
        self
    }

    /// Builder method to set the primary title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the secondary title.
    pub fn with_title_secondary(mut self, title: impl Into<String>) -> Self {
        self.title_secondary = Some(title.into());
        self
    }

    /// Builder method to set the primary description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the secondary description.
    pub fn with_description_secondary(mut self, description: impl Into<String>) -> Self {
        self.description_secondary = Some(description.into());
        self
    }
}
