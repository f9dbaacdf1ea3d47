//! CandidateEvent to CanonicalEvent conversion.
//!
//! Both parsers converge here, so every source gets the same defaulting and
//! the same full-day derivation:
//! 1. A blank or missing title becomes the placeholder title
//! 2. An empty secondary description is dropped
//! 3. The full-day flag is derived from start and end

use eventfeed_core::{CanonicalEvent, EventDescription, EventName};

use crate::candidate::CandidateEvent;

/// Converts a [`CandidateEvent`] into a [`CanonicalEvent`].
pub fn normalize_candidate(candidate: CandidateEvent) -> CanonicalEvent {
    let CandidateEvent {
        title,
        title_secondary,
        description,
        description_secondary,
        starts,
        ends,
        organizer,
    } = candidate;

    let mut name = EventName::new(title.unwrap_or_default());
    if let Some(secondary) = title_secondary {
        name = name.with_secondary(secondary);
    }

    let description = EventDescription::new(
        description,
        description_secondary.filter(|d| !d.is_empty()),
    );

    let mut event = CanonicalEvent::new(name, starts, organizer).with_description(description);
    if let Some(ends) = ends {
        event = event.with_ends_at(ends);
    }
    event
}
