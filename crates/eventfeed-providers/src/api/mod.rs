//! Structured event API source.
//!
//! The API serves a JSON array of records. Each record is validated with
//! [`validate_record`]; invalid and historical records are skipped, the rest
//! become [`CandidateEvent`]s attributed to the source's organizer.

mod schema;

pub use schema::{ApiRecord, ValidationError, ValidationIssue, parse_offset_timestamp, validate_record};

#[cfg(test)]
pub(crate) use schema::tests::valid_record;

use chrono::{DateTime, Utc};
use eventfeed_core::is_before_cutoff;
use serde_json::Value;
use tracing::{debug, warn};

use crate::candidate::CandidateEvent;
use crate::error::{SourceError, SourceResult};
use crate::raw_payload::RawPayload;

/// Parses a structured API payload into candidate events.
///
/// Records failing validation and records starting strictly before `cutoff`
/// are skipped; neither fails the payload.
///
/// # Errors
///
/// Returns an invalid payload error if the body is not JSON or not an array.
pub fn parse_api_payload(
    payload: &RawPayload<'_>,
    cutoff: DateTime<Utc>,
) -> SourceResult<Vec<CandidateEvent>> {
    let organizer = payload.organizer();
    let value: Value = serde_json::from_str(&payload.body).map_err(|e| {
        SourceError::invalid_payload(format!("response is not JSON: {}", e))
            .with_organizer(organizer)
            .with_source(e)
    })?;

    let Value::Array(records) = value else {
        return Err(
            SourceError::invalid_payload("expected a JSON array of events").with_organizer(organizer),
        );
    };

    let mut invalid = 0usize;
    let mut historical = 0usize;
    let mut candidates = Vec::with_capacity(records.len());

    for (index, raw) in records.iter().enumerate() {
        let record = match validate_record(raw) {
            Ok(record) => record,
            Err(e) => {
                invalid += 1;
                warn!(organizer, index, error = %e, "skipping invalid event record");
                debug!(organizer, index, record = %raw, "invalid event record");
                continue;
            }
        };

        if is_before_cutoff(&record.starts, cutoff) {
            historical += 1;
            continue;
        }

        candidates.push(to_candidate(record, organizer));
    }

    debug!(
        organizer,
        total = records.len(),
        accepted = candidates.len(),
        invalid,
        historical,
        "parsed structured API payload"
    );

    Ok(candidates)
}

fn to_candidate(record: ApiRecord, organizer: &str) -> CandidateEvent {
    let mut candidate = CandidateEvent::new(record.starts, organizer)
        .with_ends(record.ends)
        .with_title(record.name_fi)
        .with_title_secondary(record.name_en)
        .with_description(record.description_fi);
    if let Some(description_en) = record.description_en {
        candidate = candidate.with_description_secondary(description_en);
    }
    candidate
}
