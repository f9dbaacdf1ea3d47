//! Time heuristics for aggregated events.
//!
//! This module provides the full-day detection used by every source and the
//! historical cutoff applied to the structured event API.

use chrono::{DateTime, FixedOffset, TimeZone, Timelike, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Returns the default historical cutoff, `2023-01-01T00:00:00Z`.
///
/// Events starting strictly before this instant are not published.
pub fn default_cutoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Returns true if `starts` falls strictly before `cutoff`.
///
/// An event starting exactly at the cutoff is kept.
pub fn is_before_cutoff<Tz: TimeZone>(starts: &DateTime<Tz>, cutoff: DateTime<Utc>) -> bool {
    starts.with_timezone(&Utc) < cutoff
}

/// Returns the span between two instants in fractional days.
///
/// Negative when `ends` precedes `starts`.
pub fn span_in_days(starts: &DateTime<FixedOffset>, ends: &DateTime<FixedOffset>) -> f64 {
    (*ends - *starts).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Decides whether an event is shown as a full-day event.
///
/// An event is full-day when both boundaries sit on midnight (start hour and
/// minute zero, end hour zero, each read in its own offset) or when it spans
/// more than one day. The minute of the end is not inspected. Without an end
/// the event is never full-day.
pub fn is_full_day(starts: &DateTime<FixedOffset>, ends: Option<&DateTime<FixedOffset>>) -> bool {
    let Some(ends) = ends else {
        return false;
    };

    let midnight_bounds = starts.hour() == 0 && starts.minute() == 0 && ends.hour() == 0;

    midnight_bounds || span_in_days(starts, ends) > 1.0
}
