//! iCalendar feed source.
//!
//! This module parses iCalendar (RFC 5545) payloads into [`CandidateEvent`]s.
//! Only `VEVENT` components are consumed.
//!
//! Every time is expressed in the zone passed by the caller, so the full-day
//! heuristic reads all hours of a feed against one reference zone. UTC values
//! and values with a known IANA `TZID` keep their instant; date-only, floating
//! and unknown-`TZID` values are read as wall-clock time in that zone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use icalendar::{Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event};
use tracing::debug;

use crate::candidate::CandidateEvent;
use crate::error::{SourceError, SourceResult};
use crate::raw_payload::RawPayload;

/// Parses an iCalendar payload into candidate events.
///
/// Events without a parseable DTSTART, or without both DTEND and DURATION,
/// are skipped; they never fail the whole feed.
///
/// # Errors
///
/// Returns an invalid payload error if the body is not an iCalendar object.
pub fn parse_feed_payload<Tz: TimeZone>(
    payload: &RawPayload<'_>,
    tz: &Tz,
) -> SourceResult<Vec<CandidateEvent>> {
    let organizer = payload.organizer();
    let body = payload.body.trim_start_matches('\u{feff}').trim_start();

    if !body
        .get(..15)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(
            SourceError::invalid_payload("response is not an iCalendar object")
                .with_organizer(organizer),
        );
    }

    let calendar = body.parse::<Calendar>().map_err(|e| {
        SourceError::invalid_payload(format!("failed to parse iCalendar: {}", e))
            .with_organizer(organizer)
    })?;

    let mut skipped = 0usize;
    let candidates: Vec<CandidateEvent> = calendar
        .components
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => {
                let candidate = parse_event(event, organizer, tz);
                if candidate.is_none() {
                    skipped += 1;
                }
                candidate
            }
            _ => None,
        })
        .collect();

    debug!(
        organizer,
        events = candidates.len(),
        skipped,
        "parsed calendar feed"
    );

    Ok(candidates)
}

/// Parses a single VEVENT component.
fn parse_event<Tz: TimeZone>(event: &Event, organizer: &str, tz: &Tz) -> Option<CandidateEvent> {
    let uid = event.get_uid().unwrap_or("(no uid)");

    let Some(starts) = event.get_start().and_then(|dt| resolve(dt, tz)) else {
        debug!(organizer, uid, "skipping event without a usable DTSTART");
        return None;
    };
    let ends = match event.get_end() {
        Some(dt) => resolve(dt, tz),
        None => event
            .property_value("DURATION")
            .and_then(parse_duration)
            .and_then(|duration| starts.checked_add_signed(duration)),
    };
    let Some(ends) = ends else {
        debug!(organizer, uid, "skipping event without a usable DTEND or DURATION");
        return None;
    };

    let mut candidate = CandidateEvent::new(starts, organizer).with_ends(ends);
    if let Some(summary) = event.get_summary() {
        candidate = candidate.with_title(summary);
    }
    if let Some(description) = event.get_description() {
        candidate = candidate.with_description(description);
    }
    Some(candidate)
}

/// Converts an iCalendar date or datetime to a timestamp in `tz`.
fn resolve<Tz: TimeZone>(value: DatePerhapsTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    match value {
        DatePerhapsTime::Date(date) => wall_clock(date.and_hms_opt(0, 0, 0)?, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => wall_clock(naive, tz),
        DatePerhapsTime::DateTime(dt) => match dt.try_into_utc() {
            Some(instant) => Some(in_zone(instant, tz)),
            None => match dt {
                CalendarDateTime::WithTimezone { date_time, tzid } if is_utc_tzid(&tzid) => {
                    Some(in_zone(date_time.and_utc(), tz))
                }
                CalendarDateTime::WithTimezone { date_time, tzid } => {
                    debug!(tzid = %tzid, "unknown TZID, reading as wall-clock time");
                    wall_clock(date_time, tz)
                }
                _ => None,
            },
        },
    }
}

fn in_zone<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> DateTime<FixedOffset> {
    instant.with_timezone(tz).fixed_offset()
}

/// Places a wall-clock time in `tz`. Times inside a DST gap do not exist.
fn wall_clock<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

fn is_utc_tzid(tzid: &str) -> bool {
    matches!(
        tzid.to_ascii_uppercase().as_str(),
        "UTC" | "Z" | "GMT" | "ETC/UTC" | "ETC/GMT"
    )
}

/// Parses an RFC 5545 duration such as `PT2H`, `P1D`, `P1DT30M` or `-P2W`.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix(['P', 'p'])?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut digits = String::new();
    let mut units = 0usize;

    for c in rest.chars() {
        match c.to_ascii_uppercase() {
            '0'..='9' => digits.push(c),
            'T' if !in_time && digits.is_empty() => in_time = true,
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let part = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n)?,
                    ('D', false) => Duration::try_days(n)?,
                    ('H', true) => Duration::try_hours(n)?,
                    ('M', true) => Duration::try_minutes(n)?,
                    ('S', true) => Duration::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
                units += 1;
            }
        }
    }

    if !digits.is_empty() || units == 0 {
        return None;
    }
    Some(if negative { -total } else { total })
}
