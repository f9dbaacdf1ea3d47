//! Core types: canonical events, full-day heuristic, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{CanonicalEvent, EventDescription, EventName, UNTITLED};
pub use time::{default_cutoff, is_before_cutoff, is_full_day, span_in_days};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
