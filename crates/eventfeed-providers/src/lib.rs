//! Event sources and the per-source pipeline.
//!
//! Each configured source runs the same pipeline:
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │  structured API  │   │  iCalendar feed  │
//! └────────┬─────────┘   └────────┬─────────┘
//!          │      Fetcher         │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │ RawPayload  │
//!              └──────┬──────┘
//!                     ▼ parse_api_payload() / parse_feed_payload()
//!              ┌────────────────┐
//!              │ CandidateEvent │
//!              └──────┬─────────┘
//!                     ▼ normalize_candidate()
//!              ┌────────────────┐
//!              │ CanonicalEvent │
//!              └────────────────┘
//! ```
//!
//! - [`SourceDescriptor`] - what to fetch and how to label it
//! - [`Fetcher`] / [`HttpFetcher`] - retrieval seam and its HTTP implementation
//! - [`run_pipeline`] - Fetch → Parse → Normalize for one source
//! - [`SourceError`] - failures that abort one source's contribution

pub mod api;
pub mod candidate;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod raw_payload;
pub mod source;

pub use candidate::CandidateEvent;
pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use fetch::{BoxFuture, FetchConfig, Fetcher, HttpFetcher, default_user_agent};
pub use normalize::normalize_candidate;
pub use pipeline::{FeedZone, ParseOptions, parse_payload, run_pipeline};
pub use raw_payload::RawPayload;
pub use source::{SourceDescriptor, SourceKind, default_sources};
