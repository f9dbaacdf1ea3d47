//! Raw payload as retrieved from a source endpoint.

use crate::source::SourceDescriptor;

/// The body of one successful fetch.
///
/// Borrows the descriptor that produced it; the payload is consumed by the
/// matching parser and dropped right after.
#[derive(Debug, Clone)]
pub struct RawPayload<'a> {
    /// The source this payload came from.
    pub source: &'a SourceDescriptor,
    /// The response body as text.
    pub body: String,
}

impl<'a> RawPayload<'a> {
    /// Creates a payload for the given source.
    pub fn new(source: &'a SourceDescriptor, body: impl Into<String>) -> Self {
        Self {
            source,
            body: body.into(),
        }
    }

    /// Returns the organizer label of the producing source.
    pub fn organizer(&self) -> &str {
        &self.source.organizer
    }

    /// Returns true if the body is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}
