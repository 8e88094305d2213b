//! Completed events handed from the accumulator to the session.

use core::time::Duration;

use bytes_utils::Str;

/// An immutable, fully accumulated event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Value of the `id:` field seen in this event, if any.
    pub id: Option<Str>,
    /// Event type; `"message"` when no `event:` field was seen.
    pub event: Str,
    /// `data:` lines joined with `\n`.
    pub data: Str,
}

impl Event {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn event_type(&self) -> &str {
        &self.event
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

/// Output of an [`EventStream`](super::EventStream).
///
/// Retry hints are surfaced as soon as their line is read, independently of
/// whether the surrounding event is ever dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// A dispatch boundary closed an event.
    Event(Event),
    /// The server advised a new reconnection delay.
    Retry(Duration),
}
