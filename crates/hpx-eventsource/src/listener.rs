//! Callback contract between a session and its consumer.

use std::time::Duration;

use crate::{error::EventSourceError, event_source::EventSource, transport::ResponseHead};

/// Receives the lifecycle of one [`EventSource`].
///
/// Every method has a no-op default; implement only what you need.
/// Callbacks run synchronously on the session's task, one at a time and in
/// wire order, so a slow callback delays the next read.
///
/// Per session: `on_open` once per established connection, then any number
/// of `on_event`, then at most one of `on_closed` / `on_failure`. After a
/// terminal callback, or once [`EventSource::cancel`] has returned, nothing
/// else is called.
pub trait EventSourceListener: Send + Sync + 'static {
    /// The server accepted the request and may begin transmitting events.
    ///
    /// Called again after each transparent reconnection.
    fn on_open(&self, _source: &EventSource, _response: &ResponseHead) {}

    /// An event was dispatched. `event_type` is `"message"` when the server
    /// did not name one.
    fn on_event(
        &self,
        _source: &EventSource,
        _id: Option<&str>,
        _event_type: Option<&str>,
        _data: &str,
    ) {
    }

    /// The server closed the stream normally.
    fn on_closed(&self, _source: &EventSource) {}

    /// The session failed and will not reconnect. Events may have been lost.
    ///
    /// `response` is present when the failure was caused by the handshake.
    fn on_failure(
        &self,
        _source: &EventSource,
        _error: Option<&EventSourceError>,
        _response: Option<&ResponseHead>,
    ) {
    }

    /// Maximum silence between two events. Overrides the configured idle
    /// timeout when `Some`.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Veto a reconnection the policy would otherwise perform.
    fn should_retry(&self, _error: &EventSourceError) -> bool {
        true
    }
}
