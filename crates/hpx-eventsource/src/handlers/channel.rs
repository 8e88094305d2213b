//! Listener that turns callbacks into a [`Stream`] of messages.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures_core::Stream;
use tokio::sync::mpsc;

use crate::{
    error::EventSourceError, event_source::EventSource, listener::EventSourceListener,
    transport::ResponseHead,
};

/// Owned copy of a dispatched event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub id: Option<String>,
    pub event_type: String,
    pub data: String,
}

/// One listener callback, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventSourceMessage {
    /// A connection was established.
    Open { status: http::StatusCode },
    Event(MessageEvent),
    /// The server closed the stream. Last message.
    Closed,
    /// The session failed. Last message.
    Failed {
        error: Option<String>,
        status: Option<http::StatusCode>,
    },
}

impl EventSourceMessage {
    /// Returns `true` for `Closed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed { .. })
    }
}

/// Forwards every callback into an unbounded channel.
///
/// The channel is unbounded because callbacks are synchronous and must not
/// block the session task; ordering is preserved.
#[derive(Clone, Debug)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<EventSourceMessage>,
}

impl ChannelListener {
    /// Create a listener and the stream it feeds.
    pub fn new() -> (Self, EventSourceStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, EventSourceStream { rx })
    }

    fn forward(&self, message: EventSourceMessage) {
        // The consumer may have dropped the stream; the session keeps running
        // until cancelled.
        let _ = self.tx.send(message);
    }
}

impl EventSourceListener for ChannelListener {
    fn on_open(&self, _source: &EventSource, response: &ResponseHead) {
        self.forward(EventSourceMessage::Open {
            status: response.status,
        });
    }

    fn on_event(
        &self,
        _source: &EventSource,
        id: Option<&str>,
        event_type: Option<&str>,
        data: &str,
    ) {
        self.forward(EventSourceMessage::Event(MessageEvent {
            id: id.map(str::to_owned),
            event_type: event_type.unwrap_or("message").to_owned(),
            data: data.to_owned(),
        }));
    }

    fn on_closed(&self, _source: &EventSource) {
        self.forward(EventSourceMessage::Closed);
    }

    fn on_failure(
        &self,
        _source: &EventSource,
        error: Option<&EventSourceError>,
        response: Option<&ResponseHead>,
    ) {
        self.forward(EventSourceMessage::Failed {
            error: error.map(ToString::to_string),
            status: response.map(|r| r.status),
        });
    }
}

/// Messages from a [`ChannelListener`]. Ends once the session is over.
#[derive(Debug)]
pub struct EventSourceStream {
    rx: mpsc::UnboundedReceiver<EventSourceMessage>,
}

impl EventSourceStream {
    /// Receive the next message; `None` once the session task has exited.
    pub async fn next_message(&mut self) -> Option<EventSourceMessage> {
        self.rx.recv().await
    }
}

impl Stream for EventSourceStream {
    type Item = EventSourceMessage;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
