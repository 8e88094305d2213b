//! Per-session background task.
//!
//! One task per [`EventSource`] owns the connection, the watchdog and the
//! reconnection policy. It connects, validates the handshake, feeds the
//! body through the parser, delivers callbacks, and decides what happens
//! when the connection ends.

use std::{sync::Arc, time::Duration};

use futures_util::StreamExt;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{
    connector::{build_request, validate_handshake},
    error::EventSourceError,
    event_source::EventSource,
    listener::EventSourceListener,
    parse::{EventStream, EventStreamError, Parsed},
    reconnect::{Decision, ReconnectPolicy},
    state::ReadyState,
    transport::{ResponseHead, Transport, TransportResponse},
    watchdog::Watchdog,
};

/// How a single connection attempt ended.
enum Outcome {
    /// `cancel()` was called; stay silent.
    Cancelled,
    /// The server ended the body cleanly.
    Eof,
    Failed {
        error: EventSourceError,
        response: Option<ResponseHead>,
    },
}

pub(crate) async fn run(
    source: EventSource,
    listener: Arc<dyn EventSourceListener>,
    transport: Arc<dyn Transport>,
) {
    let config = source.config();
    let mut policy = ReconnectPolicy::new(config);
    let idle_timeout = listener.timeout().or(config.effective_idle_timeout());

    loop {
        if !source.transition(ReadyState::Connecting {
            attempt: policy.attempt(),
        }) {
            return;
        }
        info!(url = %config.url, attempt = policy.attempt(), "SSE connecting");

        let outcome = connect_once(
            &source,
            listener.as_ref(),
            transport.as_ref(),
            idle_timeout,
            &mut policy,
        )
        .await;

        let (err, response) = match outcome {
            Outcome::Cancelled => {
                debug!(url = %config.url, "SSE driver stopped after cancel");
                return;
            }
            Outcome::Eof => {
                info!(url = %config.url, "SSE stream closed by server");
                source.guarded(Some(ReadyState::Closed), || listener.on_closed(&source));
                return;
            }
            Outcome::Failed { error, response } => (error, response),
        };

        let retry = match policy.decide(&err, source.retry_delay()) {
            Decision::Retry(delay) => match source.guarded(None, || listener.should_retry(&err)) {
                None => return,
                Some(true) => Some(delay),
                Some(false) => {
                    warn!(error = %err, "Listener declined reconnection");
                    None
                }
            },
            Decision::Fail => None,
        };

        let Some(delay) = retry else {
            error!(url = %config.url, error = %err, "SSE session failed");
            source.guarded(Some(ReadyState::Failed), || {
                listener.on_failure(&source, Some(&err), response.as_ref())
            });
            return;
        };

        warn!(
            url = %config.url,
            error = %err,
            attempt = policy.attempt(),
            delay_ms = delay.as_millis() as u64,
            "SSE reconnecting after delay"
        );
        if !source.transition(ReadyState::Reconnecting {
            attempt: policy.attempt(),
        }) {
            return;
        }
        tokio::select! {
            biased;
            () = source.cancelled() => return,
            () = sleep(delay) => {}
        }
    }
}

/// Open one connection and stream it until it ends.
///
/// The response body is owned here and dropped on every return path, which
/// releases the connection before any terminal callback runs.
async fn connect_once(
    source: &EventSource,
    listener: &dyn EventSourceListener,
    transport: &dyn Transport,
    idle_timeout: Option<Duration>,
    policy: &mut ReconnectPolicy,
) -> Outcome {
    let config = source.config();
    let request = match build_request(config, source.last_event_id().as_deref()) {
        Ok(request) => request,
        Err(error) => return Outcome::Failed {
            error,
            response: None,
        },
    };

    let connected = tokio::select! {
        biased;
        () = source.cancelled() => return Outcome::Cancelled,
        res = timeout(config.connect_timeout, transport.execute(request)) => res,
    };
    let TransportResponse { head, body } = match connected {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => return Outcome::Failed {
            error,
            response: None,
        },
        Err(_) => return Outcome::Failed {
            error: EventSourceError::timeout(config.connect_timeout),
            response: None,
        },
    };

    if let Err(error) = validate_handshake(&head) {
        return Outcome::Failed {
            error,
            response: Some(head),
        };
    }

    if source
        .guarded(Some(ReadyState::Open), || listener.on_open(source, &head))
        .is_none()
    {
        return Outcome::Cancelled;
    }
    info!(url = %config.url, status = %head.status, "SSE connection established");
    policy.reset();

    let mut events = EventStream::new(body);
    let mut watchdog = Watchdog::new(idle_timeout);
    watchdog.arm();

    loop {
        tokio::select! {
            biased;

            () = source.cancelled() => return Outcome::Cancelled,

            () = watchdog.expired() => {
                let duration = watchdog.interval().unwrap_or_default();
                warn!(url = %config.url, timeout_ms = duration.as_millis() as u64, "SSE idle timeout");
                return Outcome::Failed {
                    error: EventSourceError::timeout(duration),
                    response: None,
                };
            }

            item = events.next() => match item {
                None => return Outcome::Eof,
                Some(Ok(Parsed::Retry(delay))) => {
                    debug!(retry_ms = delay.as_millis() as u64, "SSE retry advised");
                    source.record_retry(delay);
                }
                Some(Ok(Parsed::Event(event))) => {
                    debug!(
                        event_type = %event.event,
                        id = event.id().unwrap_or_default(),
                        "SSE event received",
                    );
                    let delivered = source.guarded(None, || {
                        if let Some(id) = event.id() {
                            source.record_event_id(id);
                        }
                        listener.on_event(
                            source,
                            event.id(),
                            Some(event.event_type()),
                            event.data(),
                        );
                    });
                    if delivered.is_none() {
                        return Outcome::Cancelled;
                    }
                    watchdog.arm();
                }
                Some(Err(EventStreamError::Utf8(e))) => {
                    return Outcome::Failed {
                        error: EventSourceError::from(e),
                        response: None,
                    };
                }
                Some(Err(EventStreamError::Transport(e))) => {
                    return Outcome::Failed {
                        error: EventSourceError::io_with_source("stream read failed", e),
                        response: None,
                    };
                }
            },
        }
    }
}
