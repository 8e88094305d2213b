//! Public session handle.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

use crate::{
    config::EventSourceConfig,
    driver,
    error::{EventSourceError, EventSourceResult},
    handlers::{ChannelListener, EventSourceStream},
    listener::EventSourceListener,
    state::ReadyState,
    transport::Transport,
};

#[derive(Debug)]
struct SessionState {
    ready: ReadyState,
    last_event_id: Option<String>,
    retry: Option<Duration>,
    cancelled: bool,
}

/// State shared between the handle(s) and the driver task.
///
/// `state` is only ever locked for a read or a transition, never while a
/// listener callback runs. The driver checks for a terminal state under the
/// lock before each callback; `cancel` marks the session terminal under the
/// same lock, so no callback starts once it has returned.
#[derive(Debug)]
struct Shared {
    config: EventSourceConfig,
    state: Mutex<SessionState>,
    cancel: CancellationToken,
}

/// Handle to one SSE subscription.
///
/// Cheap to clone; every clone controls the same session. Dropping the
/// handles does not stop the session, call [`cancel`](Self::cancel).
#[derive(Clone, Debug)]
pub struct EventSource {
    shared: Arc<Shared>,
}

impl EventSource {
    /// Start a session over the default reqwest transport.
    ///
    /// Returns immediately; connecting happens on a spawned task. Must be
    /// called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or no runtime is
    /// available.
    #[cfg(feature = "reqwest")]
    pub fn connect<L: EventSourceListener>(
        config: EventSourceConfig,
        listener: L,
    ) -> EventSourceResult<Self> {
        let transport = default_transport(&config)?;
        Self::connect_with_transport(config, listener, transport)
    }

    /// Start a session over `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails or no runtime is
    /// available.
    pub fn connect_with_transport<L: EventSourceListener>(
        config: EventSourceConfig,
        listener: L,
        transport: Arc<dyn Transport>,
    ) -> EventSourceResult<Self> {
        config.validate().map_err(EventSourceError::config)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| EventSourceError::config(format!("No Tokio runtime: {e}")))?;

        let source = Self::new(config);
        runtime.spawn(driver::run(source.clone(), Arc::new(listener), transport));
        Ok(source)
    }

    /// Start a session whose callbacks are delivered as a [`Stream`](futures_core::Stream).
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect).
    #[cfg(feature = "reqwest")]
    pub fn stream(config: EventSourceConfig) -> EventSourceResult<(Self, EventSourceStream)> {
        let transport = default_transport(&config)?;
        Self::stream_with_transport(config, transport)
    }

    /// Like [`stream`](Self::stream) over a custom transport.
    ///
    /// # Errors
    ///
    /// Same as [`connect_with_transport`](Self::connect_with_transport).
    pub fn stream_with_transport(
        config: EventSourceConfig,
        transport: Arc<dyn Transport>,
    ) -> EventSourceResult<(Self, EventSourceStream)> {
        let (listener, stream) = ChannelListener::new();
        let source = Self::connect_with_transport(config, listener, transport)?;
        Ok((source, stream))
    }

    pub(crate) fn new(config: EventSourceConfig) -> Self {
        let state = SessionState {
            ready: ReadyState::Idle,
            last_event_id: config.last_event_id.clone(),
            retry: None,
            cancelled: false,
        };
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(state),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// The URL this session subscribes to.
    pub fn url(&self) -> &str {
        &self.shared.config.url
    }

    pub fn config(&self) -> &EventSourceConfig {
        &self.shared.config
    }

    pub fn state(&self) -> ReadyState {
        self.shared.state.lock().ready.clone()
    }

    /// Id of the last dispatched event that carried one; sent as
    /// `Last-Event-ID` on reconnection.
    pub fn last_event_id(&self) -> Option<String> {
        self.shared.state.lock().last_event_id.clone()
    }

    /// Reconnection delay most recently advised by the server.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.shared.state.lock().retry
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.state.lock().cancelled
    }

    /// Stop the session.
    ///
    /// Idempotent, non-blocking and callable from any thread, including from
    /// inside a listener callback. Interrupts any in-flight read or pending
    /// reconnection. No listener method starts once this returns; a callback
    /// already running on another thread is left to finish.
    pub fn cancel(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.ready.is_terminal() {
                return;
            }
            state.cancelled = true;
            state.ready = ReadyState::Closed;
        }
        self.shared.cancel.cancel();
        debug!(url = %self.url(), "SSE session cancelled");
    }

    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.shared.cancel.cancelled()
    }

    /// Run `f` unless the session is already terminal, first moving to
    /// `next` when given. The check and the transition happen under the
    /// lock; `f` runs after it is released.
    pub(crate) fn guarded<R>(&self, next: Option<ReadyState>, f: impl FnOnce() -> R) -> Option<R> {
        {
            let mut state = self.shared.state.lock();
            if state.ready.is_terminal() {
                return None;
            }
            if let Some(next) = next {
                state.ready = next;
            }
        }
        Some(f())
    }

    /// Move to `next` unless terminal. Returns whether the session is live.
    pub(crate) fn transition(&self, next: ReadyState) -> bool {
        self.guarded(Some(next), || ()).is_some()
    }

    pub(crate) fn record_event_id(&self, id: &str) {
        self.shared.state.lock().last_event_id = Some(id.to_owned());
    }

    pub(crate) fn record_retry(&self, delay: Duration) {
        self.shared.state.lock().retry = Some(delay);
    }
}

#[cfg(feature = "reqwest")]
fn default_transport(config: &EventSourceConfig) -> EventSourceResult<Arc<dyn Transport>> {
    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .build()?;
    Ok(Arc::new(crate::transport::ReqwestTransport::new(client)))
}
