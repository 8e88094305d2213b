//! # hpx-eventsource
//!
//! Server-Sent Events client engine.
//!
//! An [`EventSource`] opens a long-lived streaming HTTP request, decodes the
//! `text/event-stream` body incrementally and reports what happens to an
//! [`EventSourceListener`]:
//!
//! - **Ordered delivery**: `on_open`, `on_event`s, then at most one of
//!   `on_closed` / `on_failure`, all from the session's own task.
//! - **Resumption**: the id of the last dispatched event is sent back as
//!   `Last-Event-ID` when reconnecting.
//! - **Reconnection**: network failures and idle timeouts are retried after
//!   the server-advised `retry:` delay (or a configured baseline).
//! - **Cancellation**: [`EventSource::cancel`] is thread-safe, interrupts
//!   reads and pending reconnects, and silences the listener.
//!
//! # Architecture
//!
//! ```text
//! EventSource::connect(config, listener)
//!   └─ spawns driver task
//!        ├── Transport::execute ──► validate handshake ──► on_open
//!        ├── EventStream (parser + accumulator) ──► on_event
//!        ├── Watchdog (idle timeout)
//!        └── ReconnectPolicy ──► sleep(retry) ──► reconnect | on_closed | on_failure
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use hpx_eventsource::{EventSource, EventSourceConfig, EventSourceListener};
//!
//! struct Printer;
//!
//! impl EventSourceListener for Printer {
//!     fn on_event(&self, _: &EventSource, id: Option<&str>, ty: Option<&str>, data: &str) {
//!         println!("{id:?} {ty:?} {data}");
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EventSourceConfig::new("https://example.com/events")
//!     .idle_timeout(Some(Duration::from_secs(30)));
//! let source = EventSource::connect(config, Printer)?;
//! // ...
//! source.cancel();
//! # Ok(())
//! # }
//! ```

mod config;
mod connector;
mod driver;
pub mod error;
mod event_source;
pub mod handlers;
mod listener;
pub mod parse;
mod reconnect;
mod state;
pub mod transport;
mod watchdog;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::EventSourceConfig;
pub use error::{ErrorKind, EventSourceError, EventSourceResult};
pub use event_source::EventSource;
pub use handlers::{ChannelListener, EventSourceMessage, EventSourceStream};
pub use listener::EventSourceListener;
pub use parse::{Event, EventStream, EventStreamError, Parsed};
pub use state::ReadyState;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{ResponseHead, Transport, TransportResponse};
