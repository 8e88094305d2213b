//! `text/event-stream` decoding.
//!
//! [`parser`] splits buffered bytes into lines and classifies them;
//! [`accumulator`] folds lines into events; [`EventStream`] drives both over
//! an async body of byte chunks.

pub(crate) mod accumulator;
pub(crate) mod constants;
pub(crate) mod errors;
pub mod event;
pub mod event_stream;
pub(crate) mod parser;

pub use errors::EventStreamError;
pub use event::{Event, Parsed};
pub use event_stream::EventStream;
