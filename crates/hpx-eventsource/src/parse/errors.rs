//! Errors produced while decoding an event stream.

use core::str::Utf8Error;

use thiserror::Error;

/// Failure of an [`EventStream`](super::EventStream).
#[derive(Debug, Error, PartialEq)]
pub enum EventStreamError<E> {
    /// The underlying body stream failed.
    #[error("{0}")]
    Transport(E),
    /// The body is not valid UTF-8.
    #[error("invalid UTF-8 in event stream: {0}")]
    Utf8(#[from] Utf8Error),
}
