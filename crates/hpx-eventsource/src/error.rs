//! Error taxonomy of the event source engine.

use std::{error::Error as StdError, time::Duration};

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::transport::Transport) body.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The main result type of this crate.
pub type EventSourceResult<T> = Result<T, EventSourceError>;

/// Coarse classification used by the reconnection logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with something other than an event stream.
    Handshake,
    /// The body could not be decoded.
    Protocol,
    /// Network failure before or during streaming.
    Io,
    /// Connect or idle timeout.
    Timeout,
    /// Invalid configuration.
    Config,
}

/// Errors surfaced by an [`EventSource`](crate::EventSource).
#[derive(Error, Debug)]
pub enum EventSourceError {
    /// Non-successful response status.
    #[error("Invalid response status: {status}")]
    InvalidStatus { status: http::StatusCode },

    /// Missing or non `text/event-stream` content type.
    #[error("Invalid content type: {}", content_type.as_deref().unwrap_or("<missing>"))]
    InvalidContentType { content_type: Option<String> },

    /// `charset` parameter other than UTF-8.
    #[error("Unsupported charset: {charset}")]
    UnsupportedCharset { charset: String },

    /// Malformed byte sequence in the body.
    #[error("Protocol error: {0}")]
    Protocol(#[from] std::str::Utf8Error),

    /// HTTP client failure.
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Network failure reported by a transport.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Nothing arrived within the allotted time.
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration errors.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl EventSourceError {
    /// Create an I/O error without an underlying cause.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error wrapping `source`.
    pub fn io_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStatus { .. }
            | Self::InvalidContentType { .. }
            | Self::UnsupportedCharset { .. } => ErrorKind::Handshake,
            Self::Protocol(_) => ErrorKind::Protocol,
            #[cfg(feature = "reqwest")]
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            #[cfg(feature = "reqwest")]
            Self::Http(_) => ErrorKind::Io,
            Self::Io { .. } => ErrorKind::Io,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Whether the reconnection loop may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io | ErrorKind::Timeout)
    }
}
