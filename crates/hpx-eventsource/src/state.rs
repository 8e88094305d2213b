//! Session lifecycle states.

use std::fmt;

/// State of an [`EventSource`](crate::EventSource).
///
/// `Idle → Connecting → Open → (Reconnecting → Connecting → Open)* → Closed | Failed`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadyState {
    /// Created, driver not started yet.
    Idle,
    /// Request in flight.
    Connecting {
        /// Consecutive failed attempts before this one.
        attempt: u32,
    },
    /// Handshake accepted, events are flowing.
    Open,
    /// Waiting out the reconnection delay.
    Reconnecting {
        /// Consecutive failed attempts so far.
        attempt: u32,
    },
    /// Closed by the server or cancelled. Terminal.
    Closed,
    /// Gave up after an error. Terminal.
    Failed,
}

impl ReadyState {
    /// Returns `true` if a connection is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` for `Closed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting { attempt } => write!(f, "Connecting(attempt={attempt})"),
            Self::Open => write!(f, "Open"),
            Self::Reconnecting { attempt } => write!(f, "Reconnecting(attempt={attempt})"),
            Self::Closed => write!(f, "Closed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
