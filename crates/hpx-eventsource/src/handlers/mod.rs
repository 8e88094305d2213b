//! Ready-to-use listeners.
//!
//! - [`ChannelListener`]: forwards callbacks to an [`EventSourceStream`]

mod channel;

pub use channel::{ChannelListener, EventSourceMessage, EventSourceStream, MessageEvent};
