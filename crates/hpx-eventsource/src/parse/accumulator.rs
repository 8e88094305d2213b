//! Per-connection scratch buffer that folds field lines into [`Event`]s.

use core::{mem, time::Duration};

use bytes::BytesMut;
use bytes_utils::{Str, StrMut};

use super::{
    constants::{EMPTY_STR, MESSAGE_STR},
    event::{Event, Parsed},
    parser::{FieldName, Frame},
};

/// `data:` buffer. The first line is kept as-is; a mutable buffer is only
/// allocated once a second line arrives.
#[derive(Debug, Default)]
enum DataBuffer {
    #[default]
    Empty,
    Single(Str),
    Multi(StrMut),
}

impl DataBuffer {
    fn push_line(&mut self, line: Str) {
        match self {
            Self::Empty => *self = Self::Single(line),
            Self::Single(first) => {
                let inner = BytesMut::with_capacity(first.len() + line.len() + 1);
                // Safety: an empty buffer is trivially valid UTF-8.
                let mut buf = unsafe { StrMut::from_inner_unchecked(inner) };
                buf.push_str(first);
                buf.push('\n');
                buf.push_str(&line);
                *self = Self::Multi(buf);
            }
            Self::Multi(buf) => {
                buf.push('\n');
                buf.push_str(&line);
            }
        }
    }

    fn freeze(self) -> Str {
        match self {
            Self::Empty => EMPTY_STR,
            Self::Single(s) => s,
            Self::Multi(s) => s.freeze(),
        }
    }
}

/// Fields of the event being read. Owned by one
/// [`EventStream`](super::EventStream) and reset on every dispatch.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    id: Option<Str>,
    event: Option<Str>,
    data: DataBuffer,
    /// Whether `id`, `event` or `data` was set since the last dispatch.
    touched: bool,
}

impl Accumulator {
    /// Feeds one decoded line, returning whatever it produced.
    pub(crate) fn push(&mut self, frame: Frame) -> Option<Parsed> {
        let (name, value) = match frame {
            Frame::Boundary => return self.dispatch().map(Parsed::Event),
            Frame::Comment => return None,
            Frame::Field { name, value } => (name, value),
        };

        match name {
            FieldName::Event => {
                self.event = Some(value);
                self.touched = true;
            }
            FieldName::Data => {
                self.data.push_line(value);
                self.touched = true;
            }
            FieldName::Id => {
                // Ids containing NUL are malformed and ignored.
                if memchr::memchr(0, value.as_bytes()).is_none() {
                    self.id = Some(value);
                    self.touched = true;
                }
            }
            FieldName::Retry => return parse_retry(&value).map(Parsed::Retry),
            FieldName::Unknown => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<Event> {
        let Self {
            id,
            event,
            data,
            touched,
        } = mem::take(self);

        if !touched {
            return None;
        }

        Some(Event {
            id,
            event: event.filter(|e| !e.is_empty()).unwrap_or(MESSAGE_STR),
            data: data.freeze(),
        })
    }
}

fn parse_retry(value: &str) -> Option<Duration> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().map(Duration::from_millis)
}
