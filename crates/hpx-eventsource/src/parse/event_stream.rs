//! [`Stream`] adapter from body chunks to [`Parsed`] items.

use core::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes::{Buf, BufMut, BytesMut};
use futures_core::Stream;

use super::{
    accumulator::Accumulator,
    constants::{BOM, CR, LF},
    errors::EventStreamError,
    event::Parsed,
    parser::next_frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for enough bytes to rule a BOM in or out.
    Start,
    Streaming,
    Finished,
}

/// `Some(true)` if `buf` starts with a BOM, `None` if it is too short to tell.
fn bom_prefix(buf: &[u8]) -> Option<bool> {
    let n = buf.len().min(BOM.len());
    if buf[..n] != BOM[..n] {
        return Some(false);
    }
    (n == BOM.len()).then_some(true)
}

pin_project_lite::pin_project! {
    /// Parses a stream of byte chunks into events and retry hints.
    ///
    /// Output is independent of how the input is chunked. An event still being
    /// accumulated when the input ends is discarded.
    #[project = EventStreamProj]
    #[derive(Debug)]
    pub struct EventStream<S> {
        #[pin]
        body: S,
        buffer: BytesMut,
        pending: Accumulator,
        phase: Phase,
    }
}

impl<S> EventStream<S> {
    pub fn new(body: S) -> Self {
        Self {
            body,
            buffer: BytesMut::new(),
            pending: Accumulator::default(),
            phase: Phase::Start,
        }
    }
}

fn drain<E>(
    buffer: &mut BytesMut,
    pending: &mut Accumulator,
) -> Option<Result<Parsed, EventStreamError<E>>> {
    while let Some(frame) = next_frame(buffer) {
        match frame {
            Ok(frame) => {
                if let Some(parsed) = pending.push(frame) {
                    return Some(Ok(parsed));
                }
            }
            Err(e) => return Some(Err(e.into())),
        }
    }
    None
}

impl<S, E, B> Stream for EventStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<Parsed, EventStreamError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.phase != Phase::Start
            && let Some(item) = drain(this.buffer, this.pending)
        {
            return Poll::Ready(Some(item));
        }
        if *this.phase == Phase::Finished {
            return Poll::Ready(None);
        }

        loop {
            let chunk = match ready!(this.body.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    *this.phase = Phase::Finished;
                    return Poll::Ready(Some(Err(EventStreamError::Transport(e))));
                }
                None => {
                    *this.phase = Phase::Finished;
                    // A held-back CR is a line end once no LF can follow.
                    if this.buffer.last() == Some(&CR) {
                        this.buffer.put_u8(LF);
                    }
                    return Poll::Ready(drain(this.buffer, this.pending));
                }
            };

            let chunk = chunk.as_ref();
            if chunk.is_empty() {
                continue;
            }
            this.buffer.extend_from_slice(chunk);

            if *this.phase == Phase::Start {
                match bom_prefix(this.buffer) {
                    Some(true) => this.buffer.advance(BOM.len()),
                    Some(false) => {}
                    None => continue,
                }
                *this.phase = Phase::Streaming;
            }

            if let Some(item) = drain(this.buffer, this.pending) {
                return Poll::Ready(Some(item));
            }
        }
    }
}
