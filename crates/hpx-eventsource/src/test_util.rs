//! In-memory transport for driving sessions in unit tests.

use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;
use parking_lot::Mutex;
use tokio::{sync::mpsc, time::Instant};

use crate::{
    error::{BoxError, EventSourceError, EventSourceResult},
    transport::{BodyStream, ResponseHead, Transport, TransportResponse},
};

/// Body that ends after the given chunks.
pub(crate) fn body(chunks: &[&'static str]) -> BodyStream {
    let items: Vec<Result<Bytes, BoxError>> = chunks
        .iter()
        .map(|c| Ok(Bytes::from_static(c.as_bytes())))
        .collect();
    Box::pin(stream::iter(items))
}

/// Body that yields the given chunks and then stalls forever.
pub(crate) fn stalled_body(chunks: &[&'static str]) -> BodyStream {
    use futures_util::StreamExt;
    Box::pin(body(chunks).chain(stream::pending()))
}

/// Body that yields the given chunks and then fails.
pub(crate) fn failing_body(chunks: &[&'static str], message: &'static str) -> BodyStream {
    use futures_util::StreamExt;
    let failure = stream::once(async move { Err::<Bytes, BoxError>(message.into()) });
    Box::pin(body(chunks).chain(failure))
}

/// Body fed by the returned sender; ends when the sender is dropped.
pub(crate) fn channel_body() -> (mpsc::UnboundedSender<Result<Bytes, BoxError>>, BodyStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    let body = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    });
    (tx, Box::pin(body))
}

enum Step {
    Refuse(&'static str),
    Stall,
    Respond { head: ResponseHead, body: BodyStream },
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) at: Instant,
    pub(crate) headers: http::HeaderMap,
}

/// Plays back scripted responses in order, one per request.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<RecordedRequest>>,
    released: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a `200 text/event-stream` response.
    pub(crate) fn respond(&self, body: BodyStream) -> &Self {
        self.respond_with(200, Some("text/event-stream"), body)
    }

    pub(crate) fn respond_with(
        &self,
        status: u16,
        content_type: Option<&'static str>,
        body: BodyStream,
    ) -> &Self {
        let mut headers = http::HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static(ct),
            );
        }
        let head = ResponseHead::new(
            http::StatusCode::from_u16(status).expect("valid status"),
            headers,
        );
        self.steps.lock().push_back(Step::Respond { head, body });
        self
    }

    /// Queue a transport-level failure (no response at all).
    pub(crate) fn refuse(&self, message: &'static str) -> &Self {
        self.steps.lock().push_back(Step::Refuse(message));
        self
    }

    /// Queue a request that never gets a response.
    pub(crate) fn stall(&self) -> &Self {
        self.steps.lock().push_back(Step::Stall);
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of response bodies dropped so far.
    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: http::Request<Bytes>) -> EventSourceResult<TransportResponse> {
        self.requests.lock().push(RecordedRequest {
            at: Instant::now(),
            headers: request.headers().clone(),
        });

        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Respond { head, body }) => Ok(TransportResponse {
                head,
                body: Box::pin(Tracked {
                    inner: body,
                    released: Arc::clone(&self.released),
                }),
            }),
            Some(Step::Refuse(message)) => Err(EventSourceError::io(message)),
            Some(Step::Stall) => std::future::pending().await,
            None => Err(EventSourceError::io("script exhausted")),
        }
    }
}

/// Counts drops of a response body.
struct Tracked {
    inner: BodyStream,
    released: Arc<AtomicUsize>,
}

impl Stream for Tracked {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
