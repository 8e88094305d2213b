//! HTTP boundary consumed by the engine.
//!
//! A [`Transport`] executes one request and yields the response head plus a
//! streaming body. Dropping the body must release the underlying connection;
//! the engine relies on that to interrupt reads on cancellation and timeout.

use std::{fmt, pin::Pin};

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;

use crate::error::{BoxError, EventSourceResult};

/// Streaming response body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// Status line and headers of a response, handed to the listener.
#[derive(Clone, Debug)]
pub struct ResponseHead {
    pub status: http::StatusCode,
    pub version: http::Version,
    pub headers: http::HeaderMap,
}

impl ResponseHead {
    pub fn new(status: http::StatusCode, headers: http::HeaderMap) -> Self {
        Self {
            status,
            version: http::Version::HTTP_11,
            headers,
        }
    }

    /// The raw `Content-Type` header, if present and printable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// A response whose body has not been read yet.
pub struct TransportResponse {
    pub head: ResponseHead,
    pub body: BodyStream,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("head", &self.head)
            .finish_non_exhaustive()
    }
}

/// Request executor used by the connector.
///
/// Implementations report DNS, TCP and TLS failures as errors classified
/// [`ErrorKind::Io`](crate::ErrorKind::Io); the response status is never
/// interpreted here.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: http::Request<Bytes>) -> EventSourceResult<TransportResponse>;
}

#[cfg(feature = "reqwest")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use futures_util::TryStreamExt;

    use super::*;
    use crate::error::EventSourceError;

    /// [`Transport`] backed by a shared `reqwest::Client`.
    #[derive(Clone, Debug, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn execute(
            &self,
            request: http::Request<Bytes>,
        ) -> EventSourceResult<TransportResponse> {
            let request = reqwest::Request::try_from(request)?;
            let response = self.client.execute(request).await?;

            let head = ResponseHead {
                status: response.status(),
                version: response.version(),
                headers: response.headers().clone(),
            };
            let body = response
                .bytes_stream()
                .map_err(|e| BoxError::from(EventSourceError::from(e)));

            Ok(TransportResponse {
                head,
                body: Box::pin(body),
            })
        }
    }
}
