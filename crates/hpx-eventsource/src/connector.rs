//! Request construction and handshake validation.

use bytes::Bytes;
use http::{HeaderValue, header};

use tracing::warn;

use crate::{
    config::EventSourceConfig,
    error::{EventSourceError, EventSourceResult},
    transport::ResponseHead,
};

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: header::HeaderName = header::HeaderName::from_static("last-event-id");

/// Build the request for one connection attempt.
///
/// Configured headers are sent as-is, except `Accept` and `Cache-Control`
/// which are forced. `Last-Event-ID` is attached when a non-empty id is known
/// and can be encoded as a header value; otherwise it is left out.
pub(crate) fn build_request(
    config: &EventSourceConfig,
    last_event_id: Option<&str>,
) -> EventSourceResult<http::Request<Bytes>> {
    let mut headers = config.headers.clone();
    headers.insert(header::ACCEPT, HeaderValue::from_static(EVENT_STREAM));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if let Some(id) = last_event_id.filter(|id| !id.is_empty()) {
        match HeaderValue::from_str(id) {
            Ok(value) => {
                headers.insert(LAST_EVENT_ID, value);
            }
            Err(e) => warn!(id = ?id, error = %e, "Last-Event-ID not sendable as a header, omitting"),
        }
    }

    let body = config.body.clone().map(Bytes::from).unwrap_or_default();
    let mut request = http::Request::builder()
        .method(config.method.clone())
        .uri(config.url.as_str())
        .body(body)
        .map_err(|e| EventSourceError::config(format!("Failed to build request: {e}")))?;
    *request.headers_mut() = headers;
    Ok(request)
}

/// Accept only a successful response declaring `text/event-stream`.
///
/// Parameters of the content type are ignored except `charset`, which must
/// be UTF-8 when present; a missing charset means UTF-8.
pub(crate) fn validate_handshake(head: &ResponseHead) -> EventSourceResult<()> {
    if !head.status.is_success() {
        return Err(EventSourceError::InvalidStatus {
            status: head.status,
        });
    }

    let Some(content_type) = head.content_type() else {
        return Err(EventSourceError::InvalidContentType { content_type: None });
    };

    let mut parts = content_type.split(';');
    let essence = parts.next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case(EVENT_STREAM) {
        return Err(EventSourceError::InvalidContentType {
            content_type: Some(content_type.to_owned()),
        });
    }

    let charset = parts
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"'));
    if let Some(charset) = charset
        && !charset.eq_ignore_ascii_case("utf-8")
        && !charset.eq_ignore_ascii_case("utf8")
    {
        return Err(EventSourceError::UnsupportedCharset {
            charset: charset.to_owned(),
        });
    }

    Ok(())
}
