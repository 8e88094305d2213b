//! Event source configuration.

use std::time::Duration;

use crate::reconnect::BackoffConfig;

/// Configuration for an [`EventSource`](crate::EventSource).
///
/// Describes the request to issue (and re-issue on reconnection), the idle
/// timeout watchdog and the reconnection policy. Built with chainable
/// setters on top of [`EventSourceConfig::new`].
#[derive(Clone, Debug)]
pub struct EventSourceConfig {
    /// Event stream URL.
    pub url: String,
    /// HTTP method (usually GET, some APIs use POST).
    pub method: http::Method,
    /// Additional HTTP headers sent with every request.
    pub headers: http::HeaderMap,
    /// Optional request body (for POST-based streams).
    pub body: Option<Vec<u8>>,
    /// Upper bound on each handshake, from request to response headers.
    pub connect_timeout: Duration,
    /// Maximum silence between two events before the connection is dropped.
    /// `None` or zero disables the watchdog.
    pub idle_timeout: Option<Duration>,
    /// Whether dropped connections are re-established.
    pub reconnect: bool,
    /// Delay before reconnecting until the server advises one via `retry:`.
    pub reconnect_initial_delay: Duration,
    /// Cap on the delay once backoff is applied.
    pub reconnect_max_delay: Duration,
    /// Multiplier applied per consecutive failed attempt (1.0 keeps it constant).
    pub reconnect_backoff_factor: f64,
    /// Maximum consecutive reconnection attempts (None = unlimited).
    pub reconnect_max_attempts: Option<u32>,
    /// Extra random delay, as a fraction (0.0–1.0) of the computed delay.
    pub reconnect_jitter: f64,
    /// Id to resume from on the very first request.
    pub last_event_id: Option<String>,
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: http::Method::GET,
            headers: http::HeaderMap::new(),
            body: None,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: None,
            reconnect: true,
            reconnect_initial_delay: Duration::from_secs(3),
            reconnect_max_delay: Duration::from_secs(60),
            reconnect_backoff_factor: 1.0,
            reconnect_max_attempts: None,
            reconnect_jitter: 0.0,
            last_event_id: None,
        }
    }
}

impl EventSourceConfig {
    /// Create a new configuration targeting `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: http::HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle timeout. Zero disables it.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Enable or disable reconnection after network failures and timeouts.
    #[must_use]
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.reconnect = enabled;
        self
    }

    #[must_use]
    pub fn reconnect_initial_delay(mut self, delay: Duration) -> Self {
        self.reconnect_initial_delay = delay;
        self
    }

    #[must_use]
    pub fn reconnect_max_delay(mut self, delay: Duration) -> Self {
        self.reconnect_max_delay = delay;
        self
    }

    #[must_use]
    pub fn reconnect_backoff_factor(mut self, factor: f64) -> Self {
        self.reconnect_backoff_factor = factor;
        self
    }

    #[must_use]
    pub fn reconnect_max_attempts(mut self, attempts: Option<u32>) -> Self {
        self.reconnect_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn reconnect_jitter(mut self, jitter: f64) -> Self {
        self.reconnect_jitter = jitter;
        self
    }

    /// Resume from `id`: the first request already carries `Last-Event-ID`.
    #[must_use]
    pub fn last_event_id(mut self, id: impl Into<String>) -> Self {
        self.last_event_id = Some(id.into());
        self
    }

    /// The idle timeout with zero folded into `None`.
    pub(crate) fn effective_idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout.filter(|t| !t.is_zero())
    }

    pub(crate) fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay: self.reconnect_initial_delay,
            max_delay: self.reconnect_max_delay,
            factor: self.reconnect_backoff_factor,
            jitter: self.reconnect_jitter,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error message string if any field has an invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }
        if self.url.parse::<http::Uri>().is_err() {
            return Err(format!("Invalid URL: {}", self.url));
        }
        self.backoff().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EventSourceConfig::default();
        assert!(config.url.is_empty());
        assert_eq!(config.method, http::Method::GET);
        assert!(config.headers.is_empty());
        assert!(config.body.is_none());
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.idle_timeout.is_none());
        assert!(config.reconnect);
        assert_eq!(config.reconnect_initial_delay, Duration::from_secs(3));
        assert_eq!(config.reconnect_max_delay, Duration::from_secs(60));
        assert_eq!(config.reconnect_backoff_factor, 1.0);
        assert!(config.reconnect_max_attempts.is_none());
        assert_eq!(config.reconnect_jitter, 0.0);
        assert!(config.last_event_id.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let mut headers = http::HeaderMap::new();
        headers.insert("X-Api-Key", "test-key".parse().expect("valid header value"));

        let config = EventSourceConfig::new("https://api.example.com/stream")
            .method(http::Method::POST)
            .headers(headers)
            .body(b"subscribe".to_vec())
            .connect_timeout(Duration::from_secs(30))
            .idle_timeout(Some(Duration::from_secs(45)))
            .reconnect(false)
            .reconnect_initial_delay(Duration::from_millis(500))
            .reconnect_max_delay(Duration::from_secs(120))
            .reconnect_backoff_factor(1.5)
            .reconnect_max_attempts(Some(5))
            .reconnect_jitter(0.2)
            .last_event_id("evt-9");

        assert_eq!(config.url, "https://api.example.com/stream");
        assert_eq!(config.method, http::Method::POST);
        assert_eq!(
            config
                .headers
                .get("X-Api-Key")
                .map(|v| v.to_str().expect("valid str")),
            Some("test-key")
        );
        assert_eq!(config.body.as_deref(), Some(b"subscribe".as_slice()));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(45)));
        assert!(!config.reconnect);
        assert_eq!(config.reconnect_initial_delay, Duration::from_millis(500));
        assert_eq!(config.reconnect_max_delay, Duration::from_secs(120));
        assert_eq!(config.reconnect_backoff_factor, 1.5);
        assert_eq!(config.reconnect_max_attempts, Some(5));
        assert_eq!(config.reconnect_jitter, 0.2);
        assert_eq!(config.last_event_id.as_deref(), Some("evt-9"));
    }

    #[test]
    fn test_zero_idle_timeout_disables_watchdog() {
        let config = EventSourceConfig::new("http://localhost/").idle_timeout(Some(Duration::ZERO));
        assert!(config.effective_idle_timeout().is_none());
    }

    #[test]
    fn test_validation_empty_url() {
        let result = EventSourceConfig::default().validate();
        assert_eq!(result.expect_err("should fail"), "URL cannot be empty");
    }

    #[test]
    fn test_validation_unparsable_url() {
        let result = EventSourceConfig::new("http://exa mple.com").validate();
        assert!(result.expect_err("should fail").starts_with("Invalid URL"));
    }

    #[test]
    fn test_validation_invalid_backoff() {
        let result = EventSourceConfig::new("https://example.com")
            .reconnect_backoff_factor(0.5)
            .validate();
        assert_eq!(result.expect_err("should fail"), "Backoff factor must be >= 1.0");
    }

    #[test]
    fn test_validation_invalid_jitter() {
        for jitter in [-0.1, 1.5] {
            let result = EventSourceConfig::new("https://example.com")
                .reconnect_jitter(jitter)
                .validate();
            assert_eq!(
                result.expect_err("should fail"),
                "Jitter must be between 0.0 and 1.0"
            );
        }
    }

    #[test]
    fn test_validation_max_below_initial() {
        let result = EventSourceConfig::new("https://example.com")
            .reconnect_initial_delay(Duration::from_secs(10))
            .reconnect_max_delay(Duration::from_secs(1))
            .validate();
        assert_eq!(
            result.expect_err("should fail"),
            "Max reconnect delay must be >= initial reconnect delay"
        );
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(EventSourceConfig::new("https://example.com").validate().is_ok());
    }
}
