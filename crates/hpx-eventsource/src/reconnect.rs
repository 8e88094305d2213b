//! Reconnection policy: whether and when a dropped connection is retried.

use std::time::Duration;

use rand::RngExt;

use crate::{config::EventSourceConfig, error::EventSourceError};

/// Backoff parameters derived from [`EventSourceConfig`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct BackoffConfig {
    pub(crate) initial_delay: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) factor: f64,
    pub(crate) jitter: f64,
}

impl BackoffConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.initial_delay.is_zero() {
            return Err("Initial reconnect delay must be > 0".to_string());
        }
        if self.max_delay < self.initial_delay {
            return Err("Max reconnect delay must be >= initial reconnect delay".to_string());
        }
        if self.factor < 1.0 || !self.factor.is_finite() {
            return Err("Backoff factor must be >= 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter) || !self.jitter.is_finite() {
            return Err("Jitter must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

/// Delay for the `attempt`-th consecutive retry, starting from `base`.
///
/// Never shorter than `base`: the cap is raised to `base` when a server
/// advises a retry above `max_delay`, and jitter only ever adds.
pub(crate) fn calculate_backoff(config: BackoffConfig, base: Duration, attempt: u32) -> Duration {
    let base_secs = base.as_secs_f64();
    let cap = config.max_delay.max(base).as_secs_f64();
    let exponent = config.factor.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
    let delay = (base_secs * exponent).min(cap);

    if config.jitter == 0.0 || delay == 0.0 {
        return Duration::from_secs_f64(delay);
    }

    let extra = rand::rng().random_range(0.0..=delay * config.jitter);
    Duration::from_secs_f64(delay + extra)
}

/// Outcome of [`ReconnectPolicy::decide`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Terminal, reported through `on_failure`.
    Fail,
    /// Reconnect after the delay.
    Retry(Duration),
}

/// Tracks consecutive failed attempts and turns failed connections into
/// [`Decision`]s. Owned by a single session driver.
///
/// Only failures reach the policy: a stream the server ends cleanly is
/// never retried.
#[derive(Debug)]
pub(crate) struct ReconnectPolicy {
    enabled: bool,
    backoff: BackoffConfig,
    max_attempts: Option<u32>,
    attempt: u32,
}

impl ReconnectPolicy {
    pub(crate) fn new(config: &EventSourceConfig) -> Self {
        Self {
            enabled: config.reconnect,
            backoff: config.backoff(),
            max_attempts: config.reconnect_max_attempts,
            attempt: 0,
        }
    }

    /// Consecutive failed attempts so far.
    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Forget past failures once a connection opened successfully.
    pub(crate) fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Decide what follows `err`. `advised` is the last server `retry:`.
    pub(crate) fn decide(&mut self, err: &EventSourceError, advised: Option<Duration>) -> Decision {
        if !self.enabled || !err.is_retryable() {
            return Decision::Fail;
        }
        if let Some(max) = self.max_attempts
            && self.attempt >= max
        {
            return Decision::Fail;
        }

        let base = advised.unwrap_or(self.backoff.initial_delay);
        let delay = calculate_backoff(self.backoff, base, self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        Decision::Retry(delay)
    }
}
