//! Idle timeout timer owned by one session driver.

use std::{future, pin::Pin, time::Duration};

use tokio::time::{Instant, Sleep, sleep};

/// Fires when no event has been dispatched for `interval`.
///
/// Without an interval the watchdog never fires. Dropping it cancels the
/// countdown.
#[derive(Debug)]
pub(crate) struct Watchdog {
    interval: Option<Duration>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl Watchdog {
    pub(crate) fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|i| !i.is_zero()),
            timer: None,
        }
    }

    pub(crate) fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// (Re)start the countdown from now.
    pub(crate) fn arm(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        let deadline = Instant::now() + interval;
        match self.timer.as_mut() {
            Some(timer) => timer.as_mut().reset(deadline),
            None => self.timer = Some(Box::pin(sleep(interval))),
        }
    }

    /// Completes when the armed countdown elapses; pending forever otherwise.
    pub(crate) async fn expired(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => timer.as_mut().await,
            None => future::pending().await,
        }
    }
}
