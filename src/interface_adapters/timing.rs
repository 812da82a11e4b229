// Tokio-backed clock and scheduler used by the host task.

use crate::domain::{Clock, Scheduler};
use std::time::{Duration, Instant};
use tokio::time::{Interval, MissedTickBehavior, interval_at};

/// Monotonic milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Periodic callback backed by a `tokio::time::Interval`.
///
/// Dropping the interval on `stop` guarantees that no pending tick survives it.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    interval: Option<Interval>,
    period: Option<Duration>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, period: Duration) {
        // First callback one full period after start, not immediately.
        let mut interval = interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.period = Some(period);
    }

    fn stop(&mut self) {
        self.interval = None;
        self.period = None;
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }

    async fn fired(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
