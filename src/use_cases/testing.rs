// Deterministic stand-ins for the session's ports.

use crate::domain::{Clock, Scheduler};
use crate::use_cases::types::{HostNotice, PeerLink};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeClock(Arc<AtomicU64>);

impl FakeClock {
    pub fn at(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records the requested period; tests call `on_timer` themselves.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    period: Option<Duration>,
    pub starts: usize,
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, period: Duration) {
        self.period = Some(period);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.period = None;
    }

    fn period(&self) -> Option<Duration> {
        self.period
    }

    fn fired(&mut self) -> impl Future<Output = ()> + Send {
        std::future::pending()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingLink {
    conn_id: u64,
    // Refuses frames once this many are held, like a full socket queue.
    capacity: Option<usize>,
    sent: Arc<Mutex<Vec<HostNotice>>>,
    lagged: Arc<AtomicBool>,
}

impl RecordingLink {
    pub fn new(conn_id: u64) -> Self {
        Self {
            conn_id,
            ..Self::default()
        }
    }

    pub fn bounded(conn_id: u64, capacity: usize) -> Self {
        Self {
            conn_id,
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn is_lagged(&self) -> bool {
        self.lagged.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<HostNotice> {
        self.sent.lock().expect("link lock").clone()
    }

    pub fn clear(&self) {
        self.sent.lock().expect("link lock").clear();
    }

    pub fn count(&self, pred: impl Fn(&HostNotice) -> bool) -> usize {
        self.sent().iter().filter(|n| pred(n)).count()
    }
}

impl PeerLink for RecordingLink {
    type Frame = HostNotice;

    fn encode(notice: &HostNotice) -> Option<HostNotice> {
        Some(notice.clone())
    }

    fn send(&self, frame: HostNotice) -> bool {
        let mut sent = self.sent.lock().expect("link lock");
        if self.capacity.is_some_and(|cap| sent.len() >= cap) {
            return false;
        }
        sent.push(frame);
        true
    }

    fn conn_id(&self) -> u64 {
        self.conn_id
    }

    fn lagged(&self) {
        self.lagged.store(true, Ordering::SeqCst);
    }
}
