use std::future::Future;
use std::time::Duration;

// Port for reading a monotonic time source, in milliseconds.
pub trait Clock: Send {
    fn now_millis(&self) -> u64;
}

/// Port for the periodic callback that drives the session.
///
/// `start` replaces any running period; `stop` is immediate, so no callback fires after it
/// returns.
pub trait Scheduler: Send {
    fn start(&mut self, period: Duration);
    fn stop(&mut self);
    fn period(&self) -> Option<Duration>;

    /// Resolves on the next callback. Never resolves while stopped.
    fn fired(&mut self) -> impl Future<Output = ()> + Send;

    fn is_running(&self) -> bool {
        self.period().is_some()
    }
}
