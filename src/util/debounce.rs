use std::time::Duration;

use tokio::time::Instant;

/// Trailing-edge debounce over a value.
///
/// Every `push` replaces the pending value and restarts the quiet period; the
/// value becomes ready once `wait` has elapsed without another push. Callers
/// either await `settled` or drive it from a `select!` loop with `deadline`.
#[derive(Debug)]
pub struct Debounce<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(wait: Duration) -> Self {
        Self { wait, pending: None }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.wait));
    }

    /// When the pending value becomes ready, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the value only if its quiet period is over
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Take the value immediately, skipping the rest of the wait
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Wait out the quiet period and return the last pushed value
    pub async fn settled(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.flush()
    }
}
