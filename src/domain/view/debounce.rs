//! Single-slot debouncer for search input.
//!
//! Holds at most one pending value. Every [`push`](Debouncer::push) cancels
//! whatever was pending and restarts the quiet window, so only a value that
//! survives a full window of silence is ever released.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value, returning the one it cancelled.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        let deadline = now + self.window;
        self.pending
            .replace(Pending { value, deadline })
            .map(|p| p.value)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Release the pending value if its window has elapsed at `now`.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.cancel(),
            _ => None,
        }
    }

    /// Wait out the current window and release the value.
    ///
    /// Returns immediately with `None` when nothing is pending.
    pub async fn settle(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.fire(Instant::now())
    }
}
