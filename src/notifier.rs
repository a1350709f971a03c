//! Progress and status notification for a run
//!
//! Subscribers are handed over when the notifier is built. Both are optional;
//! an unsubscribed channel is a no-op.

use std::fmt;
use std::sync::atomic::{AtomicI16, Ordering};

pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;
pub type StatusFn = Box<dyn Fn(&str) + Send + Sync>;

/// One-way progress (0-100, never decreasing) and status channels
pub struct Notifier {
    on_progress: Option<ProgressFn>,
    on_status: Option<StatusFn>,
    /// Last emitted progress, -1 before the first emission
    last_progress: AtomicI16,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            on_progress: None,
            on_status: None,
            last_progress: AtomicI16::new(-1),
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_status", &self.on_status.is_some())
            .field("last_progress", &self.last_progress.load(Ordering::Relaxed))
            .finish()
    }
}

impl Notifier {
    /// Notifier with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, subscriber: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(subscriber));
        self
    }

    pub fn on_status(mut self, subscriber: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Box::new(subscriber));
        self
    }

    /// Emit a progress value. Values above 100 are clamped and values lower
    /// than the last emitted one are dropped.
    pub fn progress(&self, value: u8) {
        let value = i16::from(value.min(100));
        let previous = self.last_progress.fetch_max(value, Ordering::SeqCst);
        if value <= previous {
            return;
        }

        if let Some(subscriber) = &self.on_progress {
            subscriber(value as u8);
        }
    }

    /// Emit `done / total` as a percentage
    pub fn progress_of(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = (done.min(total) * 100) / total;
        self.progress(percent as u8);
    }

    pub fn status(&self, message: &str) {
        if let Some(subscriber) = &self.on_status {
            subscriber(message);
        }
    }

    /// Forget the last emitted value so a new run starts from 0 again
    pub fn reset(&self) {
        self.last_progress.store(-1, Ordering::SeqCst);
    }
}
