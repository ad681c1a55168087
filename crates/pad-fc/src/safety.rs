use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Spaces out the blind-climb nudges issued while the marker is lost.
///
/// A nudge is allowed once strictly more than `min_interval` has passed since
/// the last nudge or the last [`touch`](Self::touch), whichever is later.
#[derive(Debug, Clone)]
pub struct NudgeLimiter {
    last: f64,
    min_interval: f64,
}

impl NudgeLimiter {
    pub fn new(min_interval_s: f64, now: f64) -> Self {
        Self { last: now, min_interval: min_interval_s }
    }

    /// Restart the interval without nudging (marker seen again).
    pub fn touch(&mut self, now: f64) {
        self.last = now;
    }

    pub fn allow(&mut self, now: f64) -> bool {
        if now - self.last > self.min_interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// How hard to push for a land confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: Option<u32>, backoff: Duration) -> Self {
        Self { max_attempts, backoff }
    }

    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// External stop request, checked once per control-loop iteration.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
