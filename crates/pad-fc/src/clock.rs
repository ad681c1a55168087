use std::time::Duration;

use tokio::time::Instant;

/// Monotonic time source for the control loops.
pub trait Clock: Send + Sync {
    /// Time since the clock's origin.
    fn elapsed(&self) -> Duration;

    fn now_s(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

/// Runtime clock. Follows tokio's timer, so paused-time tests advance it too.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_runtime() {
        let clock = TokioClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(750)).await;
        assert_eq!(clock.elapsed(), Duration::from_millis(750));
        assert!((clock.now_s() - 0.75).abs() < 1e-9);
    }
}
