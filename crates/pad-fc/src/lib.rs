pub mod actuation;
pub mod clock;
pub mod pid;
pub mod safety;
pub mod shared;
pub mod state;

use std::time::Duration;

use serde::Deserialize;

use crate::safety::RetryPolicy;

/// Control-loop settings shared by every maneuver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FcConfig {
    /// Control loop rate. Missed ticks are skipped, not bunched.
    pub loop_hz: f64,

    /// Abort a maneuver that has not reached its terminal condition in time.
    /// Absent means run until done or aborted.
    pub maneuver_timeout_s: Option<f64>,

    /// Land confirmations to wait for before giving up. Absent retries forever.
    pub land_max_attempts: Option<u32>,

    /// Pause between land attempts.
    pub land_retry_backoff_ms: u64,

    /// Status line interval for the CLI reporter.
    pub status_log_ms: u64,
}

impl Default for FcConfig {
    fn default() -> Self {
        Self {
            loop_hz: 50.0,
            maneuver_timeout_s: None,
            land_max_attempts: Some(20),
            land_retry_backoff_ms: 250,
            status_log_ms: 1000,
        }
    }
}

/// Fastest loop the timer is asked for. Keeps the tick period non-zero.
pub const MAX_LOOP_HZ: f64 = 1000.0;

impl FcConfig {
    /// Tick period, with the rate held to `1..=MAX_LOOP_HZ`. NaN runs at 1 Hz.
    pub fn loop_period(&self) -> Duration {
        let hz = if self.loop_hz.is_nan() { 1.0 } else { self.loop_hz.clamp(1.0, MAX_LOOP_HZ) };
        Duration::from_secs_f64(1.0 / hz)
    }

    pub fn land_retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.land_max_attempts, Duration::from_millis(self.land_retry_backoff_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_period_is_20ms() {
        assert_eq!(FcConfig::default().loop_period(), Duration::from_millis(20));
    }

    #[test]
    fn loop_rate_floor() {
        let cfg = FcConfig { loop_hz: 0.0, ..FcConfig::default() };
        assert_eq!(cfg.loop_period(), Duration::from_secs(1));
        let cfg = FcConfig { loop_hz: f64::NAN, ..FcConfig::default() };
        assert_eq!(cfg.loop_period(), Duration::from_secs(1));
    }

    #[test]
    fn loop_rate_ceiling_keeps_period_non_zero() {
        for hz in [1e12, f64::INFINITY] {
            let cfg = FcConfig { loop_hz: hz, ..FcConfig::default() };
            assert_eq!(cfg.loop_period(), Duration::from_millis(1));
        }
    }
}
