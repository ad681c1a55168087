//! Latest-value cells shared between the feeds and the control loops.
//!
//! Writers overwrite, readers copy out whatever is current. Nothing queues and
//! a reader never waits for a fresh value.

use std::sync::Arc;

use pad_proto::{MarkerObservation, PositionFix, Telemetry};
use parking_lot::Mutex;
use time::OffsetDateTime;

/// One published marker observation. `seq` grows by one per publish so a
/// reader can tell a new detection from a re-read of the old one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSample {
    pub observation: MarkerObservation,
    pub seq: u64,
}

#[derive(Debug, Default)]
struct SlotInner {
    latest: Option<MarkerObservation>,
    seq: u64,
}

/// Single marker slot written by the perception callback.
#[derive(Debug, Clone, Default)]
pub struct MarkerSlot {
    inner: Arc<Mutex<SlotInner>>,
}

impl MarkerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, observation: MarkerObservation) {
        let mut inner = self.inner.lock();
        inner.seq = inner.seq.wrapping_add(1);
        inner.latest = Some(observation);
    }

    /// `None` until the first publish.
    pub fn latest(&self) -> Option<MarkerSample> {
        let inner = self.inner.lock();
        inner.latest.map(|observation| MarkerSample { observation, seq: inner.seq })
    }
}

/// Synchronous read view of the telemetry feed.
pub trait TelemetrySource: Send + Sync {
    fn snapshot(&self) -> Telemetry;
}

/// Mutex-guarded telemetry snapshot, refreshed by whoever owns the feed.
#[derive(Debug, Clone, Default)]
pub struct SharedTelemetry {
    inner: Arc<Mutex<Telemetry>>,
}

impl SharedTelemetry {
    pub fn new(initial: Telemetry) -> Self {
        Self { inner: Arc::new(Mutex::new(initial)) }
    }

    pub fn set_position(&self, x: f64, y: f64, ts: OffsetDateTime) {
        self.inner.lock().position = PositionFix { x, y, ts };
    }

    pub fn update(&self, f: impl FnOnce(&mut Telemetry)) {
        f(&mut self.inner.lock());
    }
}

impl TelemetrySource for SharedTelemetry {
    fn snapshot(&self) -> Telemetry {
        *self.inner.lock()
    }
}
