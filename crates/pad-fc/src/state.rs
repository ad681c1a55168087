use std::sync::Arc;
use std::time::Duration;

use pad_proto::Command;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverKind {
    Landing,
    Navigation,
}

#[derive(Debug, Clone)]
pub struct ManeuverStatus {
    pub active: Option<ManeuverKind>,
    pub phase: String,
    pub iterations: u64,
    /// Tokio time, so it tracks the control loop under a paused clock too.
    pub started: Option<Instant>,
    pub last_command: Option<Command>,
    pub land_attempts: u32,
    pub last_note: Option<String>,
}

impl Default for ManeuverStatus {
    fn default() -> Self {
        Self {
            active: None,
            phase: "idle".into(),
            iterations: 0,
            started: None,
            last_command: None,
            land_attempts: 0,
            last_note: None,
        }
    }
}

impl ManeuverStatus {
    pub fn running_for(&self) -> Option<Duration> {
        self.started.map(|t| t.elapsed())
    }
}

/// Status shared between a running maneuver and whoever reports on it.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<ManeuverStatus>>,
}

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, kind: ManeuverKind) {
        let mut st = self.inner.lock();
        *st = ManeuverStatus {
            active: Some(kind),
            phase: "starting".into(),
            started: Some(Instant::now()),
            ..ManeuverStatus::default()
        };
    }

    pub fn tick(&self, phase: &str) {
        let mut st = self.inner.lock();
        st.iterations += 1;
        if st.phase != phase {
            st.phase = phase.to_string();
        }
    }

    pub fn record_command(&self, cmd: Command) {
        self.inner.lock().last_command = Some(cmd);
    }

    pub fn record_land_attempt(&self) {
        self.inner.lock().land_attempts += 1;
    }

    pub fn finish(&self, note: impl Into<String>) {
        let mut st = self.inner.lock();
        let note = note.into();
        debug!("status: {:?} finished after {} iterations ({})", st.active, st.iterations, note);
        st.active = None;
        st.last_note = Some(note);
    }

    pub fn snapshot(&self) -> ManeuverStatus {
        self.inner.lock().clone()
    }
}
