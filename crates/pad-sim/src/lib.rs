//! Simulated vehicle for exercising the maneuvers off-airframe.
//!
//! [`Simulator::spawn`] starts two tasks on the current tokio runtime: a
//! physics integrator that also feeds [`SharedTelemetry`], and a camera that
//! publishes into a [`MarkerSlot`] at its own rate. Both follow tokio time, so
//! paused-clock tests run them deterministically.

pub mod perception;
pub mod recorder;
pub mod vehicle;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pad_fc::shared::{MarkerSlot, SharedTelemetry};
use pad_proto::Telemetry;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{self as ttime, MissedTickBehavior};
use tracing::{debug, error, info};

pub use recorder::{Call, CommandLog};
pub use vehicle::{SimActuator, SimState};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub start_x: f64,
    pub start_y: f64,
    pub start_alt_m: f64,
    pub start_heading_deg: f64,

    pub marker_id: i32,
    pub marker_x: f64,
    pub marker_y: f64,
    pub marker_heading_deg: f64,

    pub physics_hz: f64,
    /// Position fix rate. Altitude and heading refresh every physics step.
    pub fix_hz: f64,
    pub camera_hz: f64,
    pub camera_half_fov_deg: f64,
    pub min_visible_alt_m: f64,

    pub pose_noise_m: f64,
    pub yaw_noise_deg: f64,
    /// Probability a camera frame misses the marker.
    pub dropout: f64,

    /// Land requests refused before one is accepted.
    pub land_rejections: u32,
    pub max_land_alt_m: f64,

    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_x: 0.0,
            start_y: 0.0,
            start_alt_m: 1.5,
            start_heading_deg: 0.0,
            marker_id: 23,
            marker_x: 0.4,
            marker_y: -0.3,
            marker_heading_deg: 20.0,
            physics_hz: 100.0,
            fix_hz: 10.0,
            camera_hz: 15.0,
            camera_half_fov_deg: 30.0,
            min_visible_alt_m: 0.3,
            pose_noise_m: 0.004,
            yaw_noise_deg: 0.3,
            dropout: 0.02,
            land_rejections: 2,
            max_land_alt_m: 1.0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Range checks for everything the sim tasks sample or divide by.
    pub fn validate(&self) -> Result<()> {
        for (name, hz) in [("physics_hz", self.physics_hz), ("fix_hz", self.fix_hz), ("camera_hz", self.camera_hz)] {
            anyhow::ensure!(hz.is_finite() && hz > 0.0 && hz <= 1000.0, "sim.{} should be in (0, 1000]", name);
        }
        anyhow::ensure!(
            self.camera_half_fov_deg > 0.0 && self.camera_half_fov_deg < 90.0,
            "sim.camera_half_fov_deg should be in (0, 90)"
        );
        anyhow::ensure!(self.min_visible_alt_m >= 0.0, "sim.min_visible_alt_m must not be negative");
        anyhow::ensure!(self.pose_noise_m.is_finite() && self.pose_noise_m >= 0.0, "sim.pose_noise_m must be >= 0");
        anyhow::ensure!(self.yaw_noise_deg.is_finite() && self.yaw_noise_deg >= 0.0, "sim.yaw_noise_deg must be >= 0");
        anyhow::ensure!((0.0..=1.0).contains(&self.dropout), "sim.dropout should be in [0, 1]");
        anyhow::ensure!(self.max_land_alt_m > 0.0, "sim.max_land_alt_m must be positive");
        anyhow::ensure!(self.start_alt_m >= 0.0 && self.start_alt_m.is_finite(), "sim.start_alt_m must be >= 0");
        Ok(())
    }
}

pub struct Simulator {
    state: vehicle::SharedState,
    telemetry: SharedTelemetry,
    marker: MarkerSlot,
    actuator: SimActuator,
    running: Arc<AtomicBool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Simulator {
    /// Must be called from inside a tokio runtime. Rejects a config that
    /// fails [`SimConfig::validate`].
    pub fn spawn(cfg: SimConfig) -> Result<Self> {
        cfg.validate()?;
        let state = Arc::new(Mutex::new(SimState::from_config(&cfg)));
        let telemetry = SharedTelemetry::new(Telemetry {
            rangefinder_alt: cfg.start_alt_m,
            compass_heading: cfg.start_heading_deg,
            ..Telemetry::default()
        });
        telemetry.set_position(cfg.start_x, cfg.start_y, OffsetDateTime::UNIX_EPOCH);
        let marker = MarkerSlot::new();
        let actuator = SimActuator::new(state.clone(), &cfg);
        let running = Arc::new(AtomicBool::new(true));

        let seed = cfg.seed.unwrap_or_else(rand::random);
        info!("sim: start ({:.2}, {:.2}) alt={:.2} seed={}", cfg.start_x, cfg.start_y, cfg.start_alt_m, seed);

        let tasks = vec![
            ("physics", tokio::spawn(physics(cfg.clone(), state.clone(), telemetry.clone(), running.clone()))),
            (
                "camera",
                tokio::spawn(camera(cfg, state.clone(), marker.clone(), running.clone(), StdRng::seed_from_u64(seed))),
            ),
        ];

        Ok(Self { state, telemetry, marker, actuator, running, tasks })
    }

    pub fn actuator(&self) -> SimActuator {
        self.actuator.clone()
    }

    pub fn telemetry(&self) -> SharedTelemetry {
        self.telemetry.clone()
    }

    pub fn marker_slot(&self) -> MarkerSlot {
        self.marker.clone()
    }

    pub fn state(&self) -> SimState {
        *self.state.lock()
    }

    /// Errors once the sim has been shut down or one of its tasks has ended.
    /// A task only ends on its own by panicking.
    pub fn ensure_running(&self) -> Result<()> {
        anyhow::ensure!(self.running.load(Ordering::Relaxed), "sim: shut down");
        if let Some((name, _)) = self.tasks.iter().find(|(_, t)| t.is_finished()) {
            anyhow::bail!("sim: {} task died", name);
        }
        Ok(())
    }

    pub fn shutdown(&mut self) {
        let was_running = self.running.swap(false, Ordering::Relaxed);
        for (name, t) in self.tasks.drain(..) {
            if was_running && t.is_finished() {
                error!("sim: {} task ended early", name);
            }
            t.abort();
        }
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn period(hz: f64) -> Duration {
    Duration::from_secs_f64(1.0 / hz.max(0.1))
}

async fn physics(cfg: SimConfig, state: vehicle::SharedState, telemetry: SharedTelemetry, running: Arc<AtomicBool>) {
    let step = period(cfg.physics_hz);
    let dt = step.as_secs_f64();
    let fix_every = (cfg.physics_hz / cfg.fix_hz.max(0.1)).round().max(1.0) as u64;
    let mut interval = ttime::interval(step);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    while running.load(Ordering::Relaxed) {
        interval.tick().await;
        tick += 1;
        let st = {
            let mut st = state.lock();
            st.integrate(dt);
            *st
        };
        telemetry.update(|t| {
            t.rangefinder_alt = st.alt;
            t.compass_heading = st.heading_deg;
        });
        if tick % fix_every == 0 {
            // sim-time stamps: strictly increasing, one per fix
            let ts = OffsetDateTime::UNIX_EPOCH + time::Duration::nanoseconds((tick as f64 * dt * 1e9) as i64);
            telemetry.set_position(st.x, st.y, ts);
        }
    }
    debug!("sim: physics stopped");
}

async fn camera(cfg: SimConfig, state: vehicle::SharedState, marker: MarkerSlot, running: Arc<AtomicBool>, mut rng: StdRng) {
    let mut interval = ttime::interval(period(cfg.camera_hz));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while running.load(Ordering::Relaxed) {
        interval.tick().await;
        let st = *state.lock();
        marker.publish(perception::observe(&st, &cfg, &mut rng));
    }
    debug!("sim: camera stopped");
}
