use std::sync::Arc;

use pad_fc::actuation::Actuator;
use pad_fc::clock::Clock;
use pad_fc::safety::AbortSignal;
use pad_fc::shared::{MarkerSlot, TelemetrySource};
use pad_fc::state::{ManeuverKind, StatusHandle};
use pad_fc::FcConfig;
use pad_proto::{Command, MarkerPose, PositionFix, Waypoint};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{LandingParams, NavParams};
use crate::error::ManeuverError;
use crate::landing::{LandingController, LandingPhase};
use crate::waypoint::{NavState, WaypointController};

#[derive(Debug, Clone)]
pub struct LandingReport {
    pub iterations: u64,
    pub climb_nudges: u32,
    pub land_attempts: u32,
    pub elapsed_s: f64,
    pub touchdown_alt_m: f64,
    pub final_pose: Option<MarkerPose>,
}

#[derive(Debug, Clone)]
pub struct NavReport {
    pub target: Waypoint,
    pub iterations: u64,
    pub stale_skips: u64,
    pub elapsed_s: f64,
    pub final_position: PositionFix,
}

/// Runs one maneuver at a time against the vehicle's feeds and actuator.
///
/// Each maneuver call returns once its terminal condition is reached, the
/// configured timeout expires, or the abort signal fires.
pub struct Maneuvers {
    marker: MarkerSlot,
    telemetry: Arc<dyn TelemetrySource>,
    actuator: Box<dyn Actuator>,
    clock: Arc<dyn Clock>,
    fc: FcConfig,
    landing: LandingParams,
    nav: NavParams,
    abort: AbortSignal,
    status: StatusHandle,
}

impl Maneuvers {
    pub fn new(
        marker: MarkerSlot,
        telemetry: Arc<dyn TelemetrySource>,
        actuator: Box<dyn Actuator>,
        clock: Arc<dyn Clock>,
        fc: FcConfig,
    ) -> Self {
        Self {
            marker,
            telemetry,
            actuator,
            clock,
            fc,
            landing: LandingParams::default(),
            nav: NavParams::default(),
            abort: AbortSignal::new(),
            status: StatusHandle::new(),
        }
    }

    pub fn with_landing_params(mut self, params: LandingParams) -> Self {
        self.landing = params;
        self
    }

    pub fn with_nav_params(mut self, params: NavParams) -> Self {
        self.nav = params;
        self
    }

    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Servo onto the marker in the shared slot and land on it.
    pub async fn land_on_marker(&mut self) -> Result<LandingReport, ManeuverError> {
        let started = self.clock.now_s();
        self.status.begin(ManeuverKind::Landing);
        info!("landing: start alt={:.2}", self.telemetry.snapshot().rangefinder_alt);

        let mut ctl = LandingController::new(self.landing.clone(), started);
        let mut ticker = time::interval(self.fc.loop_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut iterations = 0u64;
        let mut climb_nudges = 0u32;
        let final_pose = loop {
            ticker.tick().await;
            let now = self.checkpoint(started)?;
            iterations += 1;

            let alt = self.telemetry.snapshot().rangefinder_alt;
            let step = ctl.step(self.marker.latest(), alt, now);
            self.status.tick(step.phase.as_str());
            if step.phase == LandingPhase::Searching {
                climb_nudges += step.commands.len() as u32;
            }
            for cmd in &step.commands {
                self.issue(*cmd);
            }
            if step.phase == LandingPhase::Aligned {
                break step.pose;
            }
        };

        let touchdown_alt_m = self.telemetry.snapshot().rangefinder_alt;
        let land_attempts = self.confirm_land(started).await?;
        ctl.confirm_landed();
        self.status.tick(ctl.phase().as_str());

        let elapsed_s = self.clock.now_s() - started;
        info!("landing: confirmed after {} attempt(s), {:.1}s", land_attempts, elapsed_s);
        self.status.finish("landed");
        Ok(LandingReport { iterations, climb_nudges, land_attempts, elapsed_s, touchdown_alt_m, final_pose })
    }

    /// Drive to `target` until both axes are inside the arrival radius.
    pub async fn navigate_to(&mut self, target: Waypoint) -> Result<NavReport, ManeuverError> {
        let started = self.clock.now_s();
        self.status.begin(ManeuverKind::Navigation);
        info!(
            "nav: target=({:.2}, {:.2}, {:.2}) yaw_offset={:.1}",
            target.x, target.y, target.z, target.yaw_offset
        );

        let initial = self.telemetry.snapshot();
        let mut ctl = WaypointController::new(self.nav.clone(), target, Some(initial.position.ts));
        let mut ticker = time::interval(self.fc.loop_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut iterations = 0u64;
        let mut stale_skips = 0u64;
        loop {
            ticker.tick().await;
            self.checkpoint(started)?;
            iterations += 1;

            let telem = self.telemetry.snapshot();
            let out = ctl.step(&telem);
            for cmd in &out.commands {
                self.issue(*cmd);
            }
            match out.state {
                NavState::Arrived => {
                    self.status.tick("arrived");
                    let elapsed_s = self.clock.now_s() - started;
                    info!("nav: {} in {:.1}s", out.message, elapsed_s);
                    self.status.finish("arrived");
                    return Ok(NavReport {
                        target,
                        iterations,
                        stale_skips,
                        elapsed_s,
                        final_position: telem.position,
                    });
                }
                NavState::Stale => {
                    stale_skips += 1;
                    self.status.tick("waiting-fix");
                }
                NavState::Navigating => {
                    debug!("nav: {}", out.message);
                    self.status.tick("navigating");
                }
            }
        }
    }

    /// Keep asking for a land until it is confirmed or the retry policy runs out.
    async fn confirm_land(&mut self, started: f64) -> Result<u32, ManeuverError> {
        let policy = self.fc.land_retry();
        let mut attempts = 0u32;
        loop {
            self.checkpoint(started)?;
            attempts += 1;
            self.status.record_land_attempt();
            match self.actuator.land() {
                Ok(true) => return Ok(attempts),
                Ok(false) => debug!("landing: land attempt {} not confirmed", attempts),
                Err(e) => warn!("landing: land attempt {} failed: {:#}", attempts, e),
            }
            if policy.exhausted(attempts) {
                warn!("landing: giving up after {} land attempts", attempts);
                self.status.finish("land unconfirmed");
                return Err(ManeuverError::LandingUnconfirmed { attempts });
            }
            time::sleep(policy.backoff).await;
        }
    }

    /// Abort and timeout gate, run once per iteration. Returns the loop time.
    fn checkpoint(&mut self, started: f64) -> Result<f64, ManeuverError> {
        let now = self.clock.now_s();
        let err = if self.abort.is_aborted() {
            ManeuverError::Aborted
        } else {
            match self.fc.maneuver_timeout_s {
                Some(limit) if now - started > limit => ManeuverError::Timeout { elapsed_s: now - started },
                _ => return Ok(now),
            }
        };
        // leave the vehicle hovering, not holding the last demand
        self.issue(Command::ZeroVelocity);
        warn!("maneuver stopped: {}", err);
        self.status.finish(err.to_string());
        Err(err)
    }

    fn issue(&mut self, cmd: Command) {
        let res = match cmd {
            Command::Velocity(v) => self.actuator.send_velocity(v),
            Command::Attitude(a) => self.actuator.send_attitude(a),
            Command::ZeroVelocity => self.actuator.set_zero_velocity(),
        };
        if let Err(e) = res {
            warn!("command {:?} not sent: {:#}", cmd, e);
        }
        self.status.record_command(cmd);
    }
}
