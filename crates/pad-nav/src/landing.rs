use pad_fc::pid::Pid;
use pad_fc::safety::NudgeLimiter;
use pad_fc::shared::MarkerSample;
use pad_proto::{AttitudeCommand, Command, MarkerPose, VelocityCommand};
use tracing::{debug, info};

use crate::angle::{clamp_sym, shortest_turn_deg, within_deg, yaw_command};
use crate::config::LandingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingPhase {
    /// No usable marker.
    Searching,
    /// Marker in view, closing in.
    Servoing,
    /// Centered, low and square to the marker. Velocity zeroed, land pending.
    Aligned,
    /// Actuation confirmed touchdown.
    Landed,
}

impl LandingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandingPhase::Searching => "searching",
            LandingPhase::Servoing => "servoing",
            LandingPhase::Aligned => "aligned",
            LandingPhase::Landed => "landed",
        }
    }
}

/// Raw PID outputs per axis. Computed every servo step, not used for motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisOutputs {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

#[derive(Debug, Clone)]
pub struct LandingStep {
    pub phase: LandingPhase,
    /// Commands to issue, in order.
    pub commands: Vec<Command>,
    pub pose: Option<MarkerPose>,
    pub pid: Option<AxisOutputs>,
}

/// Marker-relative landing state machine, one instance per attempt.
///
/// [`step`](Self::step) is pure with respect to I/O: it takes the latest
/// marker sample, altitude and time, and returns the commands to send.
#[derive(Debug)]
pub struct LandingController {
    params: LandingParams,
    pid_x: Pid,
    pid_y: Pid,
    pid_yaw: Pid,
    nudge: NudgeLimiter,
    phase: LandingPhase,
    last_seq: Option<u64>,
    last_fresh_at: f64,
}

impl LandingController {
    pub fn new(params: LandingParams, now: f64) -> Self {
        let g = params.gains;
        Self {
            pid_x: Pid::new(g.x, 0.0, now),
            pid_y: Pid::new(g.y, 0.0, now),
            pid_yaw: Pid::new(g.yaw, 0.0, now),
            nudge: NudgeLimiter::new(params.ascend_interval_s, now),
            phase: LandingPhase::Searching,
            last_seq: None,
            last_fresh_at: now,
            params,
        }
    }

    pub fn phase(&self) -> LandingPhase {
        self.phase
    }

    pub fn step(&mut self, marker: Option<MarkerSample>, altitude: f64, now: f64) -> LandingStep {
        let Some(pose) = self.usable_pose(marker, now) else {
            return self.search(altitude, now);
        };
        self.nudge.touch(now);

        let p = self.params.clone();
        let turn = shortest_turn_deg(pose.yaw_deg);
        let pid = AxisOutputs {
            x: self.pid_x.evaluate(pose.x, now),
            y: self.pid_y.evaluate(pose.y, now),
            yaw: self.pid_yaw.evaluate(turn, now),
        };

        let distance = pose.planar_distance();
        // marker y drives body x and marker x drives body y
        let move_x = clamp_sym(-pose.y, p.max_horizontal_speed);
        let move_y = clamp_sym(-pose.x, p.max_horizontal_speed);
        let move_yaw = yaw_command(turn, p.max_yaw_rate_rad());

        let aligned = distance < p.align_radius_m
            && altitude <= p.lowest_visible_alt_m
            && within_deg(pose.yaw_deg, p.yaw_tolerance_deg);

        if aligned {
            self.transition(LandingPhase::Aligned, altitude);
            info!(
                "landing: aligned x={:.3} y={:.3} z={:.3} yaw={:.1} alt={:.2}",
                pose.x, pose.y, pose.z, pose.yaw_deg, altitude
            );
            return LandingStep {
                phase: self.phase,
                commands: vec![Command::ZeroVelocity],
                pose: Some(pose),
                pid: Some(pid),
            };
        }

        self.transition(LandingPhase::Servoing, altitude);
        // hold height once at the visibility floor and keep converging laterally
        let vz = if altitude > p.lowest_visible_alt_m { -p.descent_rate } else { 0.0 };
        debug!(
            "landing: move_x={:.2} move_y={:.2} move_yaw={:.2} vz={:.2} dist={:.3}",
            move_x, move_y, move_yaw, vz, distance
        );

        LandingStep {
            phase: self.phase,
            commands: vec![
                Command::Attitude(AttitudeCommand::yaw_only(move_yaw)),
                Command::Velocity(VelocityCommand::new(move_x, move_y, vz, 0.0)),
            ],
            pose: Some(pose),
            pid: Some(pid),
        }
    }

    /// Actuation confirmed the land command.
    pub fn confirm_landed(&mut self) {
        self.phase = LandingPhase::Landed;
    }

    fn usable_pose(&mut self, marker: Option<MarkerSample>, now: f64) -> Option<MarkerPose> {
        let sample = marker?;
        if self.last_seq != Some(sample.seq) {
            self.last_seq = Some(sample.seq);
            self.last_fresh_at = now;
        }
        if let Some(timeout) = self.params.marker_timeout_s {
            if now - self.last_fresh_at > timeout {
                return None;
            }
        }
        sample.observation.pose()
    }

    fn search(&mut self, altitude: f64, now: f64) -> LandingStep {
        self.transition(LandingPhase::Searching, altitude);
        let mut commands = Vec::new();
        if altitude < self.params.search_ceiling_m && self.nudge.allow(now) {
            debug!("landing: marker lost, climbing alt={:.2}", altitude);
            commands.push(Command::Velocity(VelocityCommand::new(0.0, 0.0, self.params.ascend_rate, 0.0)));
        }
        LandingStep { phase: self.phase, commands, pose: None, pid: None }
    }

    fn transition(&mut self, next: LandingPhase, altitude: f64) {
        if self.phase != next {
            info!("landing: {} -> {} alt={:.2}", self.phase.as_str(), next.as_str(), altitude);
            self.phase = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pad_proto::MarkerObservation;

    fn sample(seq: u64, x: f64, y: f64, yaw: f64) -> Option<MarkerSample> {
        Some(MarkerSample { observation: MarkerObservation::new(3, x, y, 0.5, yaw), seq })
    }

    fn velocity(step: &LandingStep) -> VelocityCommand {
        *step.commands.iter().find_map(|c| c.velocity()).expect("velocity command")
    }

    #[test]
    fn scenario_a_aligned_marker_zeroes_velocity() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let step = ctl.step(sample(1, 0.01, 0.01, 1.0), 0.5, 0.02);
        assert_eq!(step.phase, LandingPhase::Aligned);
        assert_eq!(step.commands, vec![Command::ZeroVelocity]);
        ctl.confirm_landed();
        assert_eq!(ctl.phase(), LandingPhase::Landed);
    }

    #[test]
    fn criteria_outside_window_never_align() {
        let params = LandingParams::default();
        // (x, y, yaw, altitude), each breaking exactly one criterion
        let cases = [
            (0.03, 0.0, 1.0, 0.5),
            (0.0, -0.03, 1.0, 0.5),
            (0.025, 0.025, 1.0, 0.5),
            (0.0, 0.0, 1.0, 0.71),
            (0.0, 0.0, 5.0, 0.5),
            (0.0, 0.0, 355.0, 0.5),
            (0.0, 0.0, 180.0, 0.5),
            (0.0, 0.0, 90.0, 0.7),
        ];
        for (i, (x, y, yaw, alt)) in cases.into_iter().enumerate() {
            let mut ctl = LandingController::new(params.clone(), 0.0);
            let step = ctl.step(sample(1, x, y, yaw), alt, 0.1);
            assert_ne!(step.phase, LandingPhase::Aligned, "case {i}");
            assert!(!step.commands.contains(&Command::ZeroVelocity), "case {i}");
        }
    }

    #[test]
    fn criteria_sweep() {
        let params = LandingParams::default();
        for yaw_tenths in 0..3600 {
            let yaw = yaw_tenths as f64 / 10.0;
            for alt in [0.3, 0.7, 0.7001, 2.0] {
                for d in [0.0, 0.02, 0.0299, 0.03, 0.5] {
                    let mut ctl = LandingController::new(params.clone(), 0.0);
                    let step = ctl.step(sample(1, d, 0.0, yaw), alt, 0.1);
                    let expect = d < 0.03 && alt <= 0.7 && (yaw < 5.0 || yaw > 355.0);
                    assert_eq!(step.phase == LandingPhase::Aligned, expect, "d={d} alt={alt} yaw={yaw}");
                }
            }
        }
    }

    #[test]
    fn servo_uses_swapped_clamped_offsets() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let step = ctl.step(sample(1, 0.1, -2.0, 0.0), 1.5, 0.1);
        assert_eq!(step.phase, LandingPhase::Servoing);
        let v = velocity(&step);
        assert!((v.vx - 0.3).abs() < 1e-12);
        assert!((v.vy - -0.1).abs() < 1e-12);
        assert_eq!(v.vz, -0.2);
        assert_eq!(v.yaw_rate, 0.0);
        // the PID still ran
        let pid = step.pid.unwrap();
        assert!((pid.y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn descent_stops_at_visibility_floor() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let high = ctl.step(sample(1, 0.5, 0.5, 0.0), 0.71, 0.1);
        assert_eq!(velocity(&high).vz, -0.2);
        let low = ctl.step(sample(2, 0.5, 0.5, 0.0), 0.7, 0.2);
        assert_eq!(velocity(&low).vz, 0.0);
    }

    #[test]
    fn yaw_demand_takes_short_way_round() {
        let max = 15f64.to_radians();
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let step = ctl.step(sample(1, 0.5, 0.0, 350.0), 1.0, 0.1);
        let Command::Attitude(att) = step.commands[0] else { panic!("expected attitude first") };
        assert!((att.yaw - 10f64.to_radians()).abs() < 1e-12);

        let step = ctl.step(sample(2, 0.5, 0.0, 90.0), 1.0, 0.2);
        let Command::Attitude(att) = step.commands[0] else { panic!("expected attitude first") };
        assert_eq!(att.yaw, -max);
    }

    #[test]
    fn scenario_b_no_marker_nudges_every_half_second() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let mut nudges = Vec::new();
        for i in 0..=20 {
            let t = i as f64 * 0.1;
            let step = ctl.step(None, 1.0, t);
            assert_eq!(step.phase, LandingPhase::Searching);
            for c in step.commands {
                assert_eq!(c, Command::Velocity(VelocityCommand::new(0.0, 0.0, 0.2, 0.0)));
                nudges.push(t);
            }
        }
        assert_eq!(nudges.len(), 3);
        for pair in nudges.windows(2) {
            assert!(pair[1] - pair[0] > 0.5);
        }
    }

    #[test]
    fn no_nudge_above_ceiling() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        for i in 0..30 {
            let step = ctl.step(None, 3.0, i as f64 * 0.1);
            assert!(step.commands.is_empty());
        }
    }

    #[test]
    fn incomplete_marker_counts_as_lost() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        let mut obs = MarkerObservation::new(1, 0.0, 0.0, 1.0, 0.0);
        obs.yaw = None;
        let step = ctl.step(Some(MarkerSample { observation: obs, seq: 1 }), 1.0, 0.6);
        assert_eq!(step.phase, LandingPhase::Searching);
        assert_eq!(step.commands.len(), 1);
    }

    #[test]
    fn visible_marker_restarts_nudge_interval() {
        let mut ctl = LandingController::new(LandingParams::default(), 0.0);
        ctl.step(sample(1, 0.5, 0.5, 0.0), 1.0, 0.4);
        // lost again, but the interval counts from the last sighting
        assert!(ctl.step(None, 1.0, 0.8).commands.is_empty());
        assert_eq!(ctl.step(None, 1.0, 0.95).commands.len(), 1);
    }

    #[test]
    fn frozen_marker_times_out_when_configured() {
        let params = LandingParams { marker_timeout_s: Some(1.0), ..LandingParams::default() };
        let mut ctl = LandingController::new(params, 0.0);
        let frozen = sample(7, 0.5, 0.5, 0.0);
        assert_eq!(ctl.step(frozen, 1.0, 0.1).phase, LandingPhase::Servoing);
        assert_eq!(ctl.step(frozen, 1.0, 1.0).phase, LandingPhase::Servoing);
        assert_eq!(ctl.step(frozen, 1.0, 1.2).phase, LandingPhase::Searching);
        // a new detection revives it
        assert_eq!(ctl.step(sample(8, 0.5, 0.5, 0.0), 1.0, 1.3).phase, LandingPhase::Servoing);
    }

    #[test]
    fn out_of_range_ascend_interval_is_not_fatal() {
        for interval in [-0.5, f64::NAN] {
            let params = LandingParams { ascend_interval_s: interval, ..LandingParams::default() };
            let mut ctl = LandingController::new(params, 0.0);
            let step = ctl.step(None, 1.0, 0.1);
            assert_eq!(step.phase, LandingPhase::Searching);
            assert!(step.commands.len() <= 1);
        }
    }
}
