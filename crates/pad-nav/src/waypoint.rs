use pad_proto::{AttitudeCommand, Command, Telemetry, VelocityCommand, Waypoint};
use time::OffsetDateTime;

use crate::angle::{clamp_sym, shortest_turn_deg, yaw_command};
use crate::config::NavParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Navigating,
    /// Position fix unchanged since the last processed one. Nothing issued.
    Stale,
    Arrived,
}

#[derive(Debug, Clone)]
pub struct NavOutput {
    pub state: NavState,
    pub commands: Vec<Command>,
    pub message: String,
}

/// Straight-line convergence onto a 2-D waypoint from dead-reckoned position
/// and compass heading.
#[derive(Debug, Clone)]
pub struct WaypointController {
    params: NavParams,
    target: Waypoint,
    last_fix: Option<OffsetDateTime>,
}

impl WaypointController {
    /// `current_fix` is the position timestamp at the start of the call. It
    /// counts as already processed, so the first command waits for a new fix.
    pub fn new(params: NavParams, target: Waypoint, current_fix: Option<OffsetDateTime>) -> Self {
        Self { params, target, last_fix: current_fix }
    }

    pub fn arrived(&self, telem: &Telemetry) -> bool {
        let r = self.params.arrival_radius_m;
        (telem.position.x - self.target.x).abs() < r && (telem.position.y - self.target.y).abs() < r
    }

    pub fn step(&mut self, telem: &Telemetry) -> NavOutput {
        let pos = telem.position;
        if self.arrived(telem) {
            return NavOutput {
                state: NavState::Arrived,
                commands: vec![Command::ZeroVelocity],
                message: format!("ARRIVED at ({:.2}, {:.2})", pos.x, pos.y),
            };
        }
        if self.last_fix == Some(pos.ts) {
            return NavOutput { state: NavState::Stale, commands: Vec::new(), message: "STALE fix".into() };
        }
        self.last_fix = Some(pos.ts);

        let x_diff = self.target.x - pos.x;
        let y_diff = self.target.y - pos.y;
        let bearing = y_diff.atan2(x_diff).to_degrees();
        let rotate = 90.0 - bearing - telem.compass_heading + self.target.yaw_offset;
        let turn = shortest_turn_deg(rotate);
        let move_yaw = yaw_command(turn, self.params.max_yaw_rate_rad());

        let move_x = clamp_sym(y_diff, self.params.max_speed);
        let move_y = clamp_sym(-x_diff, self.params.max_speed);

        NavOutput {
            state: NavState::Navigating,
            commands: vec![
                Command::Attitude(AttitudeCommand::yaw_only(move_yaw)),
                Command::Velocity(VelocityCommand::new(move_x, move_y, 0.0, 0.0)),
            ],
            message: format!(
                "NAV dx={:.2} dy={:.2} turn={:.1} move=({:.2}, {:.2}) yaw={:.3}",
                x_diff, y_diff, turn, move_x, move_y, move_yaw
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pad_proto::PositionFix;

    fn fix(x: f64, y: f64, ms: i64) -> Telemetry {
        Telemetry {
            rangefinder_alt: 1.0,
            compass_heading: 0.0,
            position: PositionFix { x, y, ts: OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(ms) },
        }
    }

    fn target(x: f64, y: f64) -> Waypoint {
        Waypoint { x, y, z: 0.0, yaw_offset: 0.0 }
    }

    #[test]
    fn first_fix_is_treated_as_seen() {
        let t0 = fix(0.0, 0.0, 0);
        let mut ctl = WaypointController::new(NavParams::default(), target(10.0, 10.0), Some(t0.position.ts));
        let out = ctl.step(&t0);
        assert_eq!(out.state, NavState::Stale);
        assert!(out.commands.is_empty());
        assert_eq!(ctl.step(&fix(0.0, 0.0, 100)).state, NavState::Navigating);
    }

    #[test]
    fn scenario_d_frozen_timestamp_never_moves() {
        let t0 = fix(0.0, 0.0, 5);
        let mut ctl = WaypointController::new(NavParams::default(), target(10.0, 10.0), Some(t0.position.ts));
        for _ in 0..1000 {
            let out = ctl.step(&t0);
            assert_eq!(out.state, NavState::Stale);
            assert!(out.commands.is_empty());
        }
    }

    #[test]
    fn horizontal_demand_is_bounded() {
        let params = NavParams::default();
        let mut ms = 0;
        for tx in [-1000.0, -3.0, -0.31, 0.0, 0.29, 7.5, 1e6] {
            for ty in [-1e6, -0.6, 0.0, 0.45, 12.0] {
                for heading in [0.0, 45.0, 200.0, 359.0] {
                    let mut ctl = WaypointController::new(params.clone(), target(tx, ty), None);
                    ms += 1;
                    let mut t = fix(0.0, 0.0, ms);
                    t.compass_heading = heading;
                    let out = ctl.step(&t);
                    for c in &out.commands {
                        match c {
                            Command::Velocity(v) => {
                                assert!(v.vx.abs() <= params.max_speed);
                                assert!(v.vy.abs() <= params.max_speed);
                            }
                            Command::Attitude(a) => assert!(a.yaw.abs() <= params.max_yaw_rate_rad()),
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn velocity_mapping_is_axis_swapped() {
        let mut ctl = WaypointController::new(NavParams::default(), target(0.2, -0.1), None);
        let out = ctl.step(&fix(0.0, 0.0, 1));
        // arrival is per axis: 0.2/0.1 are inside the radius
        assert_eq!(out.state, NavState::Arrived);
        assert_eq!(out.commands, vec![Command::ZeroVelocity]);

        let mut ctl = WaypointController::new(NavParams::default(), target(0.2, -1.0), None);
        let out = ctl.step(&fix(0.0, 0.0, 1));
        let v = out.commands.iter().find_map(|c| c.velocity()).copied().unwrap();
        assert!((v.vx - -0.3).abs() < 1e-12);
        assert!((v.vy - -0.2).abs() < 1e-12);
        assert_eq!(v.vz, 0.0);
    }

    #[test]
    fn heading_aligned_with_bearing_needs_no_turn() {
        // target due +y: bearing 90, so a zero heading leaves nothing to rotate
        let mut ctl = WaypointController::new(NavParams::default(), target(0.0, 5.0), None);
        let out = ctl.step(&fix(0.0, 0.0, 1));
        let Command::Attitude(a) = out.commands[0] else { panic!("expected attitude first") };
        assert!(a.yaw.abs() < 1e-12);

        let mut ctl = WaypointController::new(
            NavParams::default(),
            Waypoint { x: 0.0, y: 5.0, z: 0.0, yaw_offset: 30.0 },
            None,
        );
        let out = ctl.step(&fix(0.0, 0.0, 1));
        let Command::Attitude(a) = out.commands[0] else { panic!("expected attitude first") };
        assert_eq!(a.yaw, -15f64.to_radians());
    }

    #[test]
    fn scenario_c_converges_when_fixes_advance() {
        let mut ctl = WaypointController::new(NavParams::default(), target(10.0, 10.0), None);
        let (mut x, mut y) = (0.0, 0.0);
        let dt = 0.1;
        let mut arrived_at = None;
        for i in 0..10_000 {
            let out = ctl.step(&fix(x, y, i));
            if out.state == NavState::Arrived {
                assert_eq!(out.commands, vec![Command::ZeroVelocity]);
                arrived_at = Some(i);
                break;
            }
            let v = out.commands.iter().find_map(|c| c.velocity()).copied().unwrap();
            // body vx maps to +y, body vy to -x
            x += -v.vy * dt;
            y += v.vx * dt;
        }
        assert!(arrived_at.is_some());
        assert!((x - 10.0).abs() < 0.5 && (y - 10.0).abs() < 0.5);
    }
}
