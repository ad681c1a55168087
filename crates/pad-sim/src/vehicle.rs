//! Kinematic point-mass vehicle.
//!
//! Horizontal motion is heading-locked: body `vx` moves the vehicle along +y
//! and body `vy` along -x, whatever the compass says. Heading is compass
//! convention (clockwise positive) while yaw demands are counter-clockwise
//! positive, so a positive demand lowers the heading. The attitude yaw demand
//! is flown as a yaw rate.

use std::sync::Arc;

use anyhow::Result;
use pad_fc::actuation::Actuator;
use pad_proto::{AttitudeCommand, VelocityCommand};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::SimConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub x: f64,
    pub y: f64,
    pub alt: f64,
    pub heading_deg: f64,
    pub velocity: VelocityCommand,
    pub yaw_demand: f64,
    pub landed: bool,
    pub land_calls: u32,
    pub commands: u64,
}

impl SimState {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            x: cfg.start_x,
            y: cfg.start_y,
            alt: cfg.start_alt_m,
            heading_deg: cfg.start_heading_deg,
            velocity: VelocityCommand::ZERO,
            yaw_demand: 0.0,
            landed: false,
            land_calls: 0,
            commands: 0,
        }
    }

    /// Advance by `dt` seconds.
    pub fn integrate(&mut self, dt: f64) {
        if self.landed {
            return;
        }
        let v = self.velocity;
        self.x += -v.vy * dt;
        self.y += v.vx * dt;
        self.alt = (self.alt + v.vz * dt).max(0.0);
        let yaw_rate = self.yaw_demand + v.yaw_rate;
        self.heading_deg = (self.heading_deg - yaw_rate.to_degrees() * dt).rem_euclid(360.0);
    }
}

pub type SharedState = Arc<Mutex<SimState>>;

/// Actuator side of the simulator.
#[derive(Debug, Clone)]
pub struct SimActuator {
    state: SharedState,
    land_rejections: u32,
    max_land_alt_m: f64,
}

impl SimActuator {
    pub(crate) fn new(state: SharedState, cfg: &SimConfig) -> Self {
        Self { state, land_rejections: cfg.land_rejections, max_land_alt_m: cfg.max_land_alt_m }
    }
}

impl Actuator for SimActuator {
    fn send_velocity(&mut self, cmd: VelocityCommand) -> Result<()> {
        let mut st = self.state.lock();
        st.velocity = cmd;
        st.commands += 1;
        Ok(())
    }

    fn send_attitude(&mut self, cmd: AttitudeCommand) -> Result<()> {
        let mut st = self.state.lock();
        st.yaw_demand = cmd.yaw;
        st.commands += 1;
        Ok(())
    }

    fn set_zero_velocity(&mut self) -> Result<()> {
        let mut st = self.state.lock();
        st.velocity = VelocityCommand::ZERO;
        st.yaw_demand = 0.0;
        st.commands += 1;
        Ok(())
    }

    fn land(&mut self) -> Result<bool> {
        let mut st = self.state.lock();
        st.land_calls += 1;
        if st.land_calls <= self.land_rejections || st.alt > self.max_land_alt_m {
            debug!("sim: land rejected (call {}, alt {:.2})", st.land_calls, st.alt);
            return Ok(false);
        }
        st.landed = true;
        st.alt = 0.0;
        st.velocity = VelocityCommand::ZERO;
        st.yaw_demand = 0.0;
        info!("sim: touchdown at ({:.3}, {:.3})", st.x, st.y);
        Ok(true)
    }
}
