use serde::{Deserialize, Serialize};

/// Body-frame velocity demand. Linear rates m/s, `yaw_rate` rad/s, `vz` positive up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub yaw_rate: f64,
}

impl VelocityCommand {
    pub const ZERO: Self = Self { vx: 0.0, vy: 0.0, vz: 0.0, yaw_rate: 0.0 };

    pub fn new(vx: f64, vy: f64, vz: f64, yaw_rate: f64) -> Self {
        Self { vx, vy, vz, yaw_rate }
    }
}

/// Position/attitude demand. `yaw` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttitudeCommand {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

impl AttitudeCommand {
    /// Yaw-only demand, position fields left at zero.
    pub fn yaw_only(yaw: f64) -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, yaw }
    }
}

/// Motion demand produced by a controller step.
///
/// Landing is not a demand: it is a request with an answer and is issued
/// through the actuator by the maneuver driver only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Velocity(VelocityCommand),
    Attitude(AttitudeCommand),
    ZeroVelocity,
}

impl Command {
    pub fn velocity(&self) -> Option<&VelocityCommand> {
        match self {
            Command::Velocity(v) => Some(v),
            _ => None,
        }
    }

    /// True for anything that would move the vehicle.
    pub fn is_motion(&self) -> bool {
        match self {
            Command::Velocity(v) => *v != VelocityCommand::ZERO,
            Command::Attitude(_) => true,
            Command::ZeroVelocity => false,
        }
    }
}
