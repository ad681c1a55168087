pub mod command;
pub mod telemetry;

pub use command::{AttitudeCommand, Command, VelocityCommand};
pub use telemetry::{MarkerObservation, MarkerPose, PositionFix, Telemetry, Waypoint};
