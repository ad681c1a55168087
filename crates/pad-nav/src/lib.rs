pub mod angle;
pub mod config;
pub mod doctor;
pub mod error;
pub mod landing;
pub mod maneuver;
pub mod waypoint;

pub use config::{LandingParams, NavParams};
pub use error::ManeuverError;
pub use maneuver::{LandingReport, Maneuvers, NavReport};
