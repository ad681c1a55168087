use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Marker pose relative to the vehicle body frame, as reported by perception.
///
/// Distances are meters, angles degrees. Any pose field may be missing when
/// the detector could not resolve it for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerObservation {
    pub id: i32,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub yaw: Option<f64>,
    // carried for completeness, unused by the controllers
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
}

/// The subset of an observation the landing loop can act on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw_deg: f64,
}

impl MarkerObservation {
    pub fn new(id: i32, x: f64, y: f64, z: f64, yaw_deg: f64) -> Self {
        Self {
            id,
            x: Some(x),
            y: Some(y),
            z: Some(z),
            yaw: Some(yaw_deg),
            roll: None,
            pitch: None,
        }
    }

    /// Returns the pose only when x, y, z and yaw are all present and finite.
    pub fn pose(&self) -> Option<MarkerPose> {
        let pose = MarkerPose {
            x: self.x?,
            y: self.y?,
            z: self.z?,
            yaw_deg: self.yaw?,
        };
        let finite = pose.x.is_finite() && pose.y.is_finite() && pose.z.is_finite() && pose.yaw_deg.is_finite();
        finite.then_some(pose)
    }
}

impl MarkerPose {
    /// Planar distance to the marker, the landing convergence metric.
    pub fn planar_distance(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub x: f64,
    pub y: f64,
    pub ts: OffsetDateTime,
}

impl Default for PositionFix {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, ts: OffsetDateTime::UNIX_EPOCH }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    /// Downward rangefinder distance, meters.
    pub rangefinder_alt: f64,
    /// Compass heading, degrees.
    pub compass_heading: f64,
    pub position: PositionFix,
}

/// Navigation target. `z` is carried through to reports; the navigation loop
/// holds altitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Beacon frame orientation offset, degrees.
    pub yaw_offset: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_requires_all_fields() {
        let full = MarkerObservation::new(7, 0.1, -0.2, 1.0, 3.0);
        assert!(full.pose().is_some());

        let mut missing_yaw = full;
        missing_yaw.yaw = None;
        assert!(missing_yaw.pose().is_none());

        let mut missing_z = full;
        missing_z.z = None;
        assert!(missing_z.pose().is_none());
    }

    #[test]
    fn pose_rejects_non_finite() {
        let mut obs = MarkerObservation::new(1, 0.0, 0.0, 1.0, 0.0);
        obs.x = Some(f64::NAN);
        assert!(obs.pose().is_none());
        obs.x = Some(0.0);
        obs.yaw = Some(f64::INFINITY);
        assert!(obs.pose().is_none());
    }

    #[test]
    fn roll_and_pitch_are_optional() {
        let obs = MarkerObservation::new(1, 0.3, 0.4, 1.0, 0.0);
        assert_eq!(obs.roll, None);
        let pose = obs.pose().unwrap();
        assert!((pose.planar_distance() - 0.5).abs() < 1e-12);
    }
}
