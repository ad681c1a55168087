use pad_fc::pid::PidGains;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LandingGains {
    pub x: PidGains,
    pub y: PidGains,
    pub yaw: PidGains,
}

impl Default for LandingGains {
    fn default() -> Self {
        Self {
            x: PidGains::new(0.2, 0.0, 0.0),
            y: PidGains::new(0.2, 0.0, 0.0),
            yaw: PidGains::new(0.1, 0.05, 0.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LandingParams {
    /// Lowest altitude at which the marker is still in view. Descent stops here.
    pub lowest_visible_alt_m: f64,
    pub max_horizontal_speed: f64,
    pub max_yaw_rate_deg: f64,
    pub descent_rate: f64,

    /// Planar distance under which the vehicle counts as centered.
    pub align_radius_m: f64,
    pub yaw_tolerance_deg: f64,

    /// Blind-climb fallback while the marker is lost.
    pub search_ceiling_m: f64,
    pub ascend_rate: f64,
    pub ascend_interval_s: f64,

    /// Treat a marker sample that has not changed for this long as lost.
    pub marker_timeout_s: Option<f64>,

    pub gains: LandingGains,
}

impl Default for LandingParams {
    fn default() -> Self {
        Self {
            lowest_visible_alt_m: 0.7,
            max_horizontal_speed: 0.3,
            max_yaw_rate_deg: 15.0,
            descent_rate: 0.2,
            align_radius_m: 0.03,
            yaw_tolerance_deg: 5.0,
            search_ceiling_m: 3.0,
            ascend_rate: 0.2,
            ascend_interval_s: 0.5,
            marker_timeout_s: None,
            gains: LandingGains::default(),
        }
    }
}

impl LandingParams {
    pub fn max_yaw_rate_rad(&self) -> f64 {
        self.max_yaw_rate_deg.to_radians()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavParams {
    pub max_speed: f64,
    pub max_yaw_rate_deg: f64,
    /// Per-axis arrival tolerance.
    pub arrival_radius_m: f64,
}

impl Default for NavParams {
    fn default() -> Self {
        Self { max_speed: 0.3, max_yaw_rate_deg: 15.0, arrival_radius_m: 0.5 }
    }
}

impl NavParams {
    pub fn max_yaw_rate_rad(&self) -> f64 {
        self.max_yaw_rate_deg.to_radians()
    }
}
