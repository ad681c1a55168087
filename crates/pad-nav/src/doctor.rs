use anyhow::Result;
use pad_fc::FcConfig;

use crate::config::{LandingParams, NavParams};

pub fn check_loop(fc: &FcConfig) -> Result<()> {
    anyhow::ensure!(fc.loop_hz >= 5.0 && fc.loop_hz <= 500.0, "fc.loop_hz should be 5..500");
    if let Some(t) = fc.maneuver_timeout_s {
        anyhow::ensure!(t > 0.0, "fc.maneuver_timeout_s must be positive");
    }
    if let Some(n) = fc.land_max_attempts {
        anyhow::ensure!(n >= 1, "fc.land_max_attempts must be >= 1");
    }
    Ok(())
}

pub fn check_landing(p: &LandingParams) -> Result<()> {
    anyhow::ensure!(p.lowest_visible_alt_m > 0.0, "landing.lowest_visible_alt_m must be positive");
    anyhow::ensure!(p.max_horizontal_speed > 0.0 && p.max_horizontal_speed <= 2.0, "landing.max_horizontal_speed out of range");
    anyhow::ensure!(p.max_yaw_rate_deg > 0.0 && p.max_yaw_rate_deg <= 90.0, "landing.max_yaw_rate_deg out of range");
    anyhow::ensure!(p.descent_rate > 0.0 && p.descent_rate <= 1.0, "landing.descent_rate out of range");
    anyhow::ensure!(p.align_radius_m > 0.0, "landing.align_radius_m must be positive");
    anyhow::ensure!(p.yaw_tolerance_deg > 0.0 && p.yaw_tolerance_deg < 180.0, "landing.yaw_tolerance_deg out of range");
    anyhow::ensure!(p.search_ceiling_m > p.lowest_visible_alt_m, "landing.search_ceiling_m must be above the visibility floor");
    anyhow::ensure!(p.ascend_rate > 0.0, "landing.ascend_rate must be positive");
    // the nudge spacing assumes several loop iterations per interval
    anyhow::ensure!(p.ascend_interval_s >= 0.1, "landing.ascend_interval_s too short");
    if let Some(t) = p.marker_timeout_s {
        anyhow::ensure!(t > 0.0, "landing.marker_timeout_s must be positive");
    }
    Ok(())
}

pub fn check_nav(p: &NavParams) -> Result<()> {
    anyhow::ensure!(p.max_speed > 0.0 && p.max_speed <= 5.0, "nav.max_speed out of range");
    anyhow::ensure!(p.max_yaw_rate_deg > 0.0 && p.max_yaw_rate_deg <= 90.0, "nav.max_yaw_rate_deg out of range");
    anyhow::ensure!(p.arrival_radius_m > 0.0, "nav.arrival_radius_m must be positive");
    Ok(())
}
