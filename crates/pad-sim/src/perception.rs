use pad_proto::MarkerObservation;
use rand::Rng;

use crate::vehicle::SimState;
use crate::SimConfig;

/// What the downward camera reports for the current state.
///
/// Out of view (outside the camera cone, below the minimum visible
/// altitude, on the ground, or a random dropout) yields an observation with
/// every pose field empty.
pub fn observe<R: Rng>(st: &SimState, cfg: &SimConfig, rng: &mut R) -> MarkerObservation {
    let rel_x = cfg.marker_x - st.x;
    let rel_y = st.y - cfg.marker_y;
    let reach = st.alt * cfg.camera_half_fov_deg.to_radians().tan();

    let dropped = cfg.dropout > 0.0 && rng.gen_bool(cfg.dropout.min(1.0));
    let visible = !st.landed && st.alt >= cfg.min_visible_alt_m && rel_x.hypot(rel_y) <= reach && !dropped;
    if !visible {
        return MarkerObservation { id: cfg.marker_id, ..MarkerObservation::default() };
    }

    let yaw = (cfg.marker_heading_deg - st.heading_deg + jitter(rng, cfg.yaw_noise_deg)).rem_euclid(360.0);
    MarkerObservation::new(
        cfg.marker_id,
        rel_x + jitter(rng, cfg.pose_noise_m),
        rel_y + jitter(rng, cfg.pose_noise_m),
        st.alt,
        yaw,
    )
}

/// Uniform noise in `[-spread, spread]`. Zero for a spread that is not a
/// positive finite number.
fn jitter<R: Rng>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 && spread.is_finite() {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}
