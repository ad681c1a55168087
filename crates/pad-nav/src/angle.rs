//! Heading arithmetic.
//!
//! Every comparison happens in degrees, wrapped to `[0, 360)` and then folded
//! to a signed shortest turn. Radians only appear at the command boundary
//! ([`yaw_command`]). Tolerance windows are defined in whole degrees and a
//! radian round trip would move their edges.

/// Wrap any angle into `[0, 360)`.
pub fn wrap_deg(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if w >= 360.0 { 0.0 } else { w }
}

/// Signed shortest rotation for a bearing difference, in `(-180, 180]`.
pub fn shortest_turn_deg(deg: f64) -> f64 {
    let w = wrap_deg(deg);
    if 360.0 - w < w { w - 360.0 } else { w }
}

/// True when `deg` lies in `[0, tol) ∪ (360 - tol, 360)` after wrapping.
pub fn within_deg(deg: f64, tol_deg: f64) -> bool {
    shortest_turn_deg(deg).abs() < tol_deg
}

/// Turn a signed correction into a bounded yaw demand in radians.
///
/// The demand opposes the measured offset, hence the sign flip.
pub fn yaw_command(turn_deg: f64, max_rate_rad: f64) -> f64 {
    (-turn_deg.to_radians()).clamp(-max_rate_rad, max_rate_rad)
}

pub fn clamp_sym(v: f64, limit: f64) -> f64 {
    v.clamp(-limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_negative_and_large() {
        assert_eq!(wrap_deg(-10.0), 350.0);
        assert_eq!(wrap_deg(720.0), 0.0);
        assert_eq!(wrap_deg(365.0), 5.0);
        assert!(wrap_deg(-1e-20) < 360.0);
    }

    #[test]
    fn shortest_turn_folds() {
        assert_eq!(shortest_turn_deg(10.0), 10.0);
        assert_eq!(shortest_turn_deg(350.0), -10.0);
        assert_eq!(shortest_turn_deg(180.0), 180.0);
        assert_eq!(shortest_turn_deg(181.0), -179.0);
        assert_eq!(shortest_turn_deg(-500.0), -140.0);
    }

    #[test]
    fn shortest_turn_is_at_most_half_circle() {
        let mut y = 0.0;
        while y < 360.0 {
            assert!(shortest_turn_deg(y).abs() <= 180.0, "yaw {y}");
            y += 0.25;
        }
        for y in [-1234.5, -360.0, -0.001, 359.999, 1e6] {
            assert!(shortest_turn_deg(y).abs() <= 180.0, "yaw {y}");
        }
    }

    #[test]
    fn tolerance_window_edges() {
        assert!(within_deg(0.0, 5.0));
        assert!(within_deg(4.999, 5.0));
        assert!(!within_deg(5.0, 5.0));
        assert!(!within_deg(355.0, 5.0));
        assert!(within_deg(355.001, 5.0));
        assert!(within_deg(359.9, 5.0));
        assert!(!within_deg(180.0, 5.0));
    }

    #[test]
    fn yaw_command_direction_and_bound() {
        let max = 15f64.to_radians();
        // marker turned left of the nose: rotate back
        assert!((yaw_command(10.0, max) - -10f64.to_radians()).abs() < 1e-12);
        assert!((yaw_command(-10.0, max) - 10f64.to_radians()).abs() < 1e-12);
        assert_eq!(yaw_command(170.0, max), -max);
        assert_eq!(yaw_command(-90.0, max), max);
    }
}
