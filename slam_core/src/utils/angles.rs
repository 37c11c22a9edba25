// slam_core/src/utils/angles.rs

use std::f64::consts::{PI, TAU};

/// Wraps any angle into the canonical range `(-π, π]`.
///
/// Angles already inside the range are returned bit-for-bit unchanged, which
/// makes the function exactly idempotent. Non-finite input is passed through.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }

    // rem_euclid lands in [0, TAU], the upper end only through rounding.
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else if wrapped > PI {
        PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_angle_keeps_in_range_values() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(1.0), 1.0);
        assert_eq!(normalize_angle(PI), PI);
    }

    #[test]
    fn test_normalize_angle_maps_negative_pi_to_pi() {
        assert_abs_diff_eq!(normalize_angle(-PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_angle_wraps_multiple_turns() {
        assert_abs_diff_eq!(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(normalize_angle(10.0 * TAU + 0.25), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_angle_passes_nan_through() {
        assert!(normalize_angle(f64::NAN).is_nan());
    }

    proptest! {
        #[test]
        fn prop_normalize_angle_in_range(theta in -1.0e4f64..1.0e4) {
            let wrapped = normalize_angle(theta);
            prop_assert!(wrapped > -PI && wrapped <= PI, "{} -> {}", theta, wrapped);
        }

        #[test]
        fn prop_normalize_angle_idempotent(theta in -1.0e4f64..1.0e4) {
            let once = normalize_angle(theta);
            prop_assert_eq!(normalize_angle(once), once);
        }

        #[test]
        fn prop_normalize_angle_preserves_direction(theta in -1.0e3f64..1.0e3) {
            let wrapped = normalize_angle(theta);
            prop_assert!((wrapped.sin() - theta.sin()).abs() < 1e-9);
            prop_assert!((wrapped.cos() - theta.cos()).abs() < 1e-9);
        }
    }
}
