//! Angular arithmetic, distance and line-of-sight around the reference body.
//!
//! Every body is described by its height (distance from the centre of
//! Jupiter, in km) and its angular position in degrees. Nothing here holds
//! state; the visibility graph is the only consumer of the distance and
//! occlusion tests.

use nalgebra::Vector2;

/// Radius of the reference body in km. Devices sit on its surface.
pub const RADIUS_OF_JUPITER: f64 = 69_911.0;

/// Slack allowed when a segment endpoint lies exactly on the surface.
const SURFACE_TOLERANCE: f64 = 1e-6;

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Angle swept in one tick, in degrees, by a body moving at `speed` km/min
/// at `height` km from the centre.
pub fn angular_step_degrees(speed: f64, height: f64) -> f64 {
    (speed / height).to_degrees()
}

/// Straight-line distance between two bodies (law of cosines).
pub fn distance(h1: f64, pos1: f64, h2: f64, pos2: f64) -> f64 {
    let separation = (pos1 - pos2).to_radians();
    let squared = h1 * h1 + h2 * h2 - 2.0 * h1 * h2 * separation.cos();
    squared.max(0.0).sqrt()
}

/// True iff the segment joining the two bodies stays outside the disk of
/// the reference body.
pub fn is_visible(h1: f64, pos1: f64, h2: f64, pos2: f64) -> bool {
    let a = to_cartesian(h1, pos1);
    let b = to_cartesian(h2, pos2);
    closest_approach(&a, &b) >= RADIUS_OF_JUPITER - SURFACE_TOLERANCE
}

fn to_cartesian(height: f64, degrees: f64) -> Vector2<f64> {
    let theta = degrees.to_radians();
    Vector2::new(height * theta.cos(), height * theta.sin())
}

/// Smallest distance from the body centre to any point of segment `ab`.
fn closest_approach(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return a.norm();
    }

    let t = (-a.dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ORBIT: f64 = RADIUS_OF_JUPITER + 10_000.0;

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(370.0), 10.0, epsilon = 1e-9);
        assert_relative_eq!(normalize_degrees(-10.0), 350.0, epsilon = 1e-9);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
    }

    #[test]
    fn test_distance_same_angle_is_height_difference() {
        let d = distance(ORBIT, 45.0, RADIUS_OF_JUPITER, 45.0);
        assert_relative_eq!(d, 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_distance_opposite_sides() {
        let d = distance(ORBIT, 0.0, RADIUS_OF_JUPITER, 180.0);
        assert_relative_eq!(d, ORBIT + RADIUS_OF_JUPITER, epsilon = 1e-6);
    }

    #[test]
    fn test_overhead_satellite_is_visible() {
        assert!(is_visible(ORBIT, 90.0, RADIUS_OF_JUPITER, 90.0));
        assert!(is_visible(ORBIT, 92.0, RADIUS_OF_JUPITER, 90.0));
    }

    #[test]
    fn test_far_side_is_occluded() {
        assert!(!is_visible(ORBIT, 0.0, RADIUS_OF_JUPITER, 180.0));
        assert!(!is_visible(ORBIT, 0.0, ORBIT, 180.0));
    }

    #[test]
    fn test_surface_points_cannot_see_each_other() {
        assert!(!is_visible(RADIUS_OF_JUPITER, 10.0, RADIUS_OF_JUPITER, 20.0));
    }

    #[test]
    fn test_angular_step() {
        let step = angular_step_degrees(1_000.0, ORBIT);
        assert_relative_eq!(step, (1_000.0 / ORBIT).to_degrees(), epsilon = 1e-12);
    }
}
