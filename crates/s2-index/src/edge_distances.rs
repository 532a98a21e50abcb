//! Distances between points and geodesic edges.
//!
//! All `update_*` functions follow the same contract: they tighten `min_dist`
//! only when the true distance is strictly smaller, and report whether they did.

use glam::DVec3;

use crate::angle::ChordAngle;
use crate::predicates::edges_cross;

/// Twice the cross product of `a` and `b`, computed as `(b + a) x (b - a)`.
///
/// Stays accurate when `a` and `b` are nearly identical.
#[inline]
pub fn robust_cross_prod(a: DVec3, b: DVec3) -> DVec3 {
    (b + a).cross(b - a)
}

/// Interior case of the point/edge distance. Returns `false` when the closest
/// point of the great circle through `ab` is not interior to the edge, or when
/// it does not beat `min_dist`.
fn update_min_interior_distance(
    x: DVec3,
    a: DVec3,
    b: DVec3,
    xa2: f64,
    xb2: f64,
    min_dist: &mut ChordAngle,
) -> bool {
    // Planar triangle ABX: both angles at A and B must be acute for the closest
    // point to be interior. The planar angles are smaller than the spherical ones,
    // so this test is conservative.
    let is_interior = xa2.max(xb2) < xa2.min(xb2) + (a - b).length_squared();
    if !is_interior {
        return false;
    }

    let c = robust_cross_prod(a, b);
    let c2 = c.length_squared();
    let x_dot_c = x.dot(c);
    let x_dot_c2 = x_dot_c * x_dot_c;
    if x_dot_c2 > c2 * min_dist.length2() {
        // Closest point on the great circle is already too far away.
        return false;
    }

    // Exact wedge test: X must lie between the planes through C and A, C and B.
    let cx = c.cross(x);
    if (a - x).dot(cx) >= 0.0 || (b - x).dot(cx) <= 0.0 {
        return false;
    }

    // XR^2 = XQ^2 + QR^2, where Q is the projection of X onto the plane of AB
    // and R the closest point on the sphere.
    let qr = 1.0 - (cx.length_squared() / c2).sqrt();
    let dist2 = x_dot_c2 / c2 + qr * qr;
    if dist2 >= min_dist.length2() {
        return false;
    }
    *min_dist = ChordAngle::from_length2(dist2);
    true
}

/// Tighten `min_dist` to the distance from `x` to the edge `ab` if that is
/// smaller.
pub fn update_min_distance(x: DVec3, a: DVec3, b: DVec3, min_dist: &mut ChordAngle) -> bool {
    let xa2 = (x - a).length_squared();
    let xb2 = (x - b).length_squared();
    if update_min_interior_distance(x, a, b, xa2, xb2, min_dist) {
        return true;
    }
    // Otherwise the minimum is attained at one of the endpoints.
    let dist2 = xa2.min(xb2);
    if dist2 >= min_dist.length2() {
        return false;
    }
    *min_dist = ChordAngle::from_length2(dist2);
    true
}

/// Distance from `x` to the edge `ab`.
pub fn get_distance(x: DVec3, a: DVec3, b: DVec3) -> ChordAngle {
    let mut min_dist = ChordAngle::infinity();
    update_min_distance(x, a, b, &mut min_dist);
    min_dist
}

/// Tighten `min_dist` to the minimum distance between edges `a0a1` and `b0b1`.
pub fn update_edge_pair_min_distance(
    a0: DVec3,
    a1: DVec3,
    b0: DVec3,
    b1: DVec3,
    min_dist: &mut ChordAngle,
) -> bool {
    if min_dist.is_zero() {
        return false;
    }
    if edges_cross(a0, a1, b0, b1) {
        *min_dist = ChordAngle::zero();
        return true;
    }
    // Non-crossing edges attain their minimum at an endpoint of at least one of
    // them. Bitwise `|` so every case is evaluated.
    update_min_distance(a0, b0, b1, min_dist)
        | update_min_distance(a1, b0, b1, min_dist)
        | update_min_distance(b0, a0, a1, min_dist)
        | update_min_distance(b1, a0, a1, min_dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LatLng;

    fn ll(lat: f64, lng: f64) -> DVec3 {
        LatLng::from_degrees(lat, lng).to_point()
    }

    fn assert_degrees(actual: ChordAngle, expected: f64) {
        assert!(
            (actual.degrees() - expected).abs() < 1e-9,
            "expected {} degrees, got {}",
            expected,
            actual.degrees()
        );
    }

    #[test]
    fn test_interior_distance() {
        assert_degrees(get_distance(ll(10.0, 0.0), ll(0.0, -20.0), ll(0.0, 20.0)), 10.0);
        assert_degrees(get_distance(ll(-3.0, 5.0), ll(0.0, -20.0), ll(0.0, 20.0)), 3.0);
    }

    #[test]
    fn test_endpoint_distance() {
        assert_degrees(get_distance(ll(0.0, 30.0), ll(0.0, -20.0), ll(0.0, 20.0)), 10.0);
        assert_degrees(get_distance(ll(0.0, -25.0), ll(0.0, -20.0), ll(0.0, 20.0)), 5.0);
    }

    #[test]
    fn test_degenerate_edge_is_point_distance() {
        let p = ll(0.0, 0.0);
        assert_degrees(get_distance(ll(4.0, 0.0), p, p), 4.0);
        assert_eq!(get_distance(p, p, p), ChordAngle::zero());
    }

    #[test]
    fn test_update_requires_strict_improvement() {
        let x = ll(0.0, 30.0);
        let (a, b) = (ll(0.0, -20.0), ll(0.0, 20.0));
        let exact = get_distance(x, a, b);
        let mut bound = exact;
        assert!(!update_min_distance(x, a, b, &mut bound));
        let mut bound = ChordAngle::infinity();
        assert!(update_min_distance(x, a, b, &mut bound));
        assert_eq!(bound, exact);
        let mut bound = ChordAngle::from_degrees(1.0);
        assert!(!update_min_distance(x, a, b, &mut bound));
        assert_degrees(bound, 1.0);
    }

    #[test]
    fn test_edge_pair_distance() {
        let mut d = ChordAngle::infinity();
        assert!(update_edge_pair_min_distance(
            ll(0.0, -10.0),
            ll(0.0, 10.0),
            ll(-10.0, 0.0),
            ll(10.0, 0.0),
            &mut d
        ));
        assert_eq!(d, ChordAngle::zero());

        let mut d = ChordAngle::infinity();
        update_edge_pair_min_distance(
            ll(0.0, -10.0),
            ll(0.0, 10.0),
            ll(5.0, 0.0),
            ll(20.0, 0.0),
            &mut d,
        );
        assert_degrees(d, 5.0);
    }
}
