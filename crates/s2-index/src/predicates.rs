//! Orientation predicates for points on the unit sphere.
//!
//! `sign(a, b, c)` is the sign of `det(a, b, c) = (a x b) . c`: positive when
//! `a, b, c` are counter-clockwise as seen from outside the sphere.

use glam::DVec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Neg,
    Zero,
    Pos,
}

impl Sign {
    #[inline]
    pub fn flip(self) -> Sign {
        match self {
            Sign::Neg => Sign::Pos,
            Sign::Zero => Sign::Zero,
            Sign::Pos => Sign::Neg,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredResult {
    Certain(Sign),
    Uncertain,
}

#[inline]
fn det3_f64(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let (ax, ay, az) = (a.x, a.y, a.z);
    let (bx, by, bz) = (b.x, b.y, b.z);
    let (cx, cy, cz) = (c.x, c.y, c.z);
    ax * (by * cz - bz * cy) - ay * (bx * cz - bz * cx) + az * (bx * cy - by * cx)
}

#[inline]
fn det3_err_bound(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let aa = a.abs();
    let ab = b.abs();
    let ac = c.abs();

    // |det(a,b,c)| <= sum_i |a_i| * (|b_j||c_k| + |b_k||c_j|)
    let m = aa.x * (ab.y * ac.z + ab.z * ac.y)
        + aa.y * (ab.x * ac.z + ab.z * ac.x)
        + aa.z * (ab.x * ac.y + ab.y * ac.x);

    // Safety multiplier for floating-point rounding in the expansion.
    let k = 64.0;
    k * f64::EPSILON * m
}

/// Fast determinant sign with a static error filter.
#[inline]
pub fn triage_sign(a: DVec3, b: DVec3, c: DVec3) -> PredResult {
    let d = det3_f64(a, b, c);
    if !d.is_finite() {
        return PredResult::Uncertain;
    }
    let bound = det3_err_bound(a, b, c);
    if d > bound {
        PredResult::Certain(Sign::Pos)
    } else if d < -bound {
        PredResult::Certain(Sign::Neg)
    } else {
        PredResult::Uncertain
    }
}

/// Determinant computed from edge vectors, with the longest edge eliminated.
///
/// More accurate than [`triage_sign`] for nearly collinear points that are close
/// together.
fn stable_sign(a: DVec3, b: DVec3, c: DVec3) -> PredResult {
    let ab = b - a;
    let bc = c - b;
    let ca = a - c;
    let ab2 = ab.length_squared();
    let bc2 = bc.length_squared();
    let ca2 = ca.length_squared();

    let (det, e) = if ab2 >= bc2 && ab2 >= ca2 {
        (-ca.cross(bc).dot(c), ca2 * bc2)
    } else if bc2 >= ca2 {
        (-ab.cross(ca).dot(a), ab2 * ca2)
    } else {
        (-bc.cross(ab).dot(b), bc2 * ab2)
    };
    let max_error = 3.2321 * f64::EPSILON * e.sqrt();
    if det.abs() <= max_error {
        PredResult::Uncertain
    } else if det > 0.0 {
        PredResult::Certain(Sign::Pos)
    } else {
        PredResult::Certain(Sign::Neg)
    }
}

/// Orientation of `a, b, c`. Returns [`Sign::Zero`] when neither filter can
/// decide, which callers treat as degenerate (collinear or coincident).
pub fn sign(a: DVec3, b: DVec3, c: DVec3) -> Sign {
    match triage_sign(a, b, c) {
        PredResult::Certain(s) => s,
        PredResult::Uncertain => match stable_sign(a, b, c) {
            PredResult::Certain(s) => s,
            PredResult::Uncertain => Sign::Zero,
        },
    }
}

/// True if edges `ab` and `cd` cross at a point interior to both.
///
/// Edges that merely share a vertex, or where any three of the four points are
/// degenerate, do not count as crossing.
pub fn edges_cross(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> bool {
    let acb = sign(a, b, c).flip();
    if acb == Sign::Zero {
        return false;
    }
    if sign(a, b, d) != acb {
        return false;
    }
    if sign(c, d, b).flip() != acb {
        return false;
    }
    sign(c, d, a) == acb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_ccw() {
        assert_eq!(sign(DVec3::X, DVec3::Y, DVec3::Z), Sign::Pos);
        assert_eq!(sign(DVec3::Y, DVec3::X, DVec3::Z), Sign::Neg);
        assert_eq!(sign(DVec3::X, DVec3::X, DVec3::Z), Sign::Zero);
    }

    #[test]
    fn test_nearly_collinear_sign_is_cyclic() {
        let a = DVec3::new(1.0, 0.0, 0.0);
        let b = DVec3::new(1.0, 1e-10, 0.0).normalize();
        let c = DVec3::new(1.0, 2e-10, 1e-12).normalize();
        assert_ne!(sign(a, b, c), Sign::Zero);
        assert_eq!(sign(a, b, c), sign(b, c, a));
    }

    #[test]
    fn test_edges_cross() {
        let a = DVec3::new(1.0, -0.5, 0.0).normalize();
        let b = DVec3::new(1.0, 0.5, 0.0).normalize();
        let c = DVec3::new(1.0, 0.0, -0.5).normalize();
        let d = DVec3::new(1.0, 0.0, 0.5).normalize();
        assert!(edges_cross(a, b, c, d));
        assert!(edges_cross(c, d, a, b));
        // The antipodal copy lies on the same great circles but does not cross.
        assert!(!edges_cross(a, b, -c, -d));
        // Shared vertex is not a crossing.
        assert!(!edges_cross(a, b, b, d));
    }
}
