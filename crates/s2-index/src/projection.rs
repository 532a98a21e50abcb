//! Cube-face projection of the unit sphere.
//!
//! The sphere is projected onto the 6 faces of a cube; each face has local
//! coordinates `(u, v)` in `[-1, 1]`. The S2 quadratic transform maps UV to
//! `(s, t)` in `[0, 1]` with less area distortion than the raw gnomonic
//! projection, and cells are uniform subdivisions of ST space.
//!
//! Lines of constant `u` or `v` are great circles, so every cell is a geodesic
//! quadrilateral.

use glam::DVec3;

pub const NUM_FACES: usize = 6;

/// S2 quadratic transform: UV [-1, 1] -> ST [0, 1]
#[inline]
pub fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

/// S2 inverse transform: ST [0, 1] -> UV [-1, 1]
#[inline]
pub fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
    }
}

/// Map a point on the unit sphere to (face, u, v) where u, v are in [-1, 1].
#[inline]
pub fn point_to_face_uv(p: DVec3) -> (usize, f64, f64) {
    let (x, y, z) = (p.x, p.y, p.z);
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

    if ax >= ay && ax >= az {
        // ±X
        if x >= 0.0 {
            (0, -z / ax, y / ax)
        } else {
            (1, z / ax, y / ax)
        }
    } else if ay >= ax && ay >= az {
        // ±Y
        if y >= 0.0 {
            (2, x / ay, -z / ay)
        } else {
            (3, x / ay, z / ay)
        }
    } else {
        // ±Z
        if z >= 0.0 {
            (4, x / az, y / az)
        } else {
            (5, -x / az, y / az)
        }
    }
}

/// Unnormalized cube-surface point for (face, u, v).
#[inline]
pub fn face_uv_to_xyz(face: usize, u: f64, v: f64) -> DVec3 {
    match face {
        0 => DVec3::new(1.0, v, -u),  // +X: u = -z/x, v = y/x
        1 => DVec3::new(-1.0, v, u),  // -X: u = z/|x|, v = y/|x|
        2 => DVec3::new(u, 1.0, -v),  // +Y: u = x/y, v = -z/y
        3 => DVec3::new(u, -1.0, v),  // -Y: u = x/|y|, v = z/|y|
        4 => DVec3::new(u, v, 1.0),   // +Z: u = x/z, v = y/z
        5 => DVec3::new(-u, v, -1.0), // -Z: u = -x/|z|, v = y/|z|
        _ => unreachable!("invalid cube face {}", face),
    }
}

/// Convert (face, u, v) to a point on the unit sphere (inverse of `point_to_face_uv`).
#[inline]
pub fn face_uv_to_point(face: usize, u: f64, v: f64) -> DVec3 {
    face_uv_to_xyz(face, u, v).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_st_uv_inverse() {
        for i in 0..=20 {
            let s = i as f64 / 20.0;
            let u = st_to_uv(s);
            assert!((-1.0..=1.0).contains(&u));
            assert!((uv_to_st(u) - s).abs() < 1e-15, "s={}", s);
        }
    }

    #[test]
    fn test_face_uv_round_trip() {
        for face in 0..NUM_FACES {
            for &(u, v) in &[(0.0, 0.0), (0.5, -0.25), (-0.9, 0.9), (0.99, 0.1)] {
                let p = face_uv_to_point(face, u, v);
                let (f, pu, pv) = point_to_face_uv(p);
                assert_eq!(f, face);
                assert!((pu - u).abs() < 1e-14 && (pv - v).abs() < 1e-14);
            }
        }
    }
}
