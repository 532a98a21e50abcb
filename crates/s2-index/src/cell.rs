//! Cube-face quadtree cells.

use glam::DVec3;

use crate::angle::ChordAngle;
use crate::cap::Cap;
use crate::edge_distances::{update_edge_pair_min_distance, update_min_distance};
use crate::projection::{face_uv_to_point, point_to_face_uv, st_to_uv, uv_to_st, NUM_FACES};

/// Deepest subdivision level. Leaf cells are about 1cm across on Earth.
pub const MAX_LEVEL: u8 = 30;

/// Extra squared chord length added to cell cap bounds to absorb rounding.
const CAP_BOUND_EPS_LENGTH2: f64 = 1e-14;

/// Identifies one cell of the per-face quadtree.
///
/// At `level`, a face is split into `2^level x 2^level` cells in ST space;
/// `(i, j)` are the cell's column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    face: u8,
    level: u8,
    i: u32,
    j: u32,
}

impl CellId {
    pub fn new(face: usize, level: u8, i: u32, j: u32) -> Self {
        assert!(face < NUM_FACES, "invalid face {}", face);
        assert!(level <= MAX_LEVEL, "invalid level {}", level);
        let size = 1u64 << level;
        assert!(
            (i as u64) < size && (j as u64) < size,
            "cell ({}, {}) out of range at level {}",
            i,
            j,
            level
        );
        Self {
            face: face as u8,
            level,
            i,
            j,
        }
    }

    pub fn from_face(face: usize) -> Self {
        Self::new(face, 0, 0, 0)
    }

    /// Leaf cell containing `p`.
    pub fn from_point(p: DVec3) -> Self {
        let (face, u, v) = point_to_face_uv(p);
        let size = 1u64 << MAX_LEVEL;
        let to_ij = |st: f64| ((st * size as f64).max(0.0) as u64).min(size - 1) as u32;
        Self {
            face: face as u8,
            level: MAX_LEVEL,
            i: to_ij(uv_to_st(u)),
            j: to_ij(uv_to_st(v)),
        }
    }

    #[inline]
    pub fn face(self) -> usize {
        self.face as usize
    }

    #[inline]
    pub fn level(self) -> u8 {
        self.level
    }

    #[inline]
    pub fn ij(self) -> (u32, u32) {
        (self.i, self.j)
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        self.level == MAX_LEVEL
    }

    #[inline]
    pub fn is_face(self) -> bool {
        self.level == 0
    }

    /// Ancestor at `level`.
    pub fn parent(self, level: u8) -> CellId {
        assert!(level <= self.level, "parent level {} below {}", level, self.level);
        let shift = self.level - level;
        CellId {
            face: self.face,
            level,
            i: self.i >> shift,
            j: self.j >> shift,
        }
    }

    /// Child `k` in `0..4`: bit 0 selects the column, bit 1 the row.
    pub fn child(self, k: usize) -> CellId {
        assert!(!self.is_leaf(), "leaf cells have no children");
        debug_assert!(k < 4);
        CellId {
            face: self.face,
            level: self.level + 1,
            i: (self.i << 1) | (k as u32 & 1),
            j: (self.j << 1) | ((k as u32 >> 1) & 1),
        }
    }

    pub fn children(self) -> [CellId; 4] {
        [self.child(0), self.child(1), self.child(2), self.child(3)]
    }

    /// Position (`0..4`) within its parent of this cell's ancestor at `level`.
    pub fn child_position(self, level: u8) -> usize {
        debug_assert!(level >= 1 && level <= self.level);
        let shift = self.level - level;
        let bi = (self.i >> shift) & 1;
        let bj = (self.j >> shift) & 1;
        (bi | (bj << 1)) as usize
    }

    pub fn contains(self, other: CellId) -> bool {
        self.face == other.face
            && other.level >= self.level
            && other.parent(self.level) == self
    }

    /// ST bounds `(s0, s1, t0, t1)`.
    pub fn st_bounds(self) -> (f64, f64, f64, f64) {
        let size = (1u64 << self.level) as f64;
        (
            self.i as f64 / size,
            (self.i + 1) as f64 / size,
            self.j as f64 / size,
            (self.j + 1) as f64 / size,
        )
    }

    /// UV bounds `(u0, u1, v0, v1)`.
    pub fn uv_bounds(self) -> (f64, f64, f64, f64) {
        let (s0, s1, t0, t1) = self.st_bounds();
        (st_to_uv(s0), st_to_uv(s1), st_to_uv(t0), st_to_uv(t1))
    }

    /// Unit vector at the center of the cell in ST space.
    pub fn center_point(self) -> DVec3 {
        let (s0, s1, t0, t1) = self.st_bounds();
        face_uv_to_point(
            self.face(),
            st_to_uv((s0 + s1) * 0.5),
            st_to_uv((t0 + t1) * 0.5),
        )
    }
}

/// Geometry of a cell: a geodesic quadrilateral on one cube face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    id: CellId,
    uv: (f64, f64, f64, f64),
    /// (u0,v0), (u1,v0), (u1,v1), (u0,v1)
    vertices: [DVec3; 4],
}

impl From<CellId> for Cell {
    fn from(id: CellId) -> Self {
        Cell::new(id)
    }
}

impl Cell {
    pub fn new(id: CellId) -> Self {
        let uv = id.uv_bounds();
        let (u0, u1, v0, v1) = uv;
        let face = id.face();
        let vertices = [
            face_uv_to_point(face, u0, v0),
            face_uv_to_point(face, u1, v0),
            face_uv_to_point(face, u1, v1),
            face_uv_to_point(face, u0, v1),
        ];
        Self { id, uv, vertices }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    #[inline]
    pub fn vertex(&self, k: usize) -> DVec3 {
        self.vertices[k & 3]
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec3; 4] {
        &self.vertices
    }

    pub fn center(&self) -> DVec3 {
        self.id.center_point()
    }

    pub fn contains(&self, p: DVec3) -> bool {
        let (face, u, v) = point_to_face_uv(p);
        if face != self.id.face() {
            return false;
        }
        let (u0, u1, v0, v1) = self.uv;
        u >= u0 && u <= u1 && v >= v0 && v <= v1
    }

    /// Cap bounding the cell.
    pub fn cap_bound(&self) -> Cap {
        let center = self.center();
        let max_length2 = self
            .vertices
            .iter()
            .map(|&v| (center - v).length_squared())
            .fold(0.0f64, f64::max);
        Cap::new(
            center,
            ChordAngle::from_length2(max_length2 + CAP_BOUND_EPS_LENGTH2),
        )
    }

    /// Distance from `p` to the closest point of the cell (zero if inside).
    pub fn distance(&self, p: DVec3) -> ChordAngle {
        if self.contains(p) {
            return ChordAngle::zero();
        }
        let mut min_dist = ChordAngle::infinity();
        for k in 0..4 {
            update_min_distance(p, self.vertex(k), self.vertex(k + 1), &mut min_dist);
        }
        min_dist
    }

    /// Distance from the edge `ab` to the closest point of the cell.
    pub fn distance_to_edge(&self, a: DVec3, b: DVec3) -> ChordAngle {
        if self.contains(a) || self.contains(b) {
            return ChordAngle::zero();
        }
        let mut min_dist = ChordAngle::infinity();
        for k in 0..4 {
            update_edge_pair_min_distance(a, b, self.vertex(k), self.vertex(k + 1), &mut min_dist);
        }
        min_dist
    }

    /// Distance between the closest points of two cells.
    pub fn distance_to_cell(&self, other: &Cell) -> ChordAngle {
        if self.id.face() == other.id.face() && intervals_overlap(self.uv, other.uv) {
            return ChordAngle::zero();
        }
        let mut min_dist = ChordAngle::infinity();
        for k in 0..4 {
            for l in 0..4 {
                update_edge_pair_min_distance(
                    self.vertex(k),
                    self.vertex(k + 1),
                    other.vertex(l),
                    other.vertex(l + 1),
                    &mut min_dist,
                );
            }
        }
        min_dist
    }
}

#[inline]
fn intervals_overlap(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1 && a.2 <= b.3 && b.2 <= a.3
}
