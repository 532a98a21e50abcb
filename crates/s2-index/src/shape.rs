//! Indexed geometry: point sets, polylines and polygons.

use glam::DVec3;

use crate::predicates::edges_cross;

/// Position of a shape within its [`ShapeIndex`](crate::ShapeIndex).
pub type ShapeId = u32;

/// A geodesic segment. Points are represented as degenerate edges (`v0 == v1`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub v0: DVec3,
    pub v1: DVec3,
}

impl Edge {
    pub fn new(v0: DVec3, v1: DVec3) -> Self {
        Self { v0, v1 }
    }

    pub fn is_degenerate(&self) -> bool {
        self.v0 == self.v1
    }
}

/// Offset of the polygon reference point from its first edge, in radians.
const REFERENCE_OFFSET: f64 = 1e-9;

/// A polygon made of closed loops.
///
/// The first loop is the outer shell, counter-clockwise (interior on the left).
/// Remaining loops are holes. Containment is decided by crossing parity from a
/// reference point just inside the shell's first non-degenerate edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    loops: Vec<Vec<DVec3>>,
    /// `loop_starts[k]` is the id of the first edge of loop `k`.
    loop_starts: Vec<u32>,
    num_edges: u32,
    reference: Option<DVec3>,
}

impl Polygon {
    pub fn new(loops: Vec<Vec<DVec3>>) -> Self {
        let loops: Vec<Vec<DVec3>> = loops.into_iter().filter(|l| !l.is_empty()).collect();
        let mut loop_starts = Vec::with_capacity(loops.len());
        let mut num_edges = 0u32;
        for l in &loops {
            loop_starts.push(num_edges);
            num_edges += l.len() as u32;
        }
        let reference = loops.first().and_then(|shell| reference_point(shell));
        Self {
            loops,
            loop_starts,
            num_edges,
            reference,
        }
    }

    pub fn loops(&self) -> &[Vec<DVec3>] {
        &self.loops
    }

    pub fn num_edges(&self) -> u32 {
        self.num_edges
    }

    pub fn edge(&self, edge_id: u32) -> Edge {
        assert!(edge_id < self.num_edges, "edge {} out of range", edge_id);
        let k = self.loop_starts.partition_point(|&start| start <= edge_id) - 1;
        let l = &self.loops[k];
        let i = (edge_id - self.loop_starts[k]) as usize;
        Edge::new(l[i], l[(i + 1) % l.len()])
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.loops.iter().flat_map(|l| {
            (0..l.len()).map(move |i| Edge::new(l[i], l[(i + 1) % l.len()]))
        })
    }

    /// True if `p` is in the polygon interior.
    pub fn contains(&self, p: DVec3) -> bool {
        let Some(origin) = self.reference else {
            return false;
        };
        let mut inside = true;
        for e in self.edges() {
            if edges_cross(origin, p, e.v0, e.v1) {
                inside = !inside;
            }
        }
        inside
    }
}

/// A point just to the left of the first non-degenerate edge of `shell`.
fn reference_point(shell: &[DVec3]) -> Option<DVec3> {
    if shell.len() < 3 {
        return None;
    }
    (0..shell.len()).find_map(|i| {
        let a = shell[i];
        let b = shell[(i + 1) % shell.len()];
        let normal = a.cross(b);
        if normal.length_squared() == 0.0 {
            return None;
        }
        let mid = (a + b).normalize();
        Some((mid + normal.normalize() * REFERENCE_OFFSET).normalize())
    })
}

/// Geometry stored in a [`ShapeIndex`](crate::ShapeIndex).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Each point is one degenerate edge.
    Points(Vec<DVec3>),
    /// `n` vertices give `n - 1` edges.
    Polyline(Vec<DVec3>),
    Polygon(Polygon),
}

impl Shape {
    pub fn polygon(loops: Vec<Vec<DVec3>>) -> Self {
        Shape::Polygon(Polygon::new(loops))
    }

    /// 0 for points, 1 for polylines, 2 for polygons.
    pub fn dimension(&self) -> u8 {
        match self {
            Shape::Points(_) => 0,
            Shape::Polyline(_) => 1,
            Shape::Polygon(_) => 2,
        }
    }

    pub fn num_edges(&self) -> u32 {
        match self {
            Shape::Points(points) => points.len() as u32,
            Shape::Polyline(vertices) => vertices.len().saturating_sub(1) as u32,
            Shape::Polygon(polygon) => polygon.num_edges(),
        }
    }

    pub fn edge(&self, edge_id: u32) -> Edge {
        let e = edge_id as usize;
        match self {
            Shape::Points(points) => Edge::new(points[e], points[e]),
            Shape::Polyline(vertices) => {
                assert!(e + 1 < vertices.len(), "edge {} out of range", edge_id);
                Edge::new(vertices[e], vertices[e + 1])
            }
            Shape::Polygon(polygon) => polygon.edge(edge_id),
        }
    }

    /// Only polygons have an interior.
    pub fn contains(&self, p: DVec3) -> bool {
        match self {
            Shape::Polygon(polygon) => polygon.contains(p),
            _ => false,
        }
    }

    pub fn vertices(&self) -> Box<dyn Iterator<Item = DVec3> + '_> {
        match self {
            Shape::Points(points) => Box::new(points.iter().copied()),
            Shape::Polyline(vertices) => Box::new(vertices.iter().copied()),
            Shape::Polygon(polygon) => Box::new(polygon.loops().iter().flatten().copied()),
        }
    }
}
