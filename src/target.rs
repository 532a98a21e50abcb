//! Query subjects: the geometry distances are measured from.

use glam::DVec3;
use smallvec::SmallVec;

use s2_index::edge_distances::{update_edge_pair_min_distance, update_min_distance};
use s2_index::{Cap, Cell, ChordAngle, IndexCell, Shape, ShapeId, ShapeIndex};

use crate::closest::ClosestEdgeQuery;
use crate::distance::{Distance, MinDistance};
use crate::options::Options;

/// Something distances can be measured from.
///
/// Every `update_*` method follows the same contract: if the true distance to
/// the primitive is strictly better than `*min_dist`, store it and return
/// `true`; otherwise leave `*min_dist` alone and return `false`. Cell bounds
/// must never be optimistic about any edge in the cell's subtree.
pub trait Target<D: Distance> {
    /// Below this many index edges, scanning every edge beats the tree search.
    fn max_brute_force_edges(&self) -> usize;

    /// Cap bounding the geometry the engine measures minimum distance to.
    fn cap_bound(&self) -> Cap;

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, min_dist: &mut D) -> bool;

    fn update_min_distance_to_cell(&self, cell: &IndexCell, min_dist: &mut D) -> bool;

    /// Call `visitor` with every polygon of `index` whose interior contains the
    /// target, stopping early when it returns `false`. Returns `false` iff the
    /// visitor stopped the walk.
    fn visit_containing_shapes(
        &self,
        _index: &ShapeIndex,
        _visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        true
    }
}

#[inline]
pub(crate) fn update_min<D: Distance>(distance: D, min_dist: &mut D) -> bool {
    if distance < *min_dist {
        *min_dist = distance;
        true
    } else {
        false
    }
}

/// Visit the shapes of `index` containing `p`.
pub(crate) fn visit_shapes_containing(
    index: &ShapeIndex,
    p: DVec3,
    visitor: &mut dyn FnMut(ShapeId) -> bool,
) -> bool {
    index.containing_shapes(p).into_iter().all(|id| visitor(id))
}

/// Cap around an edge: centered on its midpoint, full when the endpoints are
/// (nearly) antipodal.
pub(crate) fn edge_cap(a: DVec3, b: DVec3) -> Cap {
    let mid = a + b;
    if mid.length_squared() < 1e-30 {
        return Cap::full();
    }
    let center = mid.normalize();
    let radius = ChordAngle::between(center, a).max(ChordAngle::between(center, b));
    Cap::new(center, ChordAngle::from_length2(radius.length2() + 1e-15))
}

/// Point on an edge used for containment tests, so that `ab` and `ba` agree.
pub(crate) fn edge_reference_point(a: DVec3, b: DVec3) -> DVec3 {
    let mid = a + b;
    if mid.length_squared() < 1e-30 {
        a
    } else {
        mid.normalize()
    }
}

/// Distance to a single point.
#[derive(Debug, Clone, Copy)]
pub struct PointTarget {
    point: DVec3,
}

impl PointTarget {
    pub fn new(point: DVec3) -> Self {
        Self { point }
    }

    pub fn point(&self) -> DVec3 {
        self.point
    }
}

impl Target<MinDistance> for PointTarget {
    fn max_brute_force_edges(&self) -> usize {
        120
    }

    fn cap_bound(&self) -> Cap {
        Cap::from_point(self.point)
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, min_dist: &mut MinDistance) -> bool {
        update_min_distance(self.point, v0, v1, &mut min_dist.0)
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, min_dist: &mut MinDistance) -> bool {
        update_min(MinDistance(cell.cap_bound().distance(self.point)), min_dist)
    }

    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        visit_shapes_containing(index, self.point, visitor)
    }
}

/// Distance to a geodesic edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTarget {
    a: DVec3,
    b: DVec3,
}

impl EdgeTarget {
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self { a, b }
    }
}

impl Target<MinDistance> for EdgeTarget {
    fn max_brute_force_edges(&self) -> usize {
        60
    }

    fn cap_bound(&self) -> Cap {
        edge_cap(self.a, self.b)
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, min_dist: &mut MinDistance) -> bool {
        update_edge_pair_min_distance(self.a, self.b, v0, v1, &mut min_dist.0)
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, min_dist: &mut MinDistance) -> bool {
        update_min(MinDistance(cell.cap_bound().distance_to_edge(self.a, self.b)), min_dist)
    }

    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        visit_shapes_containing(index, edge_reference_point(self.a, self.b), visitor)
    }
}

/// Distance to the region covered by a cube-face cell.
#[derive(Debug, Clone)]
pub struct CellTarget {
    cell: Cell,
}

impl CellTarget {
    pub fn new(cell: Cell) -> Self {
        Self { cell }
    }
}

impl Target<MinDistance> for CellTarget {
    fn max_brute_force_edges(&self) -> usize {
        30
    }

    fn cap_bound(&self) -> Cap {
        self.cell.cap_bound()
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, min_dist: &mut MinDistance) -> bool {
        update_min(MinDistance(self.cell.distance_to_edge(v0, v1)), min_dist)
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, min_dist: &mut MinDistance) -> bool {
        // Every point within the cap is at most `radius` from its center.
        let cap = cell.cap_bound();
        if cap.is_empty() {
            return false;
        }
        update_min(MinDistance(self.cell.distance(cap.center()) - cap.radius()), min_dist)
    }

    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        visit_shapes_containing(index, self.cell.center(), visitor)
    }
}

/// Distance to all the geometry of another index.
///
/// Each tightening runs a nested single-result query over the target index.
/// With `include_interiors`, the target's polygons count as solid regions.
#[derive(Debug, Clone)]
pub struct ShapeIndexTarget<'a> {
    index: &'a ShapeIndex,
    include_interiors: bool,
    cap: Cap,
}

impl<'a> ShapeIndexTarget<'a> {
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self {
            index,
            include_interiors: false,
            cap: index_cap_bound(index),
        }
    }

    pub fn with_include_interiors(mut self, include_interiors: bool) -> Self {
        self.include_interiors = include_interiors;
        self
    }

    pub fn index(&self) -> &'a ShapeIndex {
        self.index
    }

    fn nested_distance<T: Target<MinDistance>>(&self, target: &T, limit: MinDistance) -> Option<MinDistance> {
        let options = Options::default()
            .with_max_edges(1)
            .with_max_distance(limit)
            .with_include_interiors(self.include_interiors);
        let mut query = ClosestEdgeQuery::with_options(self.index, options);
        query.find_closest_edge(target).map(|r| r.distance)
    }
}

impl Target<MinDistance> for ShapeIndexTarget<'_> {
    fn max_brute_force_edges(&self) -> usize {
        25
    }

    fn cap_bound(&self) -> Cap {
        self.cap
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, min_dist: &mut MinDistance) -> bool {
        match self.nested_distance(&EdgeTarget::new(v0, v1), *min_dist) {
            Some(distance) => update_min(distance, min_dist),
            None => false,
        }
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, min_dist: &mut MinDistance) -> bool {
        // dist(target, any point of the cap) >= dist(target, center) - radius.
        let cap = cell.cap_bound();
        if cap.is_empty() {
            return false;
        }
        let limit = MinDistance(min_dist.0 + cap.radius());
        match self.nested_distance(&PointTarget::new(cap.center()), limit) {
            Some(distance) => update_min(MinDistance(distance.0 - cap.radius()), min_dist),
            None => false,
        }
    }

    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        let mut seen: SmallVec<[ShapeId; 8]> = SmallVec::new();
        for p in self.index.shapes().iter().flat_map(component_points) {
            for id in index.containing_shapes(p) {
                if seen.contains(&id) {
                    continue;
                }
                seen.push(id);
                if !visitor(id) {
                    return false;
                }
            }
        }
        true
    }
}

/// One point per connected component of a shape.
fn component_points(shape: &Shape) -> Vec<DVec3> {
    match shape {
        Shape::Points(points) => points.clone(),
        Shape::Polyline(vertices) => vertices.first().copied().into_iter().collect(),
        Shape::Polygon(polygon) => polygon.loops().iter().filter_map(|l| l.first().copied()).collect(),
    }
}

/// Union of the root cell bounds of an index.
fn index_cap_bound(index: &ShapeIndex) -> Cap {
    let roots = index.root_cells();
    if roots.is_empty() {
        return Cap::empty();
    }
    let caps: SmallVec<[Cap; 6]> = roots.iter().map(|&r| index.cell(r).cap_bound()).collect();
    if caps.iter().any(|c| c.is_full()) {
        return Cap::full();
    }
    let sum: DVec3 = caps.iter().map(|c| c.center()).sum();
    if sum.length_squared() < 1e-30 {
        return Cap::full();
    }
    let center = sum.normalize();
    let mut radius = ChordAngle::zero();
    for cap in &caps {
        radius = radius.max(ChordAngle::between(center, cap.center()) + cap.radius());
    }
    if radius >= ChordAngle::straight() {
        Cap::full()
    } else {
        Cap::new(center, ChordAngle::from_length2(radius.length2() + 1e-14))
    }
}
