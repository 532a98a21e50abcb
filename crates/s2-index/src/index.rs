//! Read-only spatial index over shape edges.
//!
//! Each cube face carries a quadtree. Every edge is assigned to the leaf cell
//! containing its midpoint, and a cell is subdivided while it holds more than
//! `max_edges_per_cell` edges. Cells are stored flat, with the children of a
//! cell contiguous, so the whole hierarchy is a handful of `Vec`s.
//!
//! Edges are not clipped to cells, so each [`IndexCell`] carries its own bounding
//! [`Cap`] covering every edge in its subtree. Distance queries prune with that
//! cap rather than the cell's nominal region.

use std::collections::VecDeque;
use std::ops::Range;

use glam::DVec3;
use smallvec::SmallVec;

use crate::angle::ChordAngle;
use crate::cap::Cap;
use crate::cell::{CellId, MAX_LEVEL};
use crate::projection::NUM_FACES;
use crate::shape::{Edge, Shape, ShapeId};

/// Default split threshold for index cells.
pub const DEFAULT_MAX_EDGES_PER_CELL: usize = 10;

/// Extra squared chord length added to index cell bounds to absorb rounding.
const BOUND_EPS_LENGTH2: f64 = 1e-14;

/// Identifies one edge of one indexed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeEdgeId {
    pub shape_id: ShapeId,
    pub edge_id: u32,
}

impl ShapeEdgeId {
    pub fn new(shape_id: ShapeId, edge_id: u32) -> Self {
        Self { shape_id, edge_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContents {
    /// Indices of the child cells (contiguous).
    Interior(Range<u32>),
    /// Range into the index's edge list.
    Leaf(Range<u32>),
}

/// One node of the index hierarchy.
#[derive(Debug, Clone)]
pub struct IndexCell {
    id: CellId,
    bound: Cap,
    num_edges: u32,
    contents: CellContents,
}

impl IndexCell {
    fn pending(id: CellId) -> Self {
        Self {
            id,
            bound: Cap::empty(),
            num_edges: 0,
            contents: CellContents::Leaf(0..0),
        }
    }

    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Cap containing every edge stored in this cell's subtree.
    #[inline]
    pub fn cap_bound(&self) -> Cap {
        self.bound
    }

    /// Number of edges in this cell's subtree.
    #[inline]
    pub fn num_edges(&self) -> u32 {
        self.num_edges
    }

    #[inline]
    pub fn contents(&self) -> &CellContents {
        &self.contents
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, CellContents::Leaf(_))
    }
}

/// Immutable edge index over a set of shapes.
///
/// The index is `Send + Sync` and may be searched by any number of queries at
/// once.
#[derive(Debug, Clone)]
pub struct ShapeIndex {
    shapes: Vec<Shape>,
    num_edges: usize,
    cells: Vec<IndexCell>,
    /// One root per non-empty face.
    roots: Vec<u32>,
    edge_refs: Vec<ShapeEdgeId>,
    max_edges_per_cell: usize,
}

impl Default for ShapeIndex {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ShapeIndex {
    /// Build an index with the default split threshold.
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self::with_max_edges_per_cell(shapes, DEFAULT_MAX_EDGES_PER_CELL)
    }

    /// Build an index, splitting cells that hold more than `max_edges_per_cell`
    /// edges.
    ///
    /// Panics on non-finite vertices.
    pub fn with_max_edges_per_cell(shapes: Vec<Shape>, max_edges_per_cell: usize) -> Self {
        assert!(max_edges_per_cell > 0, "ShapeIndex requires max_edges_per_cell > 0");

        // Step 1: Assign each edge to the leaf cell containing its midpoint
        let mut entries: Vec<(CellId, ShapeEdgeId)> = Vec::new();
        for (shape_id, shape) in shapes.iter().enumerate() {
            for edge_id in 0..shape.num_edges() {
                let edge = shape.edge(edge_id);
                assert!(
                    edge.v0.is_finite() && edge.v1.is_finite(),
                    "non-finite vertex in shape {} edge {}",
                    shape_id,
                    edge_id
                );
                let leaf = CellId::from_point(edge_anchor(&edge));
                entries.push((leaf, ShapeEdgeId::new(shape_id as ShapeId, edge_id)));
            }
        }
        let num_edges = entries.len();

        // Step 2: Group by face (stable, so shape/edge order is preserved)
        entries.sort_by_key(|(leaf, _)| leaf.face());

        // Step 3: Breadth-first subdivision; children of a cell are pushed together
        let mut cells = Vec::new();
        let mut roots = Vec::new();
        let mut edge_refs = Vec::with_capacity(num_edges);
        let mut pending: VecDeque<(u32, Range<usize>)> = VecDeque::new();

        let mut start = 0;
        for face in 0..NUM_FACES {
            let end = start + entries[start..].iter().take_while(|(l, _)| l.face() == face).count();
            if end > start {
                let idx = cells.len() as u32;
                cells.push(IndexCell::pending(CellId::from_face(face)));
                roots.push(idx);
                pending.push_back((idx, start..end));
            }
            start = end;
        }

        while let Some((idx, range)) = pending.pop_front() {
            let id = cells[idx as usize].id;
            let slice = &mut entries[range.clone()];
            let bound = edges_bound(id, slice.iter().map(|(_, e)| shapes[e.shape_id as usize].edge(e.edge_id)));

            let contents = if slice.len() <= max_edges_per_cell || id.level() == MAX_LEVEL {
                let first = edge_refs.len() as u32;
                edge_refs.extend(slice.iter().map(|(_, e)| *e));
                CellContents::Leaf(first..edge_refs.len() as u32)
            } else {
                let level = id.level() + 1;
                slice.sort_by_key(|(leaf, _)| leaf.child_position(level));
                let first_child = cells.len() as u32;
                let mut child_start = range.start;
                for k in 0..4 {
                    let count = entries[child_start..range.end]
                        .iter()
                        .take_while(|(leaf, _)| leaf.child_position(level) == k)
                        .count();
                    if count > 0 {
                        let child_idx = cells.len() as u32;
                        cells.push(IndexCell::pending(id.child(k)));
                        pending.push_back((child_idx, child_start..child_start + count));
                    }
                    child_start += count;
                }
                debug_assert_eq!(child_start, range.end);
                CellContents::Interior(first_child..cells.len() as u32)
            };

            let cell = &mut cells[idx as usize];
            cell.bound = bound;
            cell.num_edges = range.len() as u32;
            cell.contents = contents;
        }

        let index = ShapeIndex {
            shapes,
            num_edges,
            cells,
            roots,
            edge_refs,
            max_edges_per_cell,
        };
        log::debug!(
            "built shape index: {} shapes, {} edges, {} cells",
            index.shapes.len(),
            index.num_edges,
            index.cells.len()
        );
        index
    }

    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, shape_id: ShapeId) -> &Shape {
        &self.shapes[shape_id as usize]
    }

    #[inline]
    pub fn num_shapes(&self) -> usize {
        self.shapes.len()
    }

    /// Total number of edges over all shapes.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    #[inline]
    pub fn max_edges_per_cell(&self) -> usize {
        self.max_edges_per_cell
    }

    pub fn edge(&self, shape_id: ShapeId, edge_id: u32) -> Edge {
        self.shape(shape_id).edge(edge_id)
    }

    /// Indices of the root (face) cells.
    #[inline]
    pub fn root_cells(&self) -> &[u32] {
        &self.roots
    }

    #[inline]
    pub fn cell(&self, idx: u32) -> &IndexCell {
        &self.cells[idx as usize]
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Child cell indices; empty for leaves.
    pub fn children(&self, cell: &IndexCell) -> Range<u32> {
        match &cell.contents {
            CellContents::Interior(children) => children.clone(),
            CellContents::Leaf(_) => 0..0,
        }
    }

    /// Edges stored in a leaf; empty for interior cells.
    pub fn edges(&self, cell: &IndexCell) -> &[ShapeEdgeId] {
        match &cell.contents {
            CellContents::Leaf(r) => &self.edge_refs[r.start as usize..r.end as usize],
            CellContents::Interior(_) => &[],
        }
    }

    /// Index of the leaf cell whose region contains `p`, if any.
    pub fn locate(&self, p: DVec3) -> Option<u32> {
        let leaf = CellId::from_point(p);
        let mut idx = *self
            .roots
            .iter()
            .find(|&&r| self.cell(r).id.face() == leaf.face())?;
        loop {
            match &self.cell(idx).contents {
                CellContents::Leaf(_) => return Some(idx),
                CellContents::Interior(children) => {
                    idx = children.clone().find(|&c| self.cell(c).id.contains(leaf))?;
                }
            }
        }
    }

    /// Polygon shapes whose interior contains `p`, in shape id order.
    pub fn containing_shapes(&self, p: DVec3) -> SmallVec<[ShapeId; 4]> {
        self.shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| shape.contains(p))
            .map(|(id, _)| id as ShapeId)
            .collect()
    }

    /// Statistics about the index.
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            num_cells: self.cells.len(),
            num_edges: self.num_edges,
            ..IndexStats::default()
        };
        for cell in &self.cells {
            stats.max_level = stats.max_level.max(cell.id.level());
            if let CellContents::Leaf(r) = &cell.contents {
                stats.num_leaf_cells += 1;
                stats.max_edges_per_leaf = stats.max_edges_per_leaf.max(r.len());
            }
        }
        if stats.num_leaf_cells > 0 {
            stats.avg_edges_per_leaf = self.num_edges as f64 / stats.num_leaf_cells as f64;
        }
        stats
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexStats {
    pub num_cells: usize,
    pub num_leaf_cells: usize,
    pub num_edges: usize,
    pub max_level: u8,
    pub max_edges_per_leaf: usize,
    pub avg_edges_per_leaf: f64,
}

/// Point used to place an edge in the hierarchy.
fn edge_anchor(edge: &Edge) -> DVec3 {
    let mid = edge.v0 + edge.v1;
    if mid.length_squared() < 1e-30 {
        // Antipodal endpoints have no well-defined midpoint.
        edge.v0
    } else {
        mid.normalize()
    }
}

/// Cap centered on the cell that contains every edge.
///
/// A cap smaller than a hemisphere is convex, so containing both endpoints
/// implies containing the geodesic between them. Larger caps become full.
fn edges_bound(id: CellId, edges: impl Iterator<Item = Edge>) -> Cap {
    let center = id.center_point();
    let mut max_length2 = 0.0f64;
    for e in edges {
        max_length2 = max_length2
            .max((center - e.v0).length_squared())
            .max((center - e.v1).length_squared());
    }
    let radius = ChordAngle::from_length2(max_length2 + BOUND_EPS_LENGTH2);
    if radius >= ChordAngle::right() {
        Cap::full()
    } else {
        Cap::new(center, radius)
    }
}
