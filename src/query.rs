//! Best-first branch-and-bound edge search, generic over the distance metric.
//!
//! The engine walks the index hierarchy in order of each cell's lower-bound
//! distance to the target, keeping the best `max_edges` edges seen so far. Once
//! the result set is full its worst distance (less `max_error`) becomes the
//! pruning limit, and the search ends as soon as the closest unexplored cell
//! cannot beat it.
//!
//! With no error tolerance an edge tying the worst kept result is still tested,
//! since it wins on (shape id, edge id). The tree search and a linear scan
//! therefore return the same results.
//!
//! Nothing here knows which metric is in use: a furthest-edge query is the same
//! search run with [`MaxDistance`](crate::furthest::MaxDistance) and a reflected
//! target.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use smallvec::SmallVec;

use s2_index::{Cap, CellContents, ChordAngle, ShapeId, ShapeIndex};

use crate::distance::Distance;
use crate::options::Options;
use crate::result::{QueryResult, ResultSet};
use crate::target::Target;

/// Leaf cells with fewer edges than this are scanned immediately rather than
/// going through the queue.
const MIN_EDGES_TO_ENQUEUE: u32 = 10;

/// A cell waiting to be expanded, keyed by its lower-bound distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry<D: Distance> {
    distance: D,
    cell: u32,
}

/// Counters for one query, logged at debug level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub cells_enqueued: usize,
    pub cells_expanded: usize,
    pub edges_tested: usize,
    pub brute_force: bool,
}

/// Search engine over one [`ShapeIndex`].
///
/// The query owns its frontier so repeated calls reuse the allocation; every
/// call starts from a cleared state. Searching needs `&mut self`, so share the
/// index, not the query, between threads.
#[derive(Debug)]
pub struct ClosestEdgeQueryBase<'a, D: Distance> {
    index: &'a ShapeIndex,
    queue: BinaryHeap<Reverse<QueueEntry<D>>>,
    last_stats: SearchStats,
}

impl<'a, D: Distance> ClosestEdgeQueryBase<'a, D> {
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self {
            index,
            queue: BinaryHeap::new(),
            last_stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn index(&self) -> &'a ShapeIndex {
        self.index
    }

    /// Counters from the most recent search.
    pub fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    /// Edges closest to `target` under the metric `D`, sorted by distance then
    /// by shape and edge id.
    ///
    /// At most `options.max_edges()` results are returned, each strictly closer
    /// than `options.max_distance()`.
    pub fn find_closest_edges<T>(&mut self, target: &T, options: &Options<D>) -> Vec<QueryResult<D>>
    where
        T: Target<D> + ?Sized,
    {
        self.queue.clear();
        let mut search = Search {
            index: self.index,
            target,
            options,
            queue: &mut self.queue,
            limit: options.max_distance(),
            results: ResultSet::new(options.max_edges(), Options::<D>::UNLIMITED),
            seeded_leaf: None,
            stats: SearchStats::default(),
        };
        search.run();
        let Search { results, stats, .. } = search;
        log::debug!(
            "edge query: {} results, {} cells enqueued, {} expanded, {} edges tested{}",
            results.len(),
            stats.cells_enqueued,
            stats.cells_expanded,
            stats.edges_tested,
            if stats.brute_force { " (brute force)" } else { "" }
        );
        self.last_stats = stats;
        self.queue.clear();
        results.into_sorted_vec()
    }
}

/// State for a single call.
struct Search<'q, 'a, D: Distance, T: ?Sized> {
    index: &'a ShapeIndex,
    target: &'q T,
    options: &'q Options<D>,
    queue: &'q mut BinaryHeap<Reverse<QueueEntry<D>>>,
    /// Only edges strictly closer than this can still enter the result set.
    limit: D,
    results: ResultSet<D>,
    /// Leaf scanned before the queue was seeded.
    seeded_leaf: Option<u32>,
    stats: SearchStats,
}

impl<D: Distance, T: Target<D> + ?Sized> Search<'_, '_, D, T> {
    fn run(&mut self) {
        if self.limit == D::zero() {
            return;
        }
        if self.options.max_edges() == Options::<D>::UNLIMITED && self.limit == D::infinity() {
            log::warn!("edge query has neither max_edges nor max_distance set; returning every edge");
        }

        if self.options.include_interiors() {
            let max_edges = self.options.max_edges();
            let mut shapes: SmallVec<[ShapeId; 8]> = SmallVec::new();
            self.target.visit_containing_shapes(self.index, &mut |shape_id| {
                shapes.push(shape_id);
                shapes.len() < max_edges
            });
            for shape_id in shapes {
                self.add_result(QueryResult::new(D::zero(), shape_id, None));
            }
            if self.limit == D::zero() {
                return;
            }
        }

        let brute_force_limit = self
            .target
            .max_brute_force_edges()
            .max(self.options.brute_force_threshold());
        if self.index.num_edges() <= brute_force_limit {
            log::trace!(
                "{} edges <= {}, scanning every edge",
                self.index.num_edges(),
                brute_force_limit
            );
            self.stats.brute_force = true;
            self.find_brute_force();
        } else {
            self.find_optimized();
        }
    }

    fn find_brute_force(&mut self) {
        let index = self.index;
        for (shape_id, shape) in index.shapes().iter().enumerate() {
            for edge_id in 0..shape.num_edges() {
                self.maybe_add_result(shape_id as ShapeId, edge_id, None);
            }
        }
    }

    fn find_optimized(&mut self) {
        self.init_queue();
        while let Some(Reverse(entry)) = self.queue.pop() {
            if !(entry.distance < self.limit) {
                // Every remaining cell is at least this far away.
                self.queue.clear();
                break;
            }
            self.stats.cells_expanded += 1;
            let index = self.index;
            match index.cell(entry.cell).contents() {
                CellContents::Leaf(_) => self.process_edges(entry.cell, Some(entry.distance)),
                CellContents::Interior(children) => {
                    for child in children.clone() {
                        self.enqueue_cell(child);
                    }
                }
            }
        }
    }

    fn init_queue(&mut self) {
        debug_assert!(self.queue.is_empty());
        let cap = self.target.cap_bound();
        if cap.is_empty() {
            return;
        }

        // Seed the limit from the leaf under the target.
        if self.options.max_edges() == 1 {
            if let Some(leaf) = self.index.locate(cap.center()) {
                self.seeded_leaf = Some(leaf);
                self.process_edges(leaf, None);
                if self.limit == D::zero() {
                    return;
                }
            }
        }

        let index = self.index;
        if self.limit == D::infinity() {
            for &root in index.root_cells() {
                self.enqueue_cell(root);
            }
        } else {
            let radius = cap.radius() + ChordAngle::from_angle(self.limit.angle_bound());
            let search_cap = Cap::new(cap.center(), radius);
            for &root in index.root_cells() {
                if index.cell(root).cap_bound().intersects(&search_cap) {
                    self.enqueue_cell(root);
                }
            }
        }
    }

    fn enqueue_cell(&mut self, idx: u32) {
        if self.seeded_leaf == Some(idx) {
            return;
        }
        let cell = self.index.cell(idx);
        if cell.is_leaf() && cell.num_edges() < MIN_EDGES_TO_ENQUEUE {
            self.process_edges(idx, None);
            return;
        }
        let mut distance = self.limit;
        if self.target.update_min_distance_to_cell(cell, &mut distance) {
            self.stats.cells_enqueued += 1;
            self.queue.push(Reverse(QueueEntry { distance, cell: idx }));
        }
    }

    /// `cell_bound` is the queued lower bound of the cell, if it went through
    /// the queue.
    fn process_edges(&mut self, idx: u32, cell_bound: Option<D>) {
        let index = self.index;
        for edge in index.edges(index.cell(idx)) {
            self.maybe_add_result(edge.shape_id, edge.edge_id, cell_bound);
        }
    }

    fn maybe_add_result(&mut self, shape_id: ShapeId, edge_id: u32, cell_bound: Option<D>) {
        self.stats.edges_tested += 1;
        let edge = self.index.edge(shape_id, edge_id);
        let mut distance = self.limit;
        if self
            .target
            .update_min_distance_to_edge(edge.v0, edge.v1, &mut distance)
        {
            if let Some(bound) = cell_bound {
                debug_assert!(
                    bound <= distance,
                    "target bounded a cell at {bound:?} but its edge ({shape_id}, {edge_id}) is at {distance:?}"
                );
            }
            self.add_result(QueryResult::new(distance, shape_id, Some(edge_id)));
        }
    }

    fn add_result(&mut self, result: QueryResult<D>) {
        if let Some(worst) = self.results.insert(result) {
            let max_error = self.options.max_error();
            self.limit = if max_error.is_zero() {
                // Keep testing ties; they may win on ids.
                worst.successor()
            } else {
                worst - max_error
            };
        }
    }
}
