use s2_index::ChordAngle;

use crate::distance::Distance;

/// Per-query configuration.
///
/// ```
/// use s2_edge_query::{MinDistance, Options};
///
/// let options = Options::<MinDistance>::default()
///     .with_max_edges(5)
///     .with_max_distance(MinDistance::from_degrees(10.0));
/// assert_eq!(options.max_edges(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options<D: Distance> {
    max_edges: usize,
    max_distance: D,
    max_error: ChordAngle,
    include_interiors: bool,
    brute_force_threshold: usize,
}

impl<D: Distance> Options<D> {
    /// `max_edges` value meaning "every edge within `max_distance`".
    pub const UNLIMITED: usize = usize::MAX;

    /// Maximum number of results. Panics if zero.
    pub fn with_max_edges(mut self, max_edges: usize) -> Self {
        assert!(max_edges > 0, "max_edges must be positive");
        self.max_edges = max_edges;
        self
    }

    /// Only edges strictly closer than `max_distance` are returned.
    pub fn with_max_distance(mut self, max_distance: D) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Results may be up to `max_error` worse than the true best edges, which
    /// lets the search prune more aggressively once `max_edges` are found.
    /// The tolerance is an angle for every metric.
    pub fn with_max_error(mut self, max_error: ChordAngle) -> Self {
        self.max_error = max_error;
        self
    }

    /// Report polygons containing the target with distance zero and no edge.
    pub fn with_include_interiors(mut self, include_interiors: bool) -> Self {
        self.include_interiors = include_interiors;
        self
    }

    /// Scan every edge when the index holds at most this many edges (or the
    /// target's own threshold, whichever is larger).
    pub fn with_brute_force_threshold(mut self, threshold: usize) -> Self {
        self.brute_force_threshold = threshold;
        self
    }

    #[inline]
    pub fn max_edges(&self) -> usize {
        self.max_edges
    }

    #[inline]
    pub fn max_distance(&self) -> D {
        self.max_distance
    }

    #[inline]
    pub fn max_error(&self) -> ChordAngle {
        self.max_error
    }

    #[inline]
    pub fn include_interiors(&self) -> bool {
        self.include_interiors
    }

    #[inline]
    pub fn brute_force_threshold(&self) -> usize {
        self.brute_force_threshold
    }
}

impl<D: Distance> Default for Options<D> {
    fn default() -> Self {
        Self {
            max_edges: Self::UNLIMITED,
            max_distance: D::infinity(),
            max_error: ChordAngle::zero(),
            include_interiors: false,
            brute_force_threshold: 0,
        }
    }
}
