//! Query results and the bounded accumulator that collects them.

use std::collections::BTreeSet;

use s2_index::ShapeId;

use crate::distance::Distance;

/// One edge (or polygon interior) found by a query.
///
/// Ordered by distance, then shape id, then edge id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryResult<D: Distance> {
    pub distance: D,
    pub shape_id: ShapeId,
    /// `None` for a polygon interior reported by `include_interiors`.
    pub edge_id: Option<u32>,
}

impl<D: Distance> QueryResult<D> {
    pub fn new(distance: D, shape_id: ShapeId, edge_id: Option<u32>) -> Self {
        Self {
            distance,
            shape_id,
            edge_id,
        }
    }

    #[inline]
    pub fn is_interior(&self) -> bool {
        self.edge_id.is_none()
    }
}

/// Accumulates results for one query, never holding more than `max_edges`.
///
/// Three layouts, picked from `max_edges`: a single slot for the common
/// "closest edge" query, an append-only vector when unlimited (sorted once at
/// the end), and an ordered set trimmed from the back otherwise.
#[derive(Debug)]
pub(crate) enum ResultSet<D: Distance> {
    Single(Option<QueryResult<D>>),
    Unlimited(Vec<QueryResult<D>>),
    Bounded {
        max_edges: usize,
        set: BTreeSet<QueryResult<D>>,
    },
}

impl<D: Distance> ResultSet<D> {
    pub(crate) fn new(max_edges: usize, unlimited: usize) -> Self {
        debug_assert!(max_edges > 0);
        if max_edges == 1 {
            ResultSet::Single(None)
        } else if max_edges == unlimited {
            ResultSet::Unlimited(Vec::new())
        } else {
            ResultSet::Bounded {
                max_edges,
                set: BTreeSet::new(),
            }
        }
    }

    /// Add a result, keeping the `max_edges` smallest by (distance, shape id,
    /// edge id). Returns the distance of the worst kept result once the set is
    /// full; results tying it can still displace it on ids.
    pub(crate) fn insert(&mut self, result: QueryResult<D>) -> Option<D> {
        match self {
            ResultSet::Single(slot) => {
                let best = match *slot {
                    Some(current) if current <= result => current,
                    _ => result,
                };
                *slot = Some(best);
                Some(best.distance)
            }
            ResultSet::Unlimited(results) => {
                results.push(result);
                None
            }
            ResultSet::Bounded { max_edges, set } => {
                set.insert(result);
                if set.len() > *max_edges {
                    set.pop_last();
                }
                if set.len() >= *max_edges {
                    set.last().map(|worst| worst.distance)
                } else {
                    None
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            ResultSet::Single(slot) => slot.is_some() as usize,
            ResultSet::Unlimited(results) => results.len(),
            ResultSet::Bounded { set, .. } => set.len(),
        }
    }

    /// Sorted ascending, without duplicates.
    pub(crate) fn into_sorted_vec(self) -> Vec<QueryResult<D>> {
        match self {
            ResultSet::Single(slot) => slot.into_iter().collect(),
            ResultSet::Unlimited(mut results) => {
                results.sort_unstable();
                results.dedup();
                results
            }
            ResultSet::Bounded { set, .. } => set.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::MinDistance;

    const UNLIMITED: usize = usize::MAX;

    fn r(deg: f64, shape_id: u32, edge_id: u32) -> QueryResult<MinDistance> {
        QueryResult::new(MinDistance::from_degrees(deg), shape_id, Some(edge_id))
    }

    #[test]
    fn test_result_ordering_breaks_ties_by_ids() {
        let mut v = vec![r(2.0, 1, 0), r(1.0, 3, 3), r(2.0, 0, 5), r(2.0, 0, 1)];
        v.sort();
        assert_eq!(v, vec![r(1.0, 3, 3), r(2.0, 0, 1), r(2.0, 0, 5), r(2.0, 1, 0)]);
        let interior = QueryResult::new(MinDistance::zero(), 0, None);
        assert!(interior < QueryResult::new(MinDistance::zero(), 0, Some(0)));
    }

    #[test]
    fn test_bounded_set_reports_limit_when_full() {
        let mut set = ResultSet::new(2, UNLIMITED);
        assert_eq!(set.insert(r(5.0, 0, 0)), None);
        assert_eq!(set.insert(r(3.0, 0, 1)), Some(MinDistance::from_degrees(5.0)));
        assert_eq!(set.insert(r(1.0, 0, 2)), Some(MinDistance::from_degrees(3.0)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_sorted_vec(), vec![r(1.0, 0, 2), r(3.0, 0, 1)]);
    }

    #[test]
    fn test_unlimited_sorts_and_dedups() {
        let mut set = ResultSet::new(UNLIMITED, UNLIMITED);
        for res in [r(4.0, 0, 0), r(1.0, 0, 1), r(4.0, 0, 0)] {
            assert_eq!(set.insert(res), None);
        }
        assert_eq!(set.into_sorted_vec(), vec![r(1.0, 0, 1), r(4.0, 0, 0)]);
    }

    #[test]
    fn test_single_keeps_best() {
        let mut set = ResultSet::new(1, UNLIMITED);
        assert_eq!(set.len(), 0);
        set.insert(r(4.0, 0, 0));
        set.insert(r(2.0, 1, 3));
        assert_eq!(set.insert(r(3.0, 0, 0)), Some(MinDistance::from_degrees(2.0)));
        assert_eq!(set.into_sorted_vec(), vec![r(2.0, 1, 3)]);
    }

    #[test]
    fn test_equal_distances_keep_smallest_ids() {
        let mut single = ResultSet::new(1, UNLIMITED);
        for res in [r(2.0, 1, 3), r(2.0, 0, 7), r(2.0, 1, 0)] {
            single.insert(res);
        }
        assert_eq!(single.into_sorted_vec(), vec![r(2.0, 0, 7)]);

        let mut bounded = ResultSet::new(2, UNLIMITED);
        for res in [r(2.0, 0, 9), r(2.0, 0, 5), r(2.0, 0, 1), r(2.0, 0, 6)] {
            bounded.insert(res);
        }
        assert_eq!(bounded.into_sorted_vec(), vec![r(2.0, 0, 1), r(2.0, 0, 5)]);
    }
}
