//! Minimum-distance queries with stored options.

use s2_index::{ChordAngle, ShapeIndex};

use crate::distance::MinDistance;
use crate::options::Options;
use crate::query::{ClosestEdgeQueryBase, SearchStats};
use crate::result::QueryResult;
use crate::target::Target;

/// Finds the edges of an index closest to a target.
///
/// ```
/// use s2_edge_query::textformat::{make_index, make_point};
/// use s2_edge_query::{ClosestEdgeQuery, PointTarget};
///
/// let index = make_index("0:0 | 0:5 | 0:10 # #");
/// let mut query = ClosestEdgeQuery::new(&index);
/// let closest = query.find_closest_edge(&PointTarget::new(make_point("1:6"))).unwrap();
/// assert_eq!(closest.edge_id, Some(1));
/// ```
#[derive(Debug)]
pub struct ClosestEdgeQuery<'a> {
    base: ClosestEdgeQueryBase<'a, MinDistance>,
    options: Options<MinDistance>,
}

impl<'a> ClosestEdgeQuery<'a> {
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self::with_options(index, Options::default())
    }

    pub fn with_options(index: &'a ShapeIndex, options: Options<MinDistance>) -> Self {
        Self {
            base: ClosestEdgeQueryBase::new(index),
            options,
        }
    }

    pub fn index(&self) -> &'a ShapeIndex {
        self.base.index()
    }

    pub fn options(&self) -> &Options<MinDistance> {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options<MinDistance> {
        &mut self.options
    }

    pub fn last_stats(&self) -> SearchStats {
        self.base.last_stats()
    }

    pub fn find_closest_edges<T>(&mut self, target: &T) -> Vec<QueryResult<MinDistance>>
    where
        T: Target<MinDistance> + ?Sized,
    {
        self.base.find_closest_edges(target, &self.options)
    }

    /// The single closest edge, ignoring the stored `max_edges`.
    pub fn find_closest_edge<T>(&mut self, target: &T) -> Option<QueryResult<MinDistance>>
    where
        T: Target<MinDistance> + ?Sized,
    {
        let options = self.options.with_max_edges(1);
        self.base.find_closest_edges(target, &options).into_iter().next()
    }

    /// Distance to the closest edge, or infinity when nothing is in range.
    pub fn get_distance<T>(&mut self, target: &T) -> ChordAngle
    where
        T: Target<MinDistance> + ?Sized,
    {
        self.find_closest_edge(target)
            .map_or(ChordAngle::infinity(), |r| r.distance.chord_angle())
    }

    /// Whether some edge is strictly closer than `limit`. Stops at the first
    /// such edge.
    pub fn is_distance_less<T>(&mut self, target: &T, limit: ChordAngle) -> bool
    where
        T: Target<MinDistance> + ?Sized,
    {
        let options = self
            .options
            .with_max_edges(1)
            .with_max_distance(MinDistance(limit))
            .with_max_error(ChordAngle::straight());
        !self.base.find_closest_edges(target, &options).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Distance;
    use crate::target::PointTarget;
    use crate::textformat::{make_index, make_point};

    #[test]
    fn test_get_distance_on_empty_index() {
        let index = ShapeIndex::default();
        let mut query = ClosestEdgeQuery::new(&index);
        let target = PointTarget::new(make_point("0:0"));
        assert_eq!(query.get_distance(&target), ChordAngle::infinity());
        assert!(query.find_closest_edges(&target).is_empty());
        assert!(!query.is_distance_less(&target, ChordAngle::straight()));
    }

    #[test]
    fn test_is_distance_less_is_exclusive() {
        let index = make_index("0:0 # #");
        let mut query = ClosestEdgeQuery::new(&index);
        let target = PointTarget::new(make_point("0:3"));
        let d = query.get_distance(&target);
        assert!((d.degrees() - 3.0).abs() < 1e-12);
        assert!(!query.is_distance_less(&target, d));
        assert!(query.is_distance_less(&target, ChordAngle::from_degrees(3.001)));
    }

    #[test]
    fn test_stored_options_apply() {
        let index = make_index("0:0 | 0:1 | 0:2 | 0:3 # #");
        let mut query = ClosestEdgeQuery::new(&index);
        let options = query
            .options()
            .with_max_edges(2)
            .with_max_distance(MinDistance::from_degrees(10.0));
        *query.options_mut() = options;
        let results = query.find_closest_edges(&PointTarget::new(make_point("0:3")));
        let ids: Vec<_> = results.iter().map(|r| r.edge_id).collect();
        assert_eq!(ids, vec![Some(3), Some(2)]);
        assert_eq!(results[0].distance, MinDistance::zero());
    }
}
