//! Furthest-edge search through the supplementary-angle metric.
//!
//! For any two geometries `X` and `Y` on the sphere,
//! `max_dist(X, Y) = pi - min_dist(-X, Y)`, where `-X` is `X` reflected through
//! the origin. [`MaxDistance`] orders values so that the unmodified minimum
//! search engine ranks larger separations first, and the furthest targets
//! measure against the reflected geometry.

use std::cmp::Ordering;
use std::ops::Sub;

use glam::DVec3;

use s2_index::edge_distances::{get_distance, update_edge_pair_min_distance};
use s2_index::{Angle, Cap, ChordAngle, IndexCell, ShapeId, ShapeIndex};

use crate::distance::Distance;
use crate::options::Options;
use crate::query::{ClosestEdgeQueryBase, SearchStats};
use crate::result::QueryResult;
use crate::target::{edge_cap, edge_reference_point, update_min, visit_shapes_containing, Target};

/// A maximum distance, ordered so that larger separations compare as smaller.
///
/// Holds the true maximum separation. `zero()` is 180 degrees (nothing can be
/// further), `infinity()` is the negative chord angle and `negative()` the
/// infinite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxDistance(pub ChordAngle);

impl MaxDistance {
    #[inline]
    pub fn chord_angle(self) -> ChordAngle {
        self.0
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Self {
        MaxDistance(ChordAngle::from_degrees(degrees))
    }
}

impl Default for MaxDistance {
    fn default() -> Self {
        MaxDistance(ChordAngle::zero())
    }
}

impl Ord for MaxDistance {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

impl PartialOrd for MaxDistance {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shrinking a max-distance bound by `delta` means demanding a larger
/// separation.
impl Sub<ChordAngle> for MaxDistance {
    type Output = MaxDistance;

    #[inline]
    fn sub(self, delta: ChordAngle) -> MaxDistance {
        MaxDistance(self.0 + delta)
    }
}

impl Distance for MaxDistance {
    #[inline]
    fn zero() -> Self {
        MaxDistance(ChordAngle::straight())
    }

    #[inline]
    fn infinity() -> Self {
        MaxDistance(ChordAngle::negative())
    }

    #[inline]
    fn negative() -> Self {
        MaxDistance(ChordAngle::infinity())
    }

    /// Angular radius around the reflected target that holds every edge at
    /// least this far from the target.
    /// Toward smaller separations.
    #[inline]
    fn successor(self) -> Self {
        MaxDistance(self.0.predecessor())
    }

    #[inline]
    fn angle_bound(self) -> Angle {
        (ChordAngle::straight() - self.0).to_angle()
    }
}

/// The max distance whose reflected counterpart is `dist180`.
///
/// Comparisons happen after the conversion, in the metric's own order, so two
/// edges reported at the same `MaxDistance` always compare equal.
#[inline]
fn supplement(dist180: ChordAngle) -> MaxDistance {
    MaxDistance(ChordAngle::straight() - dist180)
}

/// Furthest distance to a point.
#[derive(Debug, Clone, Copy)]
pub struct FurthestPointTarget {
    point: DVec3,
}

impl FurthestPointTarget {
    pub fn new(point: DVec3) -> Self {
        Self { point }
    }
}

impl Target<MaxDistance> for FurthestPointTarget {
    fn max_brute_force_edges(&self) -> usize {
        100
    }

    fn cap_bound(&self) -> Cap {
        Cap::from_point(-self.point)
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, max_dist: &mut MaxDistance) -> bool {
        let dist180 = get_distance(-self.point, v0, v1);
        update_min(supplement(dist180), max_dist)
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, max_dist: &mut MaxDistance) -> bool {
        let dist = MaxDistance(ChordAngle::straight() - cell.cap_bound().distance(-self.point));
        if *max_dist < dist {
            return false;
        }
        *max_dist = dist;
        true
    }

    /// Polygons containing the antipode reach the full 180 degrees.
    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        visit_shapes_containing(index, -self.point, visitor)
    }
}

/// Furthest distance to a geodesic edge.
#[derive(Debug, Clone, Copy)]
pub struct FurthestEdgeTarget {
    a: DVec3,
    b: DVec3,
}

impl FurthestEdgeTarget {
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self { a, b }
    }
}

impl Target<MaxDistance> for FurthestEdgeTarget {
    fn max_brute_force_edges(&self) -> usize {
        60
    }

    fn cap_bound(&self) -> Cap {
        edge_cap(-self.a, -self.b)
    }

    fn update_min_distance_to_edge(&self, v0: DVec3, v1: DVec3, max_dist: &mut MaxDistance) -> bool {
        let mut dist180 = ChordAngle::infinity();
        update_edge_pair_min_distance(-self.a, -self.b, v0, v1, &mut dist180);
        update_min(supplement(dist180), max_dist)
    }

    fn update_min_distance_to_cell(&self, cell: &IndexCell, max_dist: &mut MaxDistance) -> bool {
        let reflected = cell.cap_bound().distance_to_edge(-self.a, -self.b);
        let dist = MaxDistance(ChordAngle::straight() - reflected);
        if *max_dist < dist {
            return false;
        }
        *max_dist = dist;
        true
    }

    fn visit_containing_shapes(
        &self,
        index: &ShapeIndex,
        visitor: &mut dyn FnMut(ShapeId) -> bool,
    ) -> bool {
        visit_shapes_containing(index, -edge_reference_point(self.a, self.b), visitor)
    }
}

/// Finds the edges of an index furthest from a target.
///
/// ```
/// use s2_edge_query::textformat::{make_index, make_point};
/// use s2_edge_query::{FurthestEdgeQuery, FurthestPointTarget};
///
/// let index = make_index("0:0 | 0:90 | 0:-170 # #");
/// let mut query = FurthestEdgeQuery::new(&index);
/// let furthest = query.find_furthest_edge(&FurthestPointTarget::new(make_point("0:0"))).unwrap();
/// assert_eq!(furthest.edge_id, Some(2));
/// ```
#[derive(Debug)]
pub struct FurthestEdgeQuery<'a> {
    base: ClosestEdgeQueryBase<'a, MaxDistance>,
    options: Options<MaxDistance>,
}

impl<'a> FurthestEdgeQuery<'a> {
    pub fn new(index: &'a ShapeIndex) -> Self {
        Self::with_options(index, Options::default())
    }

    pub fn with_options(index: &'a ShapeIndex, options: Options<MaxDistance>) -> Self {
        Self {
            base: ClosestEdgeQueryBase::new(index),
            options,
        }
    }

    pub fn index(&self) -> &'a ShapeIndex {
        self.base.index()
    }

    pub fn options(&self) -> &Options<MaxDistance> {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options<MaxDistance> {
        &mut self.options
    }

    pub fn last_stats(&self) -> SearchStats {
        self.base.last_stats()
    }

    /// Edges sorted from furthest to nearest.
    pub fn find_furthest_edges<T>(&mut self, target: &T) -> Vec<QueryResult<MaxDistance>>
    where
        T: Target<MaxDistance> + ?Sized,
    {
        self.base.find_closest_edges(target, &self.options)
    }

    pub fn find_furthest_edge<T>(&mut self, target: &T) -> Option<QueryResult<MaxDistance>>
    where
        T: Target<MaxDistance> + ?Sized,
    {
        let options = self.options.with_max_edges(1);
        self.base.find_closest_edges(target, &options).into_iter().next()
    }

    /// Largest distance to any edge, or the negative chord angle when the index
    /// has none in range.
    pub fn get_max_distance<T>(&mut self, target: &T) -> ChordAngle
    where
        T: Target<MaxDistance> + ?Sized,
    {
        self.find_furthest_edge(target)
            .map_or(ChordAngle::negative(), |r| r.distance.chord_angle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s2_index::LatLng;

    fn ll(lat: f64, lng: f64) -> DVec3 {
        LatLng::from_degrees(lat, lng).to_point()
    }

    #[test]
    fn test_sentinel_ordering() {
        let d = MaxDistance::from_degrees(30.0);
        assert!(MaxDistance::negative() < MaxDistance::zero());
        assert!(MaxDistance::zero() <= d);
        assert!(d < MaxDistance::infinity());
        assert!(MaxDistance::zero() < MaxDistance::from_degrees(179.0));
        assert!(MaxDistance::from_degrees(0.0) < MaxDistance::infinity());
    }

    #[test]
    fn test_order_is_reversed() {
        assert!(MaxDistance::from_degrees(90.0) < MaxDistance::from_degrees(10.0));
        assert_eq!(
            MaxDistance::from_degrees(20.0).cmp(&MaxDistance::from_degrees(20.0)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_subtraction_demands_larger_separation() {
        let d = MaxDistance::from_degrees(40.0);
        assert_eq!(d - ChordAngle::zero(), d);
        let shrunk = d - ChordAngle::from_degrees(5.0);
        assert!(shrunk < d);
        assert!((shrunk.0.degrees() - 45.0).abs() < 1e-9);
        assert_eq!(MaxDistance::infinity() - ChordAngle::from_degrees(5.0), MaxDistance::infinity());
        assert_eq!(MaxDistance::from_degrees(178.0) - ChordAngle::from_degrees(5.0), MaxDistance::zero());
    }

    #[test]
    fn test_successor_moves_toward_nearer() {
        let d = MaxDistance::from_degrees(120.0);
        assert!(d < d.successor());
        assert!(d.successor().0 < d.0);
        assert!(d.successor() < MaxDistance::from_degrees(119.999));
        assert_eq!(MaxDistance(ChordAngle::zero()).successor(), MaxDistance::infinity());
        assert_eq!(MaxDistance::infinity().successor(), MaxDistance::infinity());
    }

    #[test]
    fn test_angle_bound_is_supplementary() {
        let d = MaxDistance::from_degrees(150.0);
        assert!((d.angle_bound().degrees() - 30.0).abs() < 1e-9);
        assert_eq!(MaxDistance::zero().angle_bound().radians(), 0.0);
    }

    #[test]
    fn test_point_target_edge_update() {
        let target = FurthestPointTarget::new(ll(0.0, 0.0));
        let mut d = MaxDistance::infinity();
        assert!(target.update_min_distance_to_edge(ll(0.0, 100.0), ll(0.0, 100.0), &mut d));
        assert!((d.0.degrees() - 100.0).abs() < 1e-9);
        // Nearer edges cannot improve the bound; further ones do.
        assert!(!target.update_min_distance_to_edge(ll(0.0, 50.0), ll(0.0, 50.0), &mut d));
        assert!(target.update_min_distance_to_edge(ll(0.0, 120.0), ll(0.0, 130.0), &mut d));
        assert!((d.0.degrees() - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_target_crossing_antipode_is_straight() {
        let target = FurthestEdgeTarget::new(ll(0.0, -10.0), ll(0.0, 10.0));
        let mut d = MaxDistance::infinity();
        assert!(target.update_min_distance_to_edge(ll(-5.0, 180.0), ll(5.0, 180.0), &mut d));
        assert_eq!(d, MaxDistance::zero());
    }
}
