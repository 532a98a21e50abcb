use glam::DVec3;

use crate::angle::{Angle, ChordAngle};
use crate::edge_distances;

/// A spherical cap: all points within `radius` of `center`.
///
/// The radius is a [`ChordAngle`]; a negative radius denotes the empty cap and a
/// straight radius the full sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cap {
    center: DVec3,
    radius: ChordAngle,
}

impl Cap {
    pub fn new(center: DVec3, radius: ChordAngle) -> Self {
        debug_assert!(radius.is_valid());
        Self { center, radius }
    }

    pub fn from_center_angle(center: DVec3, radius: Angle) -> Self {
        Self::new(center, ChordAngle::from_angle(radius))
    }

    pub fn from_point(center: DVec3) -> Self {
        Self::new(center, ChordAngle::zero())
    }

    pub fn empty() -> Self {
        Self::new(DVec3::X, ChordAngle::negative())
    }

    pub fn full() -> Self {
        Self::new(DVec3::X, ChordAngle::straight())
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> ChordAngle {
        self.radius
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.radius.is_negative()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.radius == ChordAngle::straight()
    }

    pub fn contains(&self, p: DVec3) -> bool {
        ChordAngle::between(self.center, p) <= self.radius
    }

    pub fn intersects(&self, other: &Cap) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.radius + other.radius >= ChordAngle::between(self.center, other.center)
    }

    /// Grow the cap (keeping its center) so that it contains `p`.
    pub fn add_point(&mut self, p: DVec3) {
        if self.is_empty() {
            self.center = p;
            self.radius = ChordAngle::zero();
        } else {
            self.radius = self.radius.max(ChordAngle::between(self.center, p));
        }
    }

    /// The cap with the same center and a radius larger by `distance`.
    pub fn expanded(&self, distance: ChordAngle) -> Cap {
        if self.is_empty() {
            return *self;
        }
        Cap::new(self.center, self.radius + distance)
    }

    /// Lower bound on the distance from `p` to any point of the cap.
    ///
    /// Infinity for the empty cap.
    pub fn distance(&self, p: DVec3) -> ChordAngle {
        if self.is_empty() {
            return ChordAngle::infinity();
        }
        ChordAngle::between(self.center, p) - self.radius
    }

    /// Lower bound on the distance from the edge `ab` to any point of the cap.
    pub fn distance_to_edge(&self, a: DVec3, b: DVec3) -> ChordAngle {
        if self.is_empty() {
            return ChordAngle::infinity();
        }
        edge_distances::get_distance(self.center, a, b) - self.radius
    }

    /// Lower bound on the distance between any two points of the two caps.
    pub fn distance_to_cap(&self, other: &Cap) -> ChordAngle {
        if self.is_empty() || other.is_empty() {
            return ChordAngle::infinity();
        }
        ChordAngle::between(self.center, other.center) - self.radius - other.radius
    }
}
