//! Distance metrics the search engine is generic over.

use std::fmt::Debug;
use std::ops::Sub;

use s2_index::{Angle, ChordAngle};

/// An ordered distance value.
///
/// The engine only ever compares distances, shrinks them by an angular error
/// tolerance, and converts them to an angular bound, so any type honoring this
/// contract can drive it:
///
/// - `negative() < zero() <= d < infinity()` for every finite `d`;
/// - `d - delta` is monotonic in both operands (a larger `delta` never yields a
///   larger result), and `d - ChordAngle::zero() == d`;
/// - if the true distance is at most `d`, the true angular separation is at most
///   `angle_bound(d)`;
/// - nothing lies strictly between `d` and `d.successor()`, so a strict bound of
///   `d.successor()` admits exactly the distances `<= d`.
pub trait Distance: Copy + Ord + Debug + Sub<ChordAngle, Output = Self> {
    fn zero() -> Self;
    fn infinity() -> Self;
    fn negative() -> Self;

    /// The next distance in this metric's order. `infinity()` maps to itself.
    fn successor(self) -> Self;

    /// Upper bound on the angular separation implied by this distance.
    fn angle_bound(self) -> Angle;
}

/// The ordinary minimum distance: the angle between the closest points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MinDistance(pub ChordAngle);

impl MinDistance {
    #[inline]
    pub fn chord_angle(self) -> ChordAngle {
        self.0
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Self {
        MinDistance(ChordAngle::from_degrees(degrees))
    }
}

impl From<ChordAngle> for MinDistance {
    fn from(c: ChordAngle) -> Self {
        MinDistance(c)
    }
}

impl From<MinDistance> for ChordAngle {
    fn from(d: MinDistance) -> Self {
        d.0
    }
}

impl Sub<ChordAngle> for MinDistance {
    type Output = MinDistance;

    #[inline]
    fn sub(self, delta: ChordAngle) -> MinDistance {
        MinDistance(self.0 - delta)
    }
}

impl Distance for MinDistance {
    #[inline]
    fn zero() -> Self {
        MinDistance(ChordAngle::zero())
    }

    #[inline]
    fn infinity() -> Self {
        MinDistance(ChordAngle::infinity())
    }

    #[inline]
    fn negative() -> Self {
        MinDistance(ChordAngle::negative())
    }

    #[inline]
    fn successor(self) -> Self {
        MinDistance(self.0.successor())
    }

    #[inline]
    fn angle_bound(self) -> Angle {
        self.0.to_angle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_ordering() {
        let d = MinDistance::from_degrees(12.0);
        assert!(MinDistance::negative() < MinDistance::zero());
        assert!(MinDistance::zero() <= d);
        assert!(d < MinDistance::infinity());
        assert!(MinDistance::from_degrees(180.0) < MinDistance::infinity());
    }

    #[test]
    fn test_subtraction_contract() {
        let a = MinDistance::from_degrees(10.0);
        let b = ChordAngle::from_degrees(3.0);
        assert_eq!(a - ChordAngle::zero(), a);
        assert!(((a - b).0.degrees() - 7.0).abs() < 1e-9);
        // Monotonic: larger minuend, larger result; larger delta, smaller result.
        assert!(MinDistance::from_degrees(11.0) - b > a - b);
        assert!(a - ChordAngle::from_degrees(4.0) < a - b);
        assert_eq!(MinDistance::infinity() - b, MinDistance::infinity());
        assert_eq!(MinDistance::from_degrees(3.0) - ChordAngle::from_degrees(10.0), MinDistance::zero());
    }

    #[test]
    fn test_successor_is_adjacent() {
        let d = MinDistance::from_degrees(30.0);
        assert!(d < d.successor());
        assert!(MinDistance::from_degrees(30.001) > d.successor());
        assert_eq!(MinDistance::infinity().successor(), MinDistance::infinity());
    }

    #[test]
    fn test_angle_bound_is_identity() {
        let d = MinDistance::from_degrees(25.0);
        assert!((d.angle_bound().degrees() - 25.0).abs() < 1e-9);
        assert_eq!(MinDistance::infinity().angle_bound(), Angle::infinity());
    }
}
