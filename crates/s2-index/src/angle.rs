//! Angle representations.
//!
//! [`ChordAngle`] stores the squared chord length between two unit vectors. It is
//! cheap to compute from points (no trigonometry) and totally ordered, which makes
//! it the natural representation for distance comparisons.

use glam::DVec3;
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::ops::{Add, Neg, Sub};

/// A one-dimensional angle, stored in radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    #[inline]
    pub const fn from_radians(radians: f64) -> Self {
        Angle(radians)
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Self {
        Angle(degrees * (PI / 180.0))
    }

    #[inline]
    pub fn infinity() -> Self {
        Angle(f64::INFINITY)
    }

    /// Angle between two (not necessarily unit length) vectors.
    #[inline]
    pub fn between(a: DVec3, b: DVec3) -> Self {
        Angle(a.cross(b).length().atan2(a.dot(b)))
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0 * (180.0 / PI)
    }
}

impl Add for Angle {
    type Output = Angle;

    #[inline]
    fn add(self, other: Angle) -> Angle {
        Angle(self.0 + other.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    #[inline]
    fn sub(self, other: Angle) -> Angle {
        Angle(self.0 - other.0)
    }
}

impl Neg for Angle {
    type Output = Angle;

    #[inline]
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// Largest squared chord length between two unit vectors (antipodal points).
const MAX_LENGTH2: f64 = 4.0;

/// An angle represented as the squared length of the chord it subtends on the
/// unit sphere.
///
/// Valid values lie in `[0, 4]`. Two special values extend the range:
/// [`ChordAngle::negative`] sorts before every valid angle and
/// [`ChordAngle::infinity`] sorts after every valid angle.
///
/// Ordering uses `f64::total_cmp`, so the type is `Ord` and can be used as a
/// heap or B-tree key directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordAngle {
    length2: f64,
}

impl ChordAngle {
    #[inline]
    pub const fn zero() -> Self {
        ChordAngle { length2: 0.0 }
    }

    /// 90 degrees.
    #[inline]
    pub const fn right() -> Self {
        ChordAngle { length2: 2.0 }
    }

    /// 180 degrees.
    #[inline]
    pub const fn straight() -> Self {
        ChordAngle {
            length2: MAX_LENGTH2,
        }
    }

    /// Smaller than any valid angle.
    #[inline]
    pub const fn negative() -> Self {
        ChordAngle { length2: -1.0 }
    }

    /// Larger than any valid angle.
    #[inline]
    pub const fn infinity() -> Self {
        ChordAngle {
            length2: f64::INFINITY,
        }
    }

    /// Construct from a squared chord length, clamped to at most 180 degrees.
    #[inline]
    pub fn from_length2(length2: f64) -> Self {
        // Canonicalize -0.0 so the total order agrees with the numeric one.
        let length2 = if length2 == 0.0 { 0.0 } else { length2 };
        ChordAngle {
            length2: length2.min(MAX_LENGTH2),
        }
    }

    /// Angle between two unit vectors.
    #[inline]
    pub fn between(a: DVec3, b: DVec3) -> Self {
        Self::from_length2((a - b).length_squared())
    }

    pub fn from_angle(angle: Angle) -> Self {
        let radians = angle.radians();
        if radians < 0.0 {
            Self::negative()
        } else if radians == f64::INFINITY {
            Self::infinity()
        } else {
            // The chord length is 2 * sin(angle / 2).
            let length = 2.0 * (0.5 * radians.min(PI)).sin();
            ChordAngle {
                length2: length * length,
            }
        }
    }

    #[inline]
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_angle(Angle::from_degrees(degrees))
    }

    pub fn to_angle(self) -> Angle {
        if self.is_negative() {
            Angle::from_radians(-1.0)
        } else if self.is_infinity() {
            Angle::infinity()
        } else {
            Angle::from_radians(2.0 * (0.5 * self.length2.sqrt()).asin())
        }
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.to_angle().degrees()
    }

    #[inline]
    pub fn length2(self) -> f64 {
        self.length2
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.length2 == 0.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.length2 < 0.0
    }

    #[inline]
    pub fn is_infinity(self) -> bool {
        self.length2 == f64::INFINITY
    }

    #[inline]
    pub fn is_special(self) -> bool {
        self.is_negative() || self.is_infinity()
    }

    /// True for values in `[0, 4]` and the two special values.
    pub fn is_valid(self) -> bool {
        (self.length2 >= 0.0 && self.length2 <= MAX_LENGTH2) || self.is_special()
    }

    /// Smallest representable angle larger than this one.
    ///
    /// Negative steps to zero and 180 degrees steps to infinity, so `x < y`
    /// is equivalent to `x.successor() <= y`.
    pub fn successor(self) -> Self {
        if self.length2 >= MAX_LENGTH2 {
            Self::infinity()
        } else if self.length2 < 0.0 {
            Self::zero()
        } else {
            // Non-negative finite floats order like their bit patterns.
            ChordAngle {
                length2: f64::from_bits(self.length2.to_bits() + 1),
            }
        }
    }

    /// Largest representable angle smaller than this one.
    pub fn predecessor(self) -> Self {
        if self.length2 <= 0.0 {
            Self::negative()
        } else if self.length2 > MAX_LENGTH2 {
            Self::straight()
        } else {
            ChordAngle {
                length2: f64::from_bits(self.length2.to_bits() - 1),
            }
        }
    }
}

impl PartialEq for ChordAngle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChordAngle {}

impl PartialOrd for ChordAngle {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChordAngle {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.length2.total_cmp(&other.length2)
    }
}

/// Angle addition, saturating at 180 degrees.
///
/// Special values on the left pass through unchanged; adding a negative or zero
/// angle is the identity.
impl Add for ChordAngle {
    type Output = ChordAngle;

    fn add(self, other: ChordAngle) -> ChordAngle {
        if self.is_special() || other.length2 <= 0.0 {
            return self;
        }
        let (a2, b2) = (self.length2, other.length2);
        if a2 + b2 >= MAX_LENGTH2 {
            return Self::straight();
        }
        // With chord lengths a, b and half-angles A, B:
        // (a + b)^2 in chord space is a^2 (1 - b^2/4) + b^2 (1 - a^2/4) + 2 sqrt(..)
        let x = a2 * (1.0 - 0.25 * b2);
        let y = b2 * (1.0 - 0.25 * a2);
        Self::from_length2(x + y + 2.0 * (x * y).sqrt())
    }
}

/// Angle subtraction, saturating at zero.
///
/// Special values on the left pass through unchanged; subtracting a negative or
/// zero angle is the identity.
impl Sub for ChordAngle {
    type Output = ChordAngle;

    fn sub(self, other: ChordAngle) -> ChordAngle {
        if self.is_special() || other.length2 <= 0.0 {
            return self;
        }
        let (a2, b2) = (self.length2, other.length2);
        if a2 <= b2 {
            return Self::zero();
        }
        let x = a2 * (1.0 - 0.25 * b2);
        let y = b2 * (1.0 - 0.25 * a2);
        Self::from_length2((x + y - 2.0 * (x * y).sqrt()).max(0.0))
    }
}
