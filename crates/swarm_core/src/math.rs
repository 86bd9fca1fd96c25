//! Fixed-point math utilities for map geometry.
//!
//! Distances, probe rays and proximity checks all use fixed-point
//! arithmetic so that the same snapshot always yields the same
//! placement candidates, independent of the host CPU.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all geometry.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole map coordinates.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// True when `other` lies strictly inside `radius` of this point.
    #[must_use]
    pub fn is_closer_than(self, radius: Fixed, other: Self) -> bool {
        self.distance_squared(other) < radius.saturating_mul(radius)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x
            .saturating_mul(other.x)
            .saturating_add(self.y.saturating_mul(other.y))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x.saturating_mul(factor), self.y.saturating_mul(factor))
    }

    /// Normalize vector using fixed-point math.
    ///
    /// Components are first divided by the larger magnitude, so the squared
    /// length stays within `[1, 2]` however far apart the endpoints are.
    #[must_use]
    pub fn normalize(self) -> Self {
        let largest = self.x.saturating_abs().max(self.y.saturating_abs());
        if largest == Fixed::ZERO {
            return Self::ZERO;
        }

        let shrunk = Self::new(self.x / largest, self.y / largest);
        let len = fixed_sqrt(shrunk.dot(shrunk));
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(shrunk.x / len, shrunk.y / len)
    }

    /// Point `distance` units from this one along the ray toward `target`.
    ///
    /// Returns `self` unchanged when both points coincide.
    #[must_use]
    pub fn towards(self, target: Self, distance: Fixed) -> Self {
        self + (target - self).normalize().scale(distance)
    }
}

/// Computes the square root of a fixed-point number using binary search.
fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..48 {
        let mid = low + (high - low) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epsilon() -> Fixed {
        Fixed::from_num(1) / Fixed::from_num(1000)
    }

    #[test]
    fn test_distance_pythagorean() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
        assert!((fixed_sqrt(a.distance_squared(b)) - Fixed::from_num(5)).abs() < epsilon());
    }

    #[test]
    fn test_is_closer_than_is_strict() {
        let origin = Vec2Fixed::ZERO;
        let edge = Vec2Fixed::from_ints(15, 0);
        assert!(!origin.is_closer_than(Fixed::from_num(15), edge));
        assert!(origin.is_closer_than(Fixed::from_num(16), edge));
    }

    #[test]
    fn test_towards_walks_along_ray() {
        let base = Vec2Fixed::from_ints(10, 10);
        let center = Vec2Fixed::from_ints(10, 50);
        let probe = base.towards(center, Fixed::from_num(4));

        assert!((probe.x - Fixed::from_num(10)).abs() < epsilon());
        assert!((probe.y - Fixed::from_num(14)).abs() < epsilon());
    }

    #[test]
    fn test_towards_same_point_is_identity() {
        let p = Vec2Fixed::from_ints(7, -3);
        assert_eq!(p.towards(p, Fixed::from_num(9)), p);
    }

    #[test]
    fn test_towards_across_distant_points() {
        let west = Vec2Fixed::from_ints(-60_000, 0);
        let east = Vec2Fixed::from_ints(60_000, 0);
        let probe = west.towards(east, Fixed::from_num(4));

        assert!((probe.x - Fixed::from_num(-59_996)).abs() < epsilon());
        assert!(probe.y.abs() < epsilon());
        assert_eq!(west.distance_squared(east), Fixed::MAX);
    }

    #[test]
    fn test_sqrt_of_max_does_not_overflow() {
        let root = fixed_sqrt(Fixed::MAX);
        assert!(root > Fixed::from_num(46_340));
        assert!(root < Fixed::from_num(46_341));
    }

    #[test]
    fn test_normalize_diagonal() {
        let norm = Vec2Fixed::from_ints(3, 4).normalize();
        let len_sq = norm.dot(norm);
        assert!((len_sq - Fixed::from_num(1)).abs() < epsilon());
    }
}
