//! 2D Vector
//!
//! Value-type geometry for positions and displacements on the playfield.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

/// 2D vector with `f64` components.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x as f64,
            y: y as f64,
        }
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        self / len
    }

    /// Rescale to the given length, keeping direction.
    ///
    /// A zero vector has no direction, so it stays ZERO whatever the
    /// requested length. Callers that must separate coincident points pick
    /// their own direction first.
    #[inline]
    pub fn resized_to(self, length: f64) -> Self {
        self.normalize() * length
    }

    /// Move toward `target` by at most `max_distance`.
    ///
    /// Returns `target` itself when it is already within reach.
    #[inline]
    pub fn towards(self, target: Self, max_distance: f64) -> Self {
        let offset = target - self;
        if offset.length() <= max_distance {
            return target;
        }
        self + offset.resized_to(max_distance)
    }

    /// Clamp into the rectangle `[x_min, x_max] x [y_min, y_max]`.
    #[inline]
    pub fn clamp_within(self, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x: self.x.max(x_min).min(x_max),
            y: self.y.max(y_min).min(y_max),
        }
    }

    /// Point reflection through `center`.
    #[inline]
    pub fn reflect_through(self, center: Self) -> Self {
        center * 2.0 - self
    }

    /// Components truncated toward zero, as sent over the wire.
    #[inline]
    pub fn to_ints(self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

// Operator overloads for ergonomics
impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a + b, Vec2::new(4.0, 6.0));
        assert_eq!(a - b, Vec2::new(2.0, 2.0));
        assert_eq!(a * 2.0, Vec2::new(6.0, 8.0));
        assert_eq!(a / 2.0, Vec2::new(1.5, 2.0));
        assert_eq!(-a, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_vec2_distance() {
        // 3-4-5 triangle
        let a = Vec2::ZERO;
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.length(), 5.0);
    }

    #[test]
    fn test_resized_to() {
        let v = Vec2::new(3.0, 4.0).resized_to(10.0);
        assert!((v.x - 6.0).abs() < 1e-12);
        assert!((v.y - 8.0).abs() < 1e-12);

        // Degenerate input has no direction
        assert_eq!(Vec2::ZERO.resized_to(5.0), Vec2::ZERO);
    }

    #[test]
    fn test_towards_clamps_to_max_distance() {
        let start = Vec2::ZERO;
        let target = Vec2::new(100.0, 0.0);

        let moved = start.towards(target, 30.0);
        assert!((moved.x - 30.0).abs() < 1e-12);
        assert_eq!(moved.y, 0.0);

        // Close enough: land exactly on target
        assert_eq!(start.towards(target, 150.0), target);
        assert_eq!(target.towards(target, 10.0), target);
    }

    #[test]
    fn test_clamp_within() {
        let inside = Vec2::new(10.0, 20.0);
        assert_eq!(inside.clamp_within(0.0, 100.0, 0.0, 100.0), inside);

        let outside = Vec2::new(-5.0, 500.0);
        assert_eq!(outside.clamp_within(0.0, 100.0, 0.0, 100.0), Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_reflect_through() {
        let center = Vec2::new(960.0, 500.0);
        let p = Vec2::new(100.0, 200.0);
        assert_eq!(p.reflect_through(center), Vec2::new(1820.0, 800.0));
        assert_eq!(p.reflect_through(center).reflect_through(center), p);
    }

    #[test]
    fn test_to_ints_truncates() {
        assert_eq!(Vec2::new(10.9, -3.7).to_ints(), (10, -3));
    }
}
