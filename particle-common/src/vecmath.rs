use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Both components must lie strictly within this distance of zero for a
/// vector to count as "small". Only used to suppress drawing negligible arrows.
pub const SMALL_THRESHOLD: f64 = 5.0;

/// An immutable 2D vector. Every operation returns a new value.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    /// Creates a new Vec2.
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Builds a vector from a magnitude and an angle in radians.
    pub fn from_polar(magnitude: f64, angle: f64) -> Self {
        Vec2 { x: magnitude * angle.cos(), y: magnitude * angle.sin() }
    }

    /// Calculates the squared length (magnitude) of the vector.
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle of the vector in radians, via atan2(y, x).
    /// The zero vector has direction `0.0`.
    pub fn direction(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        self.y.atan2(self.x)
    }

    /// Calculates the dot product with another vector.
    pub fn dot(&self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Adds another vector to this vector.
    pub fn add(&self, other: Vec2) -> Self {
        Vec2 { x: self.x + other.x, y: self.y + other.y }
    }

    /// Subtracts another vector from this vector.
    pub fn sub(&self, other: Vec2) -> Self {
        Vec2 { x: self.x - other.x, y: self.y - other.y }
    }

    pub fn negate(&self) -> Self {
        Vec2 { x: -self.x, y: -self.y }
    }

    /// Scales the vector by a scalar value.
    pub fn scale(&self, scalar: f64) -> Self {
        Vec2 { x: self.x * scalar, y: self.y * scalar }
    }

    /// Divides both components by `scalar`.
    /// A zero divisor is an error rather than an infinity.
    pub fn divide(&self, scalar: f64) -> Result<Self, SimError> {
        if scalar == 0.0 {
            return Err(SimError::DivisionByZero(format!("dividing {} by zero", self)));
        }
        Ok(Vec2 { x: self.x / scalar, y: self.y / scalar })
    }

    /// True when both components are within [`SMALL_THRESHOLD`] of zero.
    pub fn is_small(&self) -> bool {
        self.is_small_within(SMALL_THRESHOLD)
    }

    pub fn is_small_within(&self, threshold: f64) -> bool {
        self.x.abs() < threshold && self.y.abs() < threshold
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.magnitude();
        write!(f, "{} î + {} ĵ; r = {}", self.x, self.y, r)?;
        if r != 0.0 {
            write!(f, "; θ = {}°", self.direction().to_degrees())?;
        }
        Ok(())
    }
}

// Implement standard operators for convenience
impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-9;

    #[test]
    fn polar_round_trip_recovers_magnitude_and_direction() {
        for &(mag, angle) in &[(1.0, 0.0), (3.5, PI / 3.0), (10.0, -2.0), (0.25, 3.0)] {
            let v = Vec2::from_polar(mag, angle);
            assert!((v.magnitude() - mag).abs() < EPS, "magnitude for {:?}", (mag, angle));
            assert!((v.direction() - angle).abs() < EPS, "direction for {:?}", (mag, angle));
        }
    }

    #[test]
    fn zero_vector_direction_is_zero() {
        assert_eq!(Vec2::ZERO.direction(), 0.0);
        assert_eq!(Vec2::from_polar(0.0, 1.2).magnitude(), 0.0);
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let v = Vec2::new(1.0, 2.0);
        assert!(matches!(v.divide(0.0), Err(SimError::DivisionByZero(_))));
        assert_eq!(v.divide(2.0).unwrap(), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn arithmetic_matches_operators() {
        let a = Vec2::new(1.0, -2.0);
        let b = Vec2::new(4.0, 0.5);
        assert_eq!(a.add(b), a + b);
        assert_eq!(a.sub(b), a - b);
        assert_eq!(a.negate(), -a);
        assert_eq!(a.scale(3.0), a * 3.0);
        assert_eq!(a.dot(b), 3.0);
        assert_eq!(Vec2::new(3.0, 4.0).magnitude(), 5.0);
    }

    #[test]
    fn is_small_requires_both_components_under_threshold() {
        assert!(Vec2::new(4.9, -4.9).is_small());
        assert!(!Vec2::new(5.0, 0.0).is_small());
        assert!(!Vec2::new(0.0, -6.0).is_small());
        assert!(Vec2::new(0.5, 0.5).is_small_within(1.0));
    }
}
