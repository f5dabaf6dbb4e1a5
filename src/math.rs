
//! Simple math utilities.

use std::ops::{Add, Div, Mul, Sub};

/// Simple two-dimensional vector of any numerical type.
/// Supports only the absolutely required operations.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Vec2<T>(pub T, pub T);

impl<T> Vec2<T> {

    /// Returns the vector with the maximum of both values.
    pub fn max(self, other: Self) -> Self where T: Ord {
        Vec2(self.0.max(other.0), self.1.max(other.1))
    }

    /// The first component of this 2D vector.
    #[inline] pub fn x(self) -> T { self.0 }

    /// The second component of this 2D vector.
    #[inline] pub fn y(self) -> T { self.1 }

    /// The first component of this 2D vector, when it is used as a resolution.
    #[inline] pub fn width(self) -> T { self.0 }

    /// The second component of this 2D vector, when it is used as a resolution.
    #[inline] pub fn height(self) -> T { self.1 }
}

impl Vec2<usize> {

    /// Returns the product of the two components,
    /// interpreting them as the dimensions of a rectangle.
    #[inline]
    pub fn area(self) -> usize {
        self.0 * self.1
    }
}

impl<T: Add<T>> Add<Vec2<T>> for Vec2<T> {
    type Output = Vec2<T::Output>;
    fn add(self, other: Vec2<T>) -> Self::Output {
        Vec2(self.0 + other.0, self.1 + other.1)
    }
}

impl<T: Sub<T>> Sub<Vec2<T>> for Vec2<T> {
    type Output = Vec2<T::Output>;
    fn sub(self, other: Vec2<T>) -> Self::Output {
        Vec2(self.0 - other.0, self.1 - other.1)
    }
}

impl<T: Mul<T> + Copy> Mul<T> for Vec2<T> {
    type Output = Vec2<T::Output>;
    fn mul(self, factor: T) -> Self::Output {
        Vec2(self.0 * factor, self.1 * factor)
    }
}

impl<T: Div<T> + Copy> Div<T> for Vec2<T> {
    type Output = Vec2<T::Output>;
    fn div(self, divisor: T) -> Self::Output {
        Vec2(self.0 / divisor, self.1 / divisor)
    }
}

impl<T> From<(T, T)> for Vec2<T> {
    fn from((x, y): (T, T)) -> Self { Vec2(x, y) }
}
