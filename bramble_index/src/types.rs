// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// The box spans `min..max` on both axes. Whether the max edge is inclusive
/// depends on the predicate used: [`Aabb2D::intersect`] and
/// [`Aabb2D::contains_point`] are closed (used for candidate queries), while
/// [`Aabb2D::overlaps`] is strict (used for exact collision).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from origin and size.
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: T::add(x, w),
            max_y: T::add(y, h),
        }
    }

    /// Width of the box (`max_x - min_x`).
    pub fn width(&self) -> T {
        T::sub(self.max_x, self.min_x)
    }

    /// Height of the box (`max_y - min_y`).
    pub fn height(&self) -> T {
        T::sub(self.max_y, self.min_y)
    }

    /// The same box moved by `(dx, dy)`.
    pub fn translate(&self, dx: T, dy: T) -> Self {
        Self {
            min_x: T::add(self.min_x, dx),
            min_y: T::add(self.min_y, dy),
            max_x: T::add(self.max_x, dx),
            max_y: T::add(self.max_y, dy),
        }
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }

    /// True if `other` lies entirely inside `self` (edges inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Strict overlap test: boxes sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        lt(self.min_x, other.max_x)
            && lt(other.min_x, self.max_x)
            && lt(self.min_y, other.max_y)
            && lt(other.min_y, self.max_y)
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && le(x, self.max_x) && le(y, self.max_y)
    }

    /// The intersection of two AABBs.
    pub fn intersect(&self, other: &Self) -> Self {
        let min_x = max_t(self.min_x, other.min_x);
        let min_y = max_t(self.min_y, other.min_y);
        let max_x = min_t(self.max_x, other.max_x);
        let max_y = min_t(self.max_y, other.max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Return true if the AABB is empty or inverted (no area). Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

/// Numeric scalar abstraction for 2D AABBs used by backends.
///
/// Only the handful of operations the quadtree needs to split space.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Midpoint between a and b.
    fn mid(a: Self, b: Self) -> Self;
}

impl Scalar for f32 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }
}

impl Scalar for f64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }
}

impl Scalar for i64 {
    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_intersect_but_do_not_overlap() {
        let a = Aabb2D::<i64>::from_xywh(0, 0, 3, 3);
        let b = Aabb2D::<i64>::from_xywh(3, 0, 2, 3);
        assert!(!a.intersect(&b).is_empty(), "closed intersection sees the shared edge");
        assert!(!a.overlaps(&b), "strict overlap ignores a shared edge");
        assert!(a.overlaps(&b.translate(-1, 0)));
    }

    #[test]
    fn union_and_contains() {
        let a = Aabb2D::<i64>::new(0, 0, 2, 2);
        let b = Aabb2D::<i64>::new(5, -1, 6, 1);
        let u = a.union(&b);
        assert_eq!(u, Aabb2D::new(0, -1, 6, 2));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&u));
        assert_eq!(u.width(), 6);
        assert_eq!(u.height(), 3);
    }

    #[test]
    fn midpoint_of_negative_i64_rounds_down() {
        assert_eq!(i64::mid(-3, 0), -2);
        assert_eq!(i64::mid(i64::MIN, i64::MAX), -1);
    }
}
