// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Axis-aligned bounding box algebra, generic over the coordinate scalar so
//! the float variant (host-side geometry) and the integer variant (used by
//! a couple of quantized-grid helpers) share one implementation.

/// A coordinate type usable as an `Aabb` axis. Implemented for `f32` and
/// `i32` by [`impl_axis_scalar`] below — no per-type duplication of the
/// `Aabb` body itself.
pub trait AxisScalar: Copy + PartialOrd + PartialEq + std::fmt::Debug {
    const ZERO: Self;
    const ONE: Self;
    /// Identity for `min()` when building an empty box (plays the role of +inf).
    const POSITIVE_BOUND: Self;
    /// Identity for `max()` when building an empty box (plays the role of -inf).
    const NEGATIVE_BOUND: Self;

    fn axis_min(self, other: Self) -> Self;
    fn axis_max(self, other: Self) -> Self;
    fn axis_sub(self, other: Self) -> Self;
    fn axis_add(self, other: Self) -> Self;
    fn is_positive(self) -> bool;
    fn to_f64(self) -> f64;
}

macro_rules! impl_axis_scalar {
    ($ty:ty, $zero:expr, $one:expr, $pos_bound:expr, $neg_bound:expr) => {
        impl AxisScalar for $ty {
            const ZERO: Self = $zero;
            const ONE: Self = $one;
            const POSITIVE_BOUND: Self = $pos_bound;
            const NEGATIVE_BOUND: Self = $neg_bound;

            fn axis_min(self, other: Self) -> Self {
                if self < other { self } else { other }
            }
            fn axis_max(self, other: Self) -> Self {
                if self > other { self } else { other }
            }
            fn axis_sub(self, other: Self) -> Self {
                self - other
            }
            fn axis_add(self, other: Self) -> Self {
                self + other
            }
            fn is_positive(self) -> bool {
                self > Self::ZERO
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_axis_scalar!(f32, 0.0, 1.0, f32::INFINITY, f32::NEG_INFINITY);
impl_axis_scalar!(i32, 0, 1, i32::MAX, i32::MIN);

/// An axis-aligned bounding box over a generic coordinate scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<T: AxisScalar> {
    pub min: [T; 3],
    pub max: [T; 3],
}

impl<T: AxisScalar> Aabb<T> {
    pub const fn new(min: [T; 3], max: [T; 3]) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: [T::POSITIVE_BOUND; 3],
            max: [T::NEGATIVE_BOUND; 3],
        }
    }

    pub fn from_point(p: [T; 3]) -> Self {
        Self { min: p, max: p }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: axis_wise(self.min, other.min, T::axis_min),
            max: axis_wise(self.max, other.max, T::axis_max),
        }
    }

    pub fn expand(self, p: [T; 3]) -> Self {
        Self {
            min: axis_wise(self.min, p, T::axis_min),
            max: axis_wise(self.max, p, T::axis_max),
        }
    }

    fn extent(&self) -> [T; 3] {
        axis_wise(self.max, self.min, T::axis_sub)
    }

    /// Zero if any extent is non-positive, otherwise the product of extents.
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        if !e[0].is_positive() || !e[1].is_positive() || !e[2].is_positive() {
            return 0.0;
        }
        e[0].to_f64() * e[1].to_f64() * e[2].to_f64()
    }

    /// Largest side length, biased by one unit so degenerate (flat) boxes
    /// still produce a usable positive extent.
    pub fn max_extent(&self) -> f64 {
        let e = self.extent();
        let largest = e[0].to_f64().max(e[1].to_f64()).max(e[2].to_f64());
        largest.max(0.0) + 1.0
    }

    /// Index of the longest axis (0=x, 1=y, 2=z). Ties favor the later axis:
    /// x only wins if strictly greater than both others, otherwise y wins
    /// over z only if strictly greater.
    pub fn max_extent_axis(&self) -> usize {
        let e = self.extent();
        let (ex, ey, ez) = (e[0].to_f64(), e[1].to_f64(), e[2].to_f64());
        if ex > ey && ex > ez {
            0
        } else if ey > ez {
            1
        } else {
            2
        }
    }

    /// True if `parent` equals the componentwise union of `a` and `b` within
    /// `eps` absolute error per component.
    pub fn union_equals(parent: &Self, a: &Self, b: &Self, eps: f64) -> bool {
        let u = a.union(*b);
        (0..3).all(|i| {
            (parent.min[i].to_f64() - u.min[i].to_f64()).abs() <= eps
                && (parent.max[i].to_f64() - u.max[i].to_f64()).abs() <= eps
        })
    }
}

fn axis_wise<T: AxisScalar>(a: [T; 3], b: [T; 3], f: impl Fn(T, T) -> T) -> [T; 3] {
    [f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_grows_the_box() {
        let b = Aabb::<f32>::from_point([0.0, 0.0, 0.0]).expand([1.0, 2.0, -1.0]);
        assert_eq!(b.min, [0.0, 0.0, -1.0]);
        assert_eq!(b.max, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn volume_is_zero_for_degenerate_box() {
        let flat = Aabb::<f32>::new([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]);
        assert_eq!(flat.volume(), 0.0);
    }

    #[test]
    fn max_extent_has_unit_bias() {
        let point = Aabb::<f32>::from_point([0.0, 0.0, 0.0]);
        assert_eq!(point.max_extent(), 1.0);
    }

    #[test]
    fn max_extent_axis_tie_break_favors_later_axis() {
        let tie_yz = Aabb::<f32>::new([0.0, 0.0, 0.0], [1.0, 2.0, 2.0]);
        assert_eq!(tie_yz.max_extent_axis(), 2);

        let x_wins = Aabb::<f32>::new([0.0, 0.0, 0.0], [3.0, 2.0, 2.0]);
        assert_eq!(x_wins.max_extent_axis(), 0);
    }

    #[test]
    fn union_equals_detects_mismatch() {
        let a = Aabb::<f32>::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = Aabb::<f32>::new([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]);
        let correct_parent = Aabb::<f32>::new([0.0, 0.0, 0.0], [3.0, 1.0, 1.0]);
        assert!(Aabb::union_equals(&correct_parent, &a, &b, 1e-4));

        let wrong_parent = Aabb::<f32>::new([0.0, 0.0, 0.0], [2.9, 1.0, 1.0]);
        assert!(!Aabb::union_equals(&wrong_parent, &a, &b, 1e-4));
    }

    #[test]
    fn integer_variant_shares_the_same_operations() {
        let b = Aabb::<i32>::from_point([0, 0, 0]).expand([4, 4, 4]);
        assert_eq!(b.max_extent(), 5.0);
        assert_eq!(b.max_extent_axis(), 2);
    }
}
