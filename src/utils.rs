//! Utilities module.

use crate::aabb::Aabb;
use crate::mesh::Element;
use crate::RmiValue;
use nalgebra::Point3;
use num_traits::Float;
use std::cmp::Ordering;

/// Fast floating point minimum.  This function matches the semantics of
///
/// ```no_compile
/// if x < y { x } else { y }
/// ```
///
/// which has efficient instruction sequences on many platforms (1 instruction on x86).  For most
/// values, it matches the semantics of `x.min(y)`; the special cases are:
///
/// ```text
/// min(-0.0, +0.0); +0.0
/// min(+0.0, -0.0): -0.0
/// min( NaN,  1.0):  1.0
/// min( 1.0,  NaN):  NaN
/// ```
///
/// Note: This exists because [`std::cmp::min`] requires Ord which floating point types do not satisfy
#[inline(always)]
pub fn fast_min<T: Copy + PartialOrd>(x: T, y: T) -> T {
    if x < y {
        x
    } else {
        y
    }
}

/// Fast floating point maximum.  This function matches the semantics of
///
/// ```no_compile
/// if x > y { x } else { y }
/// ```
///
/// which has efficient instruction sequences on many platforms (1 instruction on x86).  For most
/// values, it matches the semantics of `x.max(y)`; the special cases are:
///
/// ```text
/// max(-0.0, +0.0); +0.0
/// max(+0.0, -0.0): -0.0
/// max( NaN,  1.0):  1.0
/// max( 1.0,  NaN):  NaN
/// ```
///
/// Note: This exists because [`std::cmp::max`] requires Ord which floating point types do not satisfy
#[inline(always)]
pub fn fast_max<T: Copy + PartialOrd>(x: T, y: T) -> T {
    if x > y {
        x
    } else {
        y
    }
}

/// Concatenates the list of vectors into a single vector.
/// Drains the elements from the source `vectors`.
pub fn concatenate_vectors<T: Sized>(vectors: &mut [Vec<T>]) -> Vec<T> {
    let mut result = Vec::with_capacity(vectors.iter().map(Vec::len).sum());
    for vector in vectors.iter_mut() {
        result.append(vector);
    }
    result
}

/// Converts an element count into the float type used for cost evaluation.
/// Counts beyond the float range saturate to infinity.
#[inline]
pub fn count_to_real<T: RmiValue>(count: usize) -> T {
    T::from_usize(count).unwrap_or_else(T::infinity)
}

/// Total order on floats, as [`f64::total_cmp`]. NaNs sort after `+inf`, so sorting by
/// coordinate never panics on malformed input.
#[inline]
pub fn total_cmp<T: RmiValue>(a: T, b: T) -> Ordering {
    let widen = |x: T| x.to_f64().unwrap_or(f64::NAN);
    widen(a).total_cmp(&widen(b))
}

/// Returns true if `a` and `b` differ by at most `epsilon` on every axis.
pub fn approx_eq<T: RmiValue>(a: &Point3<T>, b: &Point3<T>, epsilon: T) -> bool {
    (0..3).all(|i| Float::abs(a[i] - b[i]) <= epsilon)
}

/// Returns the joint [`Aabb`] of the given elements.
pub fn joint_aabb_of_elements<T: RmiValue>(elements: &[Element<T>]) -> Aabb<T> {
    let mut aabb = Aabb::empty();
    for element in elements {
        aabb.join_mut(&element.aabb);
    }
    aabb
}

/// Returns the [`Aabb`] spanned by the centroids of the given elements.
pub fn centroid_bounds<T: RmiValue>(elements: &[Element<T>]) -> Aabb<T> {
    elements
        .iter()
        .fold(Aabb::empty(), |aabb, element| aabb.grow(&element.centroid))
}
