//! Axis Aligned Bounding Boxes.

use crate::axis::Axis;
use crate::utils::{fast_max, fast_min};
use crate::RmiValue;
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::ops::{Add, AddAssign, Index};

/// [`Aabb`] struct.
///
/// The empty box has every `min` component at positive infinity and every `max`
/// component at negative infinity, so joining anything into it yields that thing.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb<T: RmiValue> {
    /// Minimum coordinates
    pub min: Point3<T>,

    /// Maximum coordinates
    pub max: Point3<T>,
}

impl<T: RmiValue> fmt::Display for Aabb<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// A trait implemented by things which can be bounded by an [`Aabb`].
pub trait Bounded<T: RmiValue> {
    /// Returns the geometric bounds of this object in the form of an [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::{Aabb, Bounded};
    /// use nalgebra::Point3;
    ///
    /// struct Something;
    ///
    /// impl Bounded<f32> for Something {
    ///     fn aabb(&self) -> Aabb<f32> {
    ///         let point1 = Point3::new(0.0, 0.0, 0.0);
    ///         let point2 = Point3::new(1.0, 1.0, 1.0);
    ///         Aabb::with_bounds(point1, point2)
    ///     }
    /// }
    ///
    /// let something = Something;
    /// let aabb = something.aabb();
    ///
    /// assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
    /// assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
    /// ```
    fn aabb(&self) -> Aabb<T>;
}

impl<T: RmiValue, B: Bounded<T>> Bounded<T> for &B {
    fn aabb(&self) -> Aabb<T> {
        B::aabb(self)
    }
}

impl<T: RmiValue> Aabb<T> {
    /// Creates a new [`Aabb`] with the given bounds.
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// assert_eq!(aabb.min.x, -1.0);
    /// assert_eq!(aabb.max.z, 1.0);
    /// ```
    pub fn with_bounds(min: Point3<T>, max: Point3<T>) -> Aabb<T> {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    ///
    /// let aabb = Aabb::<f32>::empty();
    /// assert!(aabb.is_empty());
    /// assert!(aabb.min.x > aabb.max.x);
    /// ```
    pub fn empty() -> Aabb<T> {
        let inf = T::infinity();
        let neg_inf = T::neg_infinity();
        Aabb {
            min: Point3::new(inf, inf, inf),
            max: Point3::new(neg_inf, neg_inf, neg_inf),
        }
    }

    /// Returns true if the [`Point3`] is inside the [`Aabb`].
    pub fn contains(&self, p: &Point3<T>) -> bool {
        Axis::ALL
            .iter()
            .all(|axis| p[axis.index()] >= self.min[axis.index()] && p[axis.index()] <= self.max[axis.index()])
    }

    /// Returns true if `other` lies inside this [`Aabb`], allowing each bound to
    /// overshoot by up to `epsilon`. An empty `other` is contained in anything.
    pub fn approx_contains_aabb_eps(&self, other: &Aabb<T>, epsilon: T) -> bool {
        if other.is_empty() {
            return true;
        }
        Axis::ALL.iter().all(|axis| {
            let i = axis.index();
            other.min[i] - self.min[i] > -epsilon && other.max[i] - self.max[i] < epsilon
        })
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and `other`.
    /// The result is the convex hull of the both [`Aabb`]s.
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb1 = Aabb::with_bounds(Point3::new(-101.0, 0.0, 0.0), Point3::new(-100.0, 1.0, 1.0));
    /// let aabb2 = Aabb::with_bounds(Point3::new(100.0, 0.0, 0.0), Point3::new(101.0, 1.0, 1.0));
    /// let joint = aabb1.join(&aabb2);
    ///
    /// assert!(joint.contains(&Point3::new(0.0, 0.5, 0.5)));
    /// assert!(joint.contains(&Point3::new(-100.5, 0.5, 0.5)));
    /// assert!(!joint.contains(&Point3::new(0.0, 1.5, 0.5)));
    /// ```
    pub fn join(&self, other: &Aabb<T>) -> Aabb<T> {
        Aabb::with_bounds(
            Point3::new(
                fast_min(self.min.x, other.min.x),
                fast_min(self.min.y, other.min.y),
                fast_min(self.min.z, other.min.z),
            ),
            Point3::new(
                fast_max(self.max.x, other.max.x),
                fast_max(self.max.y, other.max.y),
                fast_max(self.max.z, other.max.z),
            ),
        )
    }

    /// Mutable version of [`Aabb::join`].
    pub fn join_mut(&mut self, other: &Aabb<T>) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and the point `other`.
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let point1 = Point3::new(0.0, 0.0, 0.0);
    /// let point2 = Point3::new(1.0, 1.0, 1.0);
    /// let aabb = Aabb::empty().grow(&point1).grow(&point2);
    ///
    /// assert!(aabb.contains(&Point3::new(0.5, 0.5, 0.5)));
    /// assert!(!aabb.contains(&Point3::new(1.5, 0.5, 0.5)));
    /// ```
    pub fn grow(&self, other: &Point3<T>) -> Aabb<T> {
        self.join(&Aabb::with_bounds(*other, *other))
    }

    /// Mutable version of [`Aabb::grow`].
    pub fn grow_mut(&mut self, other: &Point3<T>) {
        *self = self.grow(other);
    }

    /// Returns true if this box has a negative extent on any axis.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the size of this [`Aabb`] in all three dimensions.
    pub fn size(&self) -> Vector3<T> {
        self.max - self.min
    }

    /// Returns the center [`Point3`] of the [`Aabb`].
    pub fn center(&self) -> Point3<T> {
        let two = T::one() + T::one();
        self.min + self.size() / two
    }

    /// Returns the volume of this [`Aabb`]. Flat boxes have zero volume and the
    /// empty box is reported as zero as well.
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    /// use nalgebra::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
    /// assert_eq!(aabb.volume(), 24.0);
    /// ```
    pub fn volume(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Returns the total surface area of this [`Aabb`], zero for the empty box.
    pub fn surface_area(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }
        let size = self.size();
        let two = T::one() + T::one();
        two * (size.x * size.y + size.x * size.z + size.y * size.z)
    }

    /// Returns the axis along which the [`Aabb`] is stretched the most.
    pub fn largest_axis(&self) -> Axis {
        let size = self.size();
        if size.x > size.y && size.x > size.z {
            Axis::X
        } else if size.y > size.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

/// Default instance for [`Aabb`]s. Returns an [`Aabb`] which is [`empty()`].
///
/// [`empty()`]: #method.empty
impl<T: RmiValue> Default for Aabb<T> {
    fn default() -> Aabb<T> {
        Aabb::empty()
    }
}

/// Box union.
impl<T: RmiValue> Add for Aabb<T> {
    type Output = Aabb<T>;

    fn add(self, rhs: Aabb<T>) -> Aabb<T> {
        self.join(&rhs)
    }
}

impl<T: RmiValue> AddAssign for Aabb<T> {
    fn add_assign(&mut self, rhs: Aabb<T>) {
        self.join_mut(&rhs);
    }
}

/// Make [`Aabb`]s indexable. `aabb[0]` gives a reference to the minimum bound.
/// All other indices return a reference to the maximum bound.
impl<T: RmiValue> Index<usize> for Aabb<T> {
    type Output = Point3<T>;

    fn index(&self, index: usize) -> &Point3<T> {
        if index == 0 {
            &self.min
        } else {
            &self.max
        }
    }
}

/// Implementation of [`Bounded`] for [`Aabb`].
impl<T: RmiValue> Bounded<T> for Aabb<T> {
    fn aabb(&self) -> Aabb<T> {
        *self
    }
}

/// Implementation of [`Bounded`] for single points.
impl<T: RmiValue> Bounded<T> for Point3<T> {
    fn aabb(&self) -> Aabb<T> {
        Aabb::with_bounds(*self, *self)
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::{Aabb, Bounded};
    use crate::axis::Axis;
    use crate::testbase::{tuple_to_point, tuplevec_small_strategy, TAabb3, TPoint3, TupleVec};
    use float_eq::assert_float_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_box_union_is_identity() {
        let aabb = TAabb3::with_bounds(TPoint3::new(-1.0, 0.0, 2.0), TPoint3::new(1.0, 3.0, 4.0));
        assert_eq!(TAabb3::empty() + aabb, aabb);
        assert_eq!(aabb + TAabb3::empty(), aabb);

        let mut acc = TAabb3::default();
        acc += aabb;
        assert_eq!(acc, aabb);
    }

    #[test]
    fn test_flat_box_has_zero_volume() {
        let flat = TAabb3::with_bounds(TPoint3::new(5.0, 0.0, 0.0), TPoint3::new(5.0, 1.0, 1.0));
        assert_float_eq!(flat.volume(), 0.0, abs <= 0.0);
        assert_float_eq!(flat.surface_area(), 2.0, abs <= 1e-12);
        assert_float_eq!(TAabb3::empty().volume(), 0.0, abs <= 0.0);
    }

    #[test]
    fn test_largest_axis() {
        let aabb = TAabb3::with_bounds(TPoint3::new(0.0, 0.0, 0.0), TPoint3::new(1.0, 5.0, 2.0));
        assert_eq!(aabb.largest_axis(), Axis::Y);
    }

    #[test]
    fn test_approx_contains_aabb() {
        let outer = TAabb3::with_bounds(TPoint3::new(0.0, 0.0, 0.0), TPoint3::new(1.0, 1.0, 1.0));
        let inner = TAabb3::with_bounds(TPoint3::new(0.2, 0.2, 0.2), TPoint3::new(1.0, 0.8, 0.8));
        assert!(outer.approx_contains_aabb_eps(&inner, 1e-9));
        assert!(!inner.approx_contains_aabb_eps(&outer, 1e-9));
        assert!(inner.approx_contains_aabb_eps(&TAabb3::empty(), 1e-9));
    }

    proptest! {
        // Test whether an empty `Aabb` does not contains anything.
        #[test]
        fn test_empty_contains_nothing(tpl: TupleVec) {
            // Define a random Point
            let p = tuple_to_point(&tpl);

            // Create an empty Aabb
            let aabb = TAabb3::empty();

            // It should not contain anything
            assert!(!aabb.contains(&p));
        }

        // Test whether a default `Aabb` is empty.
        #[test]
        fn test_default_is_empty(tpl: TupleVec) {
            // Define a random Point
            let p = tuple_to_point(&tpl);

            // Create a default Aabb
            let aabb: TAabb3 = Default::default();

            // It should not contain anything
            assert!(!aabb.contains(&p));
        }

        // Test whether an `Aabb` always contains its center.
        #[test]
        fn test_aabb_contains_center(a in tuplevec_small_strategy(), b in tuplevec_small_strategy()) {
            // Define two points which will be the corners of the `Aabb`
            let p1 = tuple_to_point(&a);
            let p2 = tuple_to_point(&b);

            // Span the `Aabb`
            let aabb = TAabb3::empty().grow(&p1).join(&p2.aabb());

            // Its center should be inside the `Aabb`
            assert!(aabb.contains(&aabb.center()));
        }

        // Test whether the joint of two point-sets contains all the points.
        #[test]
        fn test_join_two_aabbs(a in (tuplevec_small_strategy(), tuplevec_small_strategy(), tuplevec_small_strategy()),
                               b in (tuplevec_small_strategy(), tuplevec_small_strategy(), tuplevec_small_strategy())) {
            // Define an array of six points
            let points = [a.0, a.1, a.2, b.0, b.1, b.2];

            // Convert these points to `Point3`
            let points = points.iter().map(tuple_to_point).collect::<Vec<TPoint3>>();

            // Create two `Aabb`s. One spanned the first three points,
            // the other by the last three points
            let aabb1 = points
                .iter()
                .take(3)
                .fold(TAabb3::empty(), |aabb, point| aabb.grow(point));
            let aabb2 = points
                .iter()
                .skip(3)
                .fold(TAabb3::empty(), |aabb, point| aabb.grow(point));

            // The union of the two `Aabb`s should contain all points
            let joint = aabb1 + aabb2;
            assert!(points.iter().all(|p| joint.contains(p)));

            // The union never shrinks either operand
            assert!(joint.approx_contains_aabb_eps(&aabb1, 1e-9));
            assert!(joint.approx_contains_aabb_eps(&aabb2, 1e-9));
            assert!(joint.volume() >= aabb1.volume() && joint.volume() >= aabb2.volume());
        }
    }
}
