//! This module defines a Ray structure and intersection algorithms
//! for axis aligned bounding boxes and triangles.

use crate::aabb::Aabb;
use crate::utils::{count_to_real, fast_max, fast_min};
use crate::RmiValue;
use nalgebra::{Point3, Vector3};
use num_traits::Float;

/// Widening of boxes in [`Ray::intersects_aabb`], in units of `epsilon * scale` where
/// `scale` is the largest absolute coordinate of the box and the ray origin.
pub const SLAB_MARGIN_ULPS: usize = 1024;

/// `2 * gamma(3)`, the relative rounding bound of a slab distance: `gamma(n)` is
/// `n * eps / (1 - n * eps)`.
fn two_gamma3<T: RmiValue>() -> T {
    let three_eps = count_to_real::<T>(3) * T::epsilon();
    count_to_real::<T>(2) * three_eps / (T::one() - three_eps)
}

/// A struct which defines a ray and some of its cached values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray<T: RmiValue> {
    /// The ray origin.
    pub origin: Point3<T>,

    /// The ray direction, of unit length.
    pub direction: Vector3<T>,

    /// Inverse (1/x) ray direction. Cached for use in [`Aabb`] intersections.
    /// Zero direction components give infinite inverses.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub inv_direction: Vector3<T>,
}

/// An intersection point together with its distance along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<T: RmiValue> {
    /// Distance from the ray origin to `point`.
    pub distance: T,
    /// The intersection point.
    pub point: Point3<T>,
}

impl<T: RmiValue> Ray<T> {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` will be normalized. A zero `direction` gives a ray that hits nothing.
    ///
    /// # Examples
    /// ```
    /// use rmi::ray::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(3.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, Vector3::new(1.0, 0.0, 0.0));
    /// assert_eq!(ray.inv_direction.y, f64::INFINITY);
    /// ```
    pub fn new(origin: Point3<T>, direction: Vector3<T>) -> Ray<T> {
        let direction = direction / Float::sqrt(direction.dot(&direction));
        Ray {
            origin,
            direction,
            inv_direction: direction.map(|x| T::one() / x),
        }
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: T) -> Point3<T> {
        self.origin + self.direction * t
    }

    /// Tests the intersection of a [`Ray`] with an [`Aabb`] using the slab test.
    ///
    /// The ray hits the box if the intersection of the three slab intervals is not empty
    /// and does not lie entirely behind the origin. A ray starting inside the box always
    /// hits it. When a direction component is zero and the origin lies exactly on one of
    /// that axis' faces, the slab does not constrain the ray.
    ///
    /// The test is conservative: the box is widened by [`SLAB_MARGIN_ULPS`] units in the
    /// last place of the largest coordinate involved, and the far distance is scaled by
    /// `1 + 2 * gamma(3)`. Every triangle inside the box that
    /// [`Ray::intersects_triangle`] accepts, including hits on its vertices and edges,
    /// therefore lies in a box that is hit.
    ///
    /// # Examples
    /// ```
    /// use rmi::aabb::Aabb;
    /// use rmi::ray::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(1.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// let point1 = Point3::new(99.9, -1.0, -1.0);
    /// let point2 = Point3::new(100.1, 1.0, 1.0);
    /// let aabb = Aabb::with_bounds(point1, point2);
    ///
    /// assert!(ray.intersects_aabb(&aabb));
    /// ```
    pub fn intersects_aabb(&self, aabb: &Aabb<T>) -> bool {
        if aabb.is_empty() || self.inv_direction.iter().any(|x| x.is_nan()) {
            return false;
        }

        let margin = self.slab_margin(aabb);
        let mut t_min = T::neg_infinity();
        let mut t_max = T::infinity();
        for i in 0..3 {
            let t1 = (aabb.min[i] - margin - self.origin[i]) * self.inv_direction[i];
            let t2 = (aabb.max[i] + margin - self.origin[i]) * self.inv_direction[i];
            // NaN bounds (0 * inf) are dropped: fast_min/fast_max return the second
            // argument when the first is NaN.
            t_min = fast_max(fast_min(t1, t2), t_min);
            t_max = fast_min(fast_max(t1, t2), t_max);
        }

        t_max >= T::zero() && t_min <= t_max * (T::one() + two_gamma3::<T>())
    }

    /// Absolute widening of `aabb` used by [`Ray::intersects_aabb`].
    fn slab_margin(&self, aabb: &Aabb<T>) -> T {
        let mut scale = T::zero();
        for i in 0..3 {
            scale = fast_max(scale, Float::abs(aabb.min[i]));
            scale = fast_max(scale, Float::abs(aabb.max[i]));
            scale = fast_max(scale, Float::abs(self.origin[i]));
        }
        scale * T::epsilon() * count_to_real::<T>(SLAB_MARGIN_ULPS)
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm).
    /// Returns the intersection point, or `None` if the ray is parallel to the triangle
    /// (`|det| <= epsilon`), misses it, or hits it at a distance of at most `epsilon`.
    /// Both faces of the triangle are hit.
    ///
    /// # Examples
    /// ```
    /// use rmi::ray::Ray;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let ray = Ray::new(Point3::new(10.0, 1.0, 1.0), Vector3::new(-1.0, 0.0, 0.0));
    /// let hit = ray.intersects_triangle(
    ///     &Point3::new(0.0, 1.0, 0.0),
    ///     &Point3::new(0.0, 0.0, 1.0),
    ///     &Point3::new(0.0, 1.0, 1.0),
    ///     f64::EPSILON,
    /// );
    ///
    /// assert_eq!(hit, Some(Point3::new(0.0, 1.0, 1.0)));
    /// ```
    pub fn intersects_triangle(
        &self,
        a: &Point3<T>,
        b: &Point3<T>,
        c: &Point3<T>,
        epsilon: T,
    ) -> Option<Point3<T>> {
        self.triangle_distance(a, b, c, epsilon).map(|t| self.at(t))
    }

    /// [`Ray::intersects_triangle`], returning the distance along the ray instead of the
    /// point.
    #[allow(clippy::many_single_char_names)]
    pub fn triangle_distance(
        &self,
        a: &Point3<T>,
        b: &Point3<T>,
        c: &Point3<T>,
        epsilon: T,
    ) -> Option<T> {
        let a_to_b = *b - *a;
        let a_to_c = *c - *a;

        // Begin calculating determinant - also used to calculate u parameter
        // u_vec lies in view plane
        let u_vec = self.direction.cross(&a_to_c);

        // If determinant is near zero, ray lies in plane of triangle
        let det = a_to_b.dot(&u_vec);
        if Float::abs(det) <= epsilon {
            return None;
        }

        let inv_det = T::one() / det;

        // Vector from point a to ray origin
        let a_to_origin = self.origin - *a;

        // Calculate u parameter and test bounds: u < 0 || u > 1 => outside of triangle
        let u = a_to_origin.dot(&u_vec) * inv_det;
        if u < T::zero() || u > T::one() {
            return None;
        }

        // Prepare to test v parameter
        let v_vec = a_to_origin.cross(&a_to_b);

        // Calculate v parameter and test bound
        let v = self.direction.dot(&v_vec) * inv_det;
        if v < T::zero() || u + v > T::one() {
            return None;
        }

        // Distance along the ray. Hits at or behind the origin are rejected.
        let distance = a_to_c.dot(&v_vec) * inv_det;
        if distance > epsilon {
            Some(distance)
        } else {
            None
        }
    }
}
