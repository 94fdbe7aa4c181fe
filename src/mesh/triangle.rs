//! This module defines a Triangle, the primitive every mesh is made of.

use crate::aabb::{Aabb, Bounded};
use crate::RmiValue;
use nalgebra::Point3;
use std::ops::Index;

/// A triangle struct. Instance of a more complex `Bounded` primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle<T: RmiValue> {
    /// First point on the triangle
    pub a: Point3<T>,
    /// Second point on the triangle
    pub b: Point3<T>,
    /// Third point on the triangle
    pub c: Point3<T>,
}

impl<T: RmiValue> Triangle<T> {
    /// Creates a new triangle given a counter clockwise set of points
    pub fn new(a: Point3<T>, b: Point3<T>, c: Point3<T>) -> Triangle<T> {
        Triangle { a, b, c }
    }

    /// The average of the three vertices.
    pub fn centroid(&self) -> Point3<T> {
        let three = T::one() + T::one() + T::one();
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / three)
    }
}

/// `triangle[0]`, `triangle[1]` and `triangle[2]` are the vertices in order.
impl<T: RmiValue> Index<usize> for Triangle<T> {
    type Output = Point3<T>;

    fn index(&self, slot: usize) -> &Point3<T> {
        match slot {
            0 => &self.a,
            1 => &self.b,
            2 => &self.c,
            _ => panic!("triangle vertex slot {slot} out of range"),
        }
    }
}

impl<T: RmiValue> Bounded<T> for Triangle<T> {
    fn aabb(&self) -> Aabb<T> {
        Aabb::empty().grow(&self.a).grow(&self.b).grow(&self.c)
    }
}
