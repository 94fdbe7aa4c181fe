//! Axis enum for indexing three-dimensional structures.

use std::fmt::{Display, Formatter, Result};

/// An `Axis` in a three-dimensional coordinate system.
/// Used to access `Vector3`/`Point3` components via [`Axis::index`].
///
/// # Examples
/// ```
/// use rmi::axis::Axis;
/// use nalgebra::Point3;
///
/// let position = Point3::new(1.0, 0.5, 42.0);
/// assert_eq!(position[Axis::Y.index()], 0.5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Index of the X axis.
    X = 0,

    /// Index of the Y axis.
    Y = 1,

    /// Index of the Z axis.
    Z = 2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The component index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the axis for a rotation counter, cycling `X, Y, Z, X, ...`.
    pub fn cycle(counter: u32) -> Axis {
        Axis::ALL[(counter % 3) as usize]
    }
}

/// Display implementation for `Axis`.
impl Display for Axis {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match *self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}
