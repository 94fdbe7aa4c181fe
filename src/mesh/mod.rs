//! Mesh adapters and the reorderable element view the tree is built over.
//!
//! Anything that can hand out triangle vertices by index implements [`MeshSource`]. The
//! tree never copies triangle data: it reorders the [`Element`]s of an [`ElementView`]
//! and stores ranges into them.

mod element;
mod raw_mesh;
mod triangle;

pub use element::*;
pub use raw_mesh::*;
pub use triangle::*;

use crate::RmiValue;
use nalgebra::Point3;

/// The mesh adapter contract.
///
/// Implementations must answer [`MeshSource::vertex`] in constant time. Indices out of
/// range are a caller bug and may panic.
pub trait MeshSource<T: RmiValue>: Sync {
    /// Number of triangles in the mesh.
    fn size(&self) -> usize;

    /// Position of vertex `slot` (0, 1 or 2) of triangle `triangle`.
    fn vertex(&self, triangle: usize, slot: usize) -> Point3<T>;

    /// All three vertices of triangle `triangle`.
    fn triangle(&self, triangle: usize) -> Triangle<T> {
        Triangle::new(
            self.vertex(triangle, 0),
            self.vertex(triangle, 1),
            self.vertex(triangle, 2),
        )
    }
}

/// A triangle soup.
impl<T: RmiValue> MeshSource<T> for [Triangle<T>] {
    fn size(&self) -> usize {
        self.len()
    }

    fn vertex(&self, triangle: usize, slot: usize) -> Point3<T> {
        self[triangle][slot]
    }

    fn triangle(&self, triangle: usize) -> Triangle<T> {
        self[triangle]
    }
}

impl<T: RmiValue> MeshSource<T> for Vec<Triangle<T>> {
    fn size(&self) -> usize {
        self.len()
    }

    fn vertex(&self, triangle: usize, slot: usize) -> Point3<T> {
        self[triangle][slot]
    }

    fn triangle(&self, triangle: usize) -> Triangle<T> {
        self[triangle]
    }
}
