//! Indexed meshes given as flat vertex and index buffers.

use crate::error::{Result, RmiError};
use crate::mesh::{MeshSource, Triangle};
use crate::RmiValue;
use nalgebra::Point3;
use num_traits::ToPrimitive;

/// A mesh stored as a flat coordinate buffer (`x, y, z` per vertex) and a flat index
/// buffer (three vertex indices per triangle), as produced by STL/PLY/OBJ readers or
/// handed over from a GPU upload path.
///
/// # Examples
/// ```
/// use rmi::{MeshSource, RawMesh};
///
/// // A unit quad made of two triangles.
/// let coords = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
/// let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];
/// let mesh = RawMesh::new(coords, &indices).unwrap();
///
/// assert_eq!(mesh.size(), 2);
/// assert_eq!(mesh.vertex(1, 2).y, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMesh<T: RmiValue> {
    coords: Vec<T>,
    indices: Vec<usize>,
}

impl<T: RmiValue> RawMesh<T> {
    /// Validates the buffers and creates the mesh.
    ///
    /// Fails with [`RmiError::MalformedMesh`] if either buffer length is not a multiple of
    /// three, or if an index does not name a vertex.
    pub fn new<I: ToPrimitive>(coords: Vec<T>, indices: &[I]) -> Result<RawMesh<T>> {
        if coords.len() % 3 != 0 {
            return Err(malformed(format!(
                "{} coordinates do not form whole vertices",
                coords.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(malformed(format!(
                "{} indices do not form whole triangles",
                indices.len()
            )));
        }

        let vertex_count = coords.len() / 3;
        let indices = indices
            .iter()
            .enumerate()
            .map(|(position, index)| match index.to_usize() {
                Some(index) if index < vertex_count => Ok(index),
                _ => Err(malformed(format!(
                    "index at position {position} does not name one of {vertex_count} vertices"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawMesh { coords, indices })
    }

    /// Flattens a triangle soup into an unshared vertex buffer.
    pub fn from_triangles(triangles: &[Triangle<T>]) -> RawMesh<T> {
        let mut coords = Vec::with_capacity(triangles.len() * 9);
        for triangle in triangles {
            for vertex in [triangle.a, triangle.b, triangle.c] {
                coords.extend_from_slice(&[vertex.x, vertex.y, vertex.z]);
            }
        }
        RawMesh {
            coords,
            indices: (0..triangles.len() * 3).collect(),
        }
    }

    /// Number of distinct vertices in the coordinate buffer.
    pub fn vertex_count(&self) -> usize {
        self.coords.len() / 3
    }

    /// The flat coordinate buffer.
    pub fn coords(&self) -> &[T] {
        &self.coords
    }

    /// The flat index buffer.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<T: RmiValue> MeshSource<T> for RawMesh<T> {
    fn size(&self) -> usize {
        self.indices.len() / 3
    }

    fn vertex(&self, triangle: usize, slot: usize) -> Point3<T> {
        assert!(slot < 3, "triangle vertex slot {slot} out of range");
        let start = self.indices[triangle * 3 + slot] * 3;
        Point3::new(
            self.coords[start],
            self.coords[start + 1],
            self.coords[start + 2],
        )
    }
}

fn malformed(message: String) -> RmiError {
    RmiError::MalformedMesh { message }
}
