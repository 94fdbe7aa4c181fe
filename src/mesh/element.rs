//! Elements and the lazily computed, reorderable view over a mesh.

use crate::aabb::{Aabb, Bounded};
use crate::mesh::{MeshSource, Triangle};
use crate::RmiValue;
use nalgebra::Point3;
use std::fmt;
use std::sync::OnceLock;

/// One triangle of a mesh as the tree sees it: the triangle's index in the mesh, its
/// centroid (the sort key of every splitter) and its bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element<T: RmiValue> {
    /// Index of the triangle in the mesh.
    pub index: usize,
    /// Average of the three vertices.
    pub centroid: Point3<T>,
    /// Bounds of the three vertices.
    pub aabb: Aabb<T>,
}

impl<T: RmiValue> Element<T> {
    /// Creates the element for triangle `index` of a mesh.
    pub fn new(index: usize, triangle: &Triangle<T>) -> Element<T> {
        Element {
            index,
            centroid: triangle.centroid(),
            aabb: triangle.aabb(),
        }
    }

    /// Looks the element's vertices up in `mesh`.
    pub fn triangle<M: MeshSource<T> + ?Sized>(&self, mesh: &M) -> Triangle<T> {
        mesh.triangle(self.index)
    }
}

impl<T: RmiValue> Bounded<T> for Element<T> {
    fn aabb(&self) -> Aabb<T> {
        self.aabb
    }
}

/// A reorderable sequence of [`Element`]s over a borrowed mesh.
///
/// Elements are computed on first access and cached. Reordering them through
/// [`ElementView::elements_mut`] is the only mutation a tree build performs; it never
/// adds or drops an element.
///
/// # Examples
/// ```
/// use nalgebra::Point3;
/// use rmi::{ElementView, Triangle};
///
/// let triangles = vec![
///     Triangle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)),
///     Triangle::new(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 0.0, 0.0), Point3::new(5.0, 1.0, 0.0)),
/// ];
/// let mut view = ElementView::new(triangles.as_slice());
/// view.elements_mut().reverse();
///
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.elements()[0].index, 1);
/// ```
pub struct ElementView<'m, T: RmiValue, M: MeshSource<T> + ?Sized> {
    mesh: &'m M,
    elements: OnceLock<Vec<Element<T>>>,
}

impl<'m, T: RmiValue, M: MeshSource<T> + ?Sized> ElementView<'m, T, M> {
    /// Creates a view over `mesh`. No element is computed yet.
    pub fn new(mesh: &'m M) -> ElementView<'m, T, M> {
        ElementView {
            mesh,
            elements: OnceLock::new(),
        }
    }

    /// The mesh this view indexes into.
    pub fn mesh(&self) -> &'m M {
        self.mesh
    }

    /// Number of elements, which is the triangle count of the mesh.
    pub fn len(&self) -> usize {
        self.mesh.size()
    }

    /// Returns true if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The elements in their current order.
    pub fn elements(&self) -> &[Element<T>] {
        self.elements.get_or_init(|| compute_elements(self.mesh))
    }

    /// The elements in their current order, for reordering.
    pub fn elements_mut(&mut self) -> &mut [Element<T>] {
        let mesh = self.mesh;
        self.elements.get_or_init(|| compute_elements(mesh));
        self.elements
            .get_mut()
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    /// Vertices of the element at `position` in the current order.
    pub fn triangle(&self, position: usize) -> Triangle<T> {
        self.elements()[position].triangle(self.mesh)
    }
}

impl<T: RmiValue, M: MeshSource<T> + ?Sized> fmt::Debug for ElementView<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementView")
            .field("len", &self.len())
            .field("computed", &self.elements.get().is_some())
            .finish()
    }
}

fn compute_elements<T: RmiValue, M: MeshSource<T> + ?Sized>(mesh: &M) -> Vec<Element<T>> {
    (0..mesh.size())
        .map(|index| Element::new(index, &mesh.triangle(index)))
        .collect()
}
