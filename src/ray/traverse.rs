//! Ray queries against meshes and trees.

use crate::error::Result;
use crate::mesh::{Element, ElementView, MeshSource};
use crate::ray::{Hit, Ray};
use crate::split::Range;
use crate::tree::{Node, Tree};
use crate::RmiValue;
use nalgebra::Point3;

impl<T: RmiValue> Ray<T> {
    /// Intersects the ray with the triangle of `element`.
    pub fn intersects_element<M: MeshSource<T> + ?Sized>(
        &self,
        mesh: &M,
        element: &Element<T>,
        epsilon: T,
    ) -> Option<Point3<T>> {
        let triangle = element.triangle(mesh);
        self.intersects_triangle(&triangle.a, &triangle.b, &triangle.c, epsilon)
    }

    /// Tests every element of `view` in order, without any acceleration structure.
    pub fn intersects_mesh<M: MeshSource<T> + ?Sized>(
        &self,
        view: &ElementView<'_, T, M>,
        epsilon: T,
    ) -> Vec<Point3<T>> {
        view.elements()
            .iter()
            .filter_map(|element| self.intersects_element(view.mesh(), element, epsilon))
            .collect()
    }

    /// Returns every intersection point of the ray with the mesh of `tree`.
    ///
    /// Subtrees whose box the ray misses are skipped. The order of the points is
    /// unspecified.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::{Point3, Vector3};
    /// use rmi::{ElementView, Ray, SahSplitter, Tree, Triangle};
    ///
    /// let triangles = vec![Triangle::new(
    ///     Point3::new(1.0, -1.0, -1.0),
    ///     Point3::new(1.0, 1.0, -1.0),
    ///     Point3::new(1.0, 0.0, 1.0),
    /// )];
    /// let tree = Tree::build(ElementView::new(triangles.as_slice()), &SahSplitter::default());
    ///
    /// let ray = Ray::new(Point3::origin(), Vector3::x());
    /// assert_eq!(ray.intersects_tree(&tree, f64::EPSILON), vec![Point3::new(1.0, 0.0, 0.0)]);
    ///
    /// let ray = Ray::new(Point3::origin(), -Vector3::x());
    /// assert!(ray.intersects_tree(&tree, f64::EPSILON).is_empty());
    /// ```
    pub fn intersects_tree<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        epsilon: T,
    ) -> Vec<Point3<T>> {
        let mut hits = Vec::new();
        if self.intersects_aabb(tree.aabb()) {
            self.collect_hits(tree, tree.root(), epsilon, &mut hits);
        }
        hits
    }

    fn collect_hits<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        node: &Node<T>,
        epsilon: T,
        hits: &mut Vec<Point3<T>>,
    ) {
        match node {
            Node::Leaf { range, .. } => self.collect_leaf_hits(tree, *range, epsilon, hits),
            Node::Internal { children, .. } => {
                for child in children {
                    if self.intersects_aabb(child.aabb()) {
                        self.collect_hits(tree, child, epsilon, hits);
                    }
                }
            }
        }
    }

    /// Appends the hits of the elements in `range` to `hits`.
    pub(crate) fn collect_leaf_hits<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        range: Range,
        epsilon: T,
        hits: &mut Vec<Point3<T>>,
    ) {
        let mesh = tree.mesh();
        hits.extend(
            tree.elements_in(range)
                .iter()
                .filter_map(|element| self.intersects_element(mesh, element, epsilon)),
        );
    }

    /// Returns the intersection closest to the ray origin, if any.
    pub fn nearest_intersection<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        epsilon: T,
    ) -> Option<Hit<T>> {
        let mut nearest = None;
        if self.intersects_aabb(tree.aabb()) {
            self.nearest_in(tree, tree.root(), epsilon, &mut nearest);
        }
        nearest.map(|distance| Hit {
            distance,
            point: self.at(distance),
        })
    }

    fn nearest_in<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        node: &Node<T>,
        epsilon: T,
        nearest: &mut Option<T>,
    ) {
        match node {
            Node::Leaf { range, .. } => {
                let mesh = tree.mesh();
                for element in tree.elements_in(*range) {
                    let triangle = element.triangle(mesh);
                    if let Some(distance) =
                        self.triangle_distance(&triangle.a, &triangle.b, &triangle.c, epsilon)
                    {
                        if nearest.map_or(true, |best| distance < best) {
                            *nearest = Some(distance);
                        }
                    }
                }
            }
            Node::Internal { children, .. } => {
                for child in children {
                    if self.intersects_aabb(child.aabb()) {
                        self.nearest_in(tree, child, epsilon, nearest);
                    }
                }
            }
        }
    }

    /// [`Ray::intersects_tree`] run as fork-join tasks on `pool`. Each child whose box the
    /// ray hits becomes a task.
    ///
    /// The pool is owned by the caller and reused across queries. Calling this from one
    /// of the pool's own threads, for example inside a `par_iter` over a ray batch run in
    /// [`rayon::ThreadPool::install`], queues the tasks on that thread.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::{Point3, Vector3};
    /// use rmi::{ElementView, Ray, SahSplitter, Tree, Triangle};
    ///
    /// let triangles = vec![Triangle::new(
    ///     Point3::new(1.0, -1.0, -1.0),
    ///     Point3::new(1.0, 1.0, -1.0),
    ///     Point3::new(1.0, 0.0, 1.0),
    /// )];
    /// let tree = Tree::build(ElementView::new(triangles.as_slice()), &SahSplitter::default());
    /// let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build()?;
    ///
    /// let ray = Ray::new(Point3::origin(), Vector3::x());
    /// assert_eq!(
    ///     ray.intersects_tree_fork_join_in(&pool, &tree, f64::EPSILON),
    ///     vec![Point3::new(1.0, 0.0, 0.0)]
    /// );
    /// # Ok::<(), rayon::ThreadPoolBuildError>(())
    /// ```
    #[cfg(feature = "rayon")]
    pub fn intersects_tree_fork_join_in<M: MeshSource<T> + ?Sized>(
        &self,
        pool: &rayon::ThreadPool,
        tree: &Tree<'_, T, M>,
        epsilon: T,
    ) -> Vec<Point3<T>> {
        crate::parallel::intersect_fork_join_in(pool, self, tree, epsilon)
    }

    /// [`Ray::intersects_tree_fork_join_in`] on a pool of `threads` threads built for this
    /// one query. Prefer a shared pool when casting many rays.
    ///
    /// Fails if `threads` is zero or the pool cannot be built.
    #[cfg(feature = "rayon")]
    pub fn intersects_tree_fork_join<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        threads: usize,
        epsilon: T,
    ) -> Result<Vec<Point3<T>>> {
        crate::parallel::intersect_fork_join(self, tree, threads, epsilon)
    }

    /// [`Ray::intersects_tree`] run on a work-stealing pool of `threads` threads.
    ///
    /// Fails if `threads` is zero, a worker thread cannot be spawned, or a worker panics.
    pub fn intersects_tree_work_stealing<M: MeshSource<T> + ?Sized>(
        &self,
        tree: &Tree<'_, T, M>,
        threads: usize,
        epsilon: T,
    ) -> Result<Vec<Point3<T>>> {
        crate::parallel::intersect_work_stealing(self, tree, threads, epsilon)
    }
}
