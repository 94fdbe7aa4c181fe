//! The N-ary bounding volume tree.

mod build;
mod node;

pub use build::MAX_TREE_DEPTH;
pub(crate) use build::NodeBuildArgs;
pub use node::*;

use crate::aabb::Aabb;
use crate::mesh::{Element, ElementView, MeshSource};
use crate::split::{Branching, Range, Splitter};
use crate::RmiValue;
use log::debug;
use std::fmt;

#[cfg(feature = "rayon")]
use crate::error::Result;
#[cfg(feature = "rayon")]
use crate::parallel::ParallelBuildOptions;

/// A bounding volume tree over the triangles of a mesh.
///
/// The tree owns the [`ElementView`] it was built from. Building reorders the view's
/// elements so that every node covers a contiguous range of them; afterwards the tree is
/// immutable and can be queried from any number of threads by shared reference.
pub struct Tree<'m, T: RmiValue, M: MeshSource<T> + ?Sized> {
    view: ElementView<'m, T, M>,
    root: Node<T>,
    branching: Branching,
}

impl<'m, T: RmiValue, M: MeshSource<T> + ?Sized> Tree<'m, T, M> {
    /// Builds a tree on the current thread.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::Point3;
    /// use rmi::{Branching, ElementView, MedianSplitter, Tree, Triangle};
    ///
    /// let triangles = (0..64)
    ///     .map(|i| {
    ///         let p = Point3::new(i as f32, 0.0, 0.0);
    ///         Triangle::new(p, p + nalgebra::Vector3::y(), p + nalgebra::Vector3::z())
    ///     })
    ///     .collect::<Vec<_>>();
    ///
    /// let splitter = MedianSplitter::new(Branching::QUAD);
    /// let tree = Tree::build(ElementView::new(triangles.as_slice()), &splitter);
    ///
    /// assert_eq!(tree.len(), 64);
    /// assert_eq!(tree.leaf_count(), 64);
    /// assert!(tree.root().children().len() <= 4);
    /// ```
    pub fn build<S: Splitter<T> + ?Sized>(
        mut view: ElementView<'m, T, M>,
        splitter: &S,
    ) -> Tree<'m, T, M> {
        let branching = splitter.branching();
        debug!(
            "building {} tree over {} elements with the {} splitter",
            branching,
            view.len(),
            splitter.name()
        );
        let root = NodeBuildArgs::root(view.elements_mut()).build(splitter);
        Tree::finish(view, root, branching)
    }

    /// Builds a tree with fork-join tasks on a dedicated pool of `threads` threads.
    ///
    /// The result is identical to [`Tree::build`] with the same splitter.
    #[cfg(feature = "rayon")]
    pub fn build_parallel<S: Splitter<T> + ?Sized>(
        view: ElementView<'m, T, M>,
        splitter: &S,
        threads: usize,
    ) -> Result<Tree<'m, T, M>> {
        Tree::build_parallel_with(view, splitter, ParallelBuildOptions::new(threads))
    }

    /// [`Tree::build_parallel`] with explicit options.
    #[cfg(feature = "rayon")]
    pub fn build_parallel_with<S: Splitter<T> + ?Sized>(
        mut view: ElementView<'m, T, M>,
        splitter: &S,
        options: ParallelBuildOptions,
    ) -> Result<Tree<'m, T, M>> {
        let branching = splitter.branching();
        debug!(
            "building {} tree over {} elements with the {} splitter on {} threads",
            branching,
            view.len(),
            splitter.name(),
            options.threads
        );
        let root = crate::parallel::build_tree(view.elements_mut(), splitter, &options)?;
        Ok(Tree::finish(view, root, branching))
    }

    fn finish(view: ElementView<'m, T, M>, root: Node<T>, branching: Branching) -> Self {
        let tree = Tree {
            view,
            root,
            branching,
        };
        debug!(
            "built tree with {} nodes, {} leaves, depth {}",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        tree
    }

    /// The root node.
    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// The bounds of the whole mesh. Empty for an empty mesh.
    pub fn aabb(&self) -> &Aabb<T> {
        self.root.aabb()
    }

    /// The branching factor the tree was built with.
    pub fn branching(&self) -> Branching {
        self.branching
    }

    /// The mesh the tree indexes.
    pub fn mesh(&self) -> &'m M {
        self.view.mesh()
    }

    /// All elements in tree order.
    pub fn elements(&self) -> &[Element<T>] {
        self.view.elements()
    }

    /// The elements of `range`, typically a node's range.
    pub fn elements_in(&self, range: Range) -> &[Element<T>] {
        &self.elements()[range.begin..range.end]
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    /// Returns true if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Number of levels. A tree consisting of its root only has depth 1.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Element counts of all leaves in pre-order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.leaf_count());
        self.root.collect_leaf_sizes(&mut sizes);
        sizes
    }

    /// An indented dump of the tree, one node per line.
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.root.pretty_print(0, &mut out);
        out
    }

    /// Releases the element view, for example to rebuild it with another splitter.
    pub fn into_view(self) -> ElementView<'m, T, M> {
        self.view
    }
}

impl<T: RmiValue, M: MeshSource<T> + ?Sized> fmt::Debug for Tree<'_, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("branching", &self.branching)
            .field("elements", &self.len())
            .field("nodes", &self.node_count())
            .field("depth", &self.depth())
            .finish()
    }
}
