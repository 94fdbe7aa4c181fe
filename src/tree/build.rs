//! Recursive tree construction.
//!
//! Every build step owns a disjoint sub-slice of the element order. A step asks the
//! splitter about its slice, checks the answer and carves the slice into one exclusive
//! sub-slice per child with `split_at_mut`, so child steps can run on any thread.

use crate::aabb::Aabb;
use crate::mesh::Element;
use crate::split::{Branching, Range, Split, Splitter, SubRange};
use crate::tree::Node;
use crate::utils::joint_aabb_of_elements;
use crate::RmiValue;
use log::warn;

/// Absolute depth ceiling. A node at this depth becomes a leaf whatever its splitter says.
pub const MAX_TREE_DEPTH: u32 = 64;

/// Holds the arguments for building one subtree.
pub(crate) struct NodeBuildArgs<'a, T: RmiValue> {
    elements: &'a mut [Element<T>],
    offset: usize,
    depth: u32,
    splittable: bool,
}

/// Result of one build step.
pub(crate) enum Prepared<'a, T: RmiValue> {
    /// The step produced a leaf.
    Done(Node<T>),
    /// The step partitioned its slice. The children still have to be built.
    Pending {
        range: Range,
        children: Vec<NodeBuildArgs<'a, T>>,
    },
}

impl<'a, T: RmiValue> NodeBuildArgs<'a, T> {
    /// Arguments for the root over all elements.
    pub(crate) fn root(elements: &'a mut [Element<T>]) -> Self {
        NodeBuildArgs {
            elements,
            offset: 0,
            depth: 0,
            splittable: true,
        }
    }

    /// Number of elements in this subtree.
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    /// Builds the subtree on the current thread.
    pub(crate) fn build<S: Splitter<T> + ?Sized>(self, splitter: &S) -> Node<T> {
        self.build_with_executor(splitter, |children| {
            children
                .into_iter()
                .map(|child| child.build(splitter))
                .collect()
        })
    }

    /// Builds the subtree, handing the pending children of the top step to `executor`.
    /// The executor must return one node per child, in order.
    pub(crate) fn build_with_executor<S: Splitter<T> + ?Sized>(
        self,
        splitter: &S,
        executor: impl FnOnce(Vec<NodeBuildArgs<'a, T>>) -> Vec<Node<T>>,
    ) -> Node<T> {
        match self.prep_build(splitter) {
            Prepared::Done(node) => node,
            Prepared::Pending { range, children } => {
                let expected = children.len();
                let children = executor(children);
                assert_eq!(children.len(), expected, "executor dropped a child");
                internal(range, children)
            }
        }
    }

    /// Runs one step: decides whether this subtree is a leaf and, if not, carves the
    /// slice into the children's slices.
    pub(crate) fn prep_build<S: Splitter<T> + ?Sized>(self, splitter: &S) -> Prepared<'a, T> {
        let NodeBuildArgs {
            elements,
            offset,
            depth,
            splittable,
        } = self;
        let range = Range::new(offset, offset + elements.len());

        if !splittable || elements.is_empty() {
            return Prepared::Done(leaf(elements, range));
        }
        if depth >= MAX_TREE_DEPTH {
            warn!(
                "depth ceiling {} reached, forcing a leaf of {} elements at {}",
                MAX_TREE_DEPTH,
                elements.len(),
                range
            );
            return Prepared::Done(leaf(elements, range));
        }

        let pieces = match splitter.split(elements, depth) {
            Split::Terminal => return Prepared::Done(leaf(elements, range)),
            Split::Partition(pieces) => pieces,
        };
        check_partition(&pieces, elements.len(), splitter.branching(), splitter.name());

        let mut children = Vec::with_capacity(pieces.len());
        let mut rest = elements;
        for piece in &pieces {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(piece.range.len());
            children.push(NodeBuildArgs {
                elements: head,
                offset: offset + piece.range.begin,
                depth: depth + 1,
                splittable: piece.splittable,
            });
            rest = tail;
        }
        Prepared::Pending { range, children }
    }
}

fn leaf<T: RmiValue>(elements: &[Element<T>], range: Range) -> Node<T> {
    Node::Leaf {
        aabb: joint_aabb_of_elements(elements),
        range,
    }
}

fn internal<T: RmiValue>(range: Range, children: Vec<Node<T>>) -> Node<T> {
    let aabb = children
        .iter()
        .fold(Aabb::empty(), |aabb, child| aabb.join(child.aabb()));
    Node::Internal {
        aabb,
        range,
        children,
    }
}

/// Panics unless `pieces` are between two and `branching.max_children()` non-empty,
/// contiguous ranges covering `[0, len)` in order.
fn check_partition(pieces: &[SubRange], len: usize, branching: Branching, splitter: &str) {
    assert!(
        pieces.len() >= 2 && pieces.len() <= branching.max_children(),
        "{splitter} splitter returned {} children, a {branching} node takes 2..={}",
        pieces.len(),
        branching.max_children()
    );
    let mut expected_begin = 0;
    for piece in pieces {
        assert!(
            !piece.range.is_empty(),
            "{splitter} splitter returned the empty child {}",
            piece.range
        );
        assert!(
            piece.range.begin == expected_begin,
            "{splitter} splitter returned child {} where position {expected_begin} was expected: children overlap or leave a gap",
            piece.range
        );
        expected_begin = piece.range.end;
    }
    assert!(
        expected_begin == len,
        "{splitter} splitter children cover {expected_begin} of {len} elements"
    );
}
