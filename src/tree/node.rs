//! Tree nodes.

use crate::aabb::Aabb;
use crate::split::Range;
use crate::RmiValue;

/// A node of a [`Tree`].
///
/// Ranges are absolute positions into the tree's element order. The box of a leaf is the
/// union of its elements' boxes; the box of an internal node is the union of its
/// children's boxes.
///
/// [`Tree`]: struct.Tree.html
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node<T: RmiValue> {
    /// A terminal node holding a range of elements.
    Leaf {
        /// Bounds of the elements in `range`.
        aabb: Aabb<T>,
        /// The elements of this leaf.
        range: Range,
    },
    /// A node with between two and `Branching::max_children` children.
    Internal {
        /// Bounds of all children.
        aabb: Aabb<T>,
        /// Union of the children's ranges.
        range: Range,
        /// Children in element order. Their ranges are contiguous.
        children: Vec<Node<T>>,
    },
}

impl<T: RmiValue> Node<T> {
    /// The bounding box of the subtree.
    pub fn aabb(&self) -> &Aabb<T> {
        match self {
            Node::Leaf { aabb, .. } | Node::Internal { aabb, .. } => aabb,
        }
    }

    /// The element range of the subtree.
    pub fn range(&self) -> Range {
        match self {
            Node::Leaf { range, .. } | Node::Internal { range, .. } => *range,
        }
    }

    /// The children of the node. Empty for a leaf.
    pub fn children(&self) -> &[Node<T>] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Internal { children, .. } => children,
        }
    }

    /// Returns true if the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Number of nodes in the subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// Number of leaves in the subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { children, .. } => children.iter().map(Node::leaf_count).sum(),
        }
    }

    /// Number of levels in the subtree. A single leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    /// Appends the element count of every leaf in pre-order.
    pub(crate) fn collect_leaf_sizes(&self, sizes: &mut Vec<usize>) {
        match self {
            Node::Leaf { range, .. } => sizes.push(range.len()),
            Node::Internal { children, .. } => {
                for child in children {
                    child.collect_leaf_sizes(sizes);
                }
            }
        }
    }

    /// Writes an indented dump of the subtree, one node per line.
    pub(crate) fn pretty_print(&self, depth: usize, out: &mut String) {
        let padding = " ".repeat(depth * 2);
        let kind = if self.is_leaf() { "leaf" } else { "node" };
        out.push_str(&format!(
            "{padding}{kind} {} ({} elements) {}\n",
            self.range(),
            self.range().len(),
            self.aabb()
        ));
        for child in self.children() {
            child.pretty_print(depth + 1, out);
        }
    }
}
