//! Positional median splitter.

use crate::axis::Axis;
use crate::mesh::Element;
use crate::split::{bisect, Branching, Split, Splitter};
use crate::utils::{centroid_bounds, total_cmp};
use crate::RmiValue;

/// Default depth limit of the [`MedianSplitter`].
pub const DEFAULT_MEDIAN_MAX_DEPTH: u32 = 16;

/// Cuts every node at its positional median, on an axis rotating with the bisection
/// count from the root.
///
/// Splitting stops at `max_depth`, at `leaf_size` elements, or when all centroids of a
/// node coincide and no axis can order them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MedianSplitter {
    /// Branching factor of the produced tree.
    pub branching: Branching,
    /// Nodes at this depth become leaves.
    pub max_depth: u32,
    /// Largest element count kept in a leaf.
    pub leaf_size: usize,
}

impl MedianSplitter {
    /// A splitter with the given branching factor and default limits.
    pub fn new(branching: Branching) -> MedianSplitter {
        MedianSplitter {
            branching,
            ..MedianSplitter::default()
        }
    }

    /// Sets the depth limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> MedianSplitter {
        self.max_depth = max_depth;
        self
    }

    /// Sets the leaf size. Zero is treated as one.
    pub fn with_leaf_size(mut self, leaf_size: usize) -> MedianSplitter {
        self.leaf_size = leaf_size.max(1);
        self
    }
}

impl Default for MedianSplitter {
    fn default() -> MedianSplitter {
        MedianSplitter {
            branching: Branching::KD,
            max_depth: DEFAULT_MEDIAN_MAX_DEPTH,
            leaf_size: 1,
        }
    }
}

impl<T: RmiValue> Splitter<T> for MedianSplitter {
    fn branching(&self) -> Branching {
        self.branching
    }

    fn split(&self, elements: &mut [Element<T>], depth: u32) -> Split {
        let leaf_size = self.leaf_size.max(1);
        if depth >= self.max_depth || elements.len() <= leaf_size {
            return Split::Terminal;
        }

        let bisections = self.branching.bisections();
        bisect(elements, bisections, leaf_size, |slice, level| {
            let axis = Axis::cycle(depth.wrapping_mul(bisections).wrapping_add(level));
            median_cut(slice, axis)
        })
    }

    fn name(&self) -> &'static str {
        "median"
    }
}

/// Stably sorts `elements` along `axis` and returns the median position, or `None` if
/// the centroids coincide.
fn median_cut<T: RmiValue>(elements: &mut [Element<T>], axis: Axis) -> Option<usize> {
    if elements.len() < 2 {
        return None;
    }
    let spread = centroid_bounds(elements).size();
    if spread.iter().all(|extent| *extent <= T::zero()) {
        return None;
    }

    let i = axis.index();
    elements.sort_by(|a, b| total_cmp(a.centroid[i], b.centroid[i]));
    Some(elements.len() / 2)
}
