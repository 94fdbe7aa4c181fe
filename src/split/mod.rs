//! Splitter policies deciding how a range of elements is partitioned into children.
//!
//! A splitter is handed the elements of one node as a mutable slice. It may reorder the
//! slice freely and answers with either [`Split::Terminal`] or a partition of the slice
//! into contiguous [`SubRange`]s, one per child. Ranges in a [`Split`] are relative to the
//! slice the splitter was given.

mod median;
mod sah;

pub use median::*;
pub use sah::*;

use crate::error::{Result, RmiError};
use crate::mesh::Element;
use crate::RmiValue;
use std::fmt;

/// Upper bound on [`Branching::bisections`]: a node has at most 256 children.
pub const MAX_BISECTIONS: u32 = 8;

/// The branching factor of a tree, given as the number of bisections made per level.
///
/// One bisection gives a binary "KD" tree, two a quadtree and three an octree. A node
/// has at most `2^bisections` children.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Branching(u32);

impl Branching {
    /// Binary tree.
    pub const KD: Branching = Branching(1);
    /// Four children per node.
    pub const QUAD: Branching = Branching(2);
    /// Eight children per node.
    pub const OCT: Branching = Branching(3);

    /// Creates a branching factor of `bisections` bisections per level.
    ///
    /// # Examples
    /// ```
    /// use rmi::Branching;
    ///
    /// assert_eq!(Branching::new(2).unwrap(), Branching::QUAD);
    /// assert_eq!(Branching::new(4).unwrap().max_children(), 16);
    /// assert!(Branching::new(0).is_err());
    /// ```
    pub fn new(bisections: u32) -> Result<Branching> {
        if (1..=MAX_BISECTIONS).contains(&bisections) {
            Ok(Branching(bisections))
        } else {
            Err(RmiError::InvalidBranching(bisections))
        }
    }

    /// Bisections per level.
    pub fn bisections(self) -> u32 {
        self.0
    }

    /// The maximum number of children of an internal node.
    pub fn max_children(self) -> usize {
        1 << self.0
    }
}

impl Default for Branching {
    fn default() -> Branching {
        Branching::KD
    }
}

impl fmt::Display for Branching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => write!(f, "kd"),
            2 => write!(f, "quad"),
            3 => write!(f, "oct"),
            n => write!(f, "{}-ary", 1_usize << n),
        }
    }
}

/// A half-open `[begin, end)` range of element positions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// First position in the range.
    pub begin: usize,
    /// One past the last position in the range.
    pub end: usize,
}

impl Range {
    /// Creates the range `[begin, end)`.
    pub fn new(begin: usize, end: usize) -> Range {
        debug_assert!(begin <= end, "range [{begin}, {end}) is reversed");
        Range { begin, end }
    }

    /// Number of positions in the range.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Returns true if the range holds no position.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The same range shifted right by `by` positions.
    pub fn offset(&self, by: usize) -> Range {
        Range::new(self.begin + by, self.end + by)
    }

    /// Splits the range at `mid` positions from its start.
    ///
    /// # Examples
    /// ```
    /// use rmi::Range;
    ///
    /// let (left, right) = Range::new(10, 20).split_at(4);
    /// assert_eq!(left, Range::new(10, 14));
    /// assert_eq!(right, Range::new(14, 20));
    /// ```
    pub fn split_at(&self, mid: usize) -> (Range, Range) {
        assert!(mid <= self.len(), "split position {mid} beyond {self}");
        let cut = self.begin + mid;
        (Range::new(self.begin, cut), Range::new(cut, self.end))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// One child range of a [`Split::Partition`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubRange {
    /// Positions of the child, relative to the split slice.
    pub range: Range,
    /// Whether the builder should ask the splitter about this child again. An
    /// unsplittable child becomes a leaf.
    pub splittable: bool,
}

/// The answer of a [`Splitter`] for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// Keep the whole range in one leaf.
    Terminal,
    /// Contiguous, disjoint child ranges covering the whole slice, in slice order.
    Partition(Vec<SubRange>),
}

/// A partitioning policy.
///
/// Splitters must be deterministic for a fixed input order, and every piece of a
/// [`Split::Partition`] must be non-empty and strictly smaller than the whole slice. The
/// tree builder checks the partition shape and panics on a violation.
pub trait Splitter<T: RmiValue>: Sync {
    /// The branching factor of trees built with this splitter.
    fn branching(&self) -> Branching;

    /// Decides how the elements of a node at `depth` are partitioned. The root is at
    /// depth 0.
    fn split(&self, elements: &mut [Element<T>], depth: u32) -> Split;

    /// A short name for log output.
    fn name(&self) -> &'static str;
}

/// Partitions `elements` by bisecting it `levels` times.
///
/// `cut` reorders the slice it is given and returns where to cut it, or `None` when no
/// useful cut exists. Its second argument is the bisection level, starting at 0. Pieces
/// of at most `leaf_size` elements are not bisected further and are marked
/// unsplittable, as are pieces `cut` refuses to split.
pub(crate) fn bisect<T, F>(
    elements: &mut [Element<T>],
    levels: u32,
    leaf_size: usize,
    mut cut: F,
) -> Split
where
    T: RmiValue,
    F: FnMut(&mut [Element<T>], u32) -> Option<usize>,
{
    let len = elements.len();
    let mid = match cut(elements, 0) {
        Some(mid) if mid > 0 && mid < len => mid,
        _ => return Split::Terminal,
    };

    let mut pieces = Vec::with_capacity(1 << levels);
    let (left, right) = elements.split_at_mut(mid);
    bisect_level(left, 0, 1, levels, leaf_size, &mut cut, &mut pieces);
    bisect_level(right, mid, 1, levels, leaf_size, &mut cut, &mut pieces);
    Split::Partition(pieces)
}

fn bisect_level<T, F>(
    elements: &mut [Element<T>],
    offset: usize,
    level: u32,
    levels: u32,
    leaf_size: usize,
    cut: &mut F,
    pieces: &mut Vec<SubRange>,
) where
    T: RmiValue,
    F: FnMut(&mut [Element<T>], u32) -> Option<usize>,
{
    let len = elements.len();
    let range = Range::new(offset, offset + len);
    if level == levels || len <= leaf_size {
        pieces.push(SubRange {
            range,
            splittable: len > leaf_size,
        });
        return;
    }

    match cut(elements, level) {
        Some(mid) if mid > 0 && mid < len => {
            let (left, right) = elements.split_at_mut(mid);
            bisect_level(left, offset, level + 1, levels, leaf_size, cut, pieces);
            bisect_level(right, offset + mid, level + 1, levels, leaf_size, cut, pieces);
        }
        _ => pieces.push(SubRange {
            range,
            splittable: false,
        }),
    }
}
