//! Surface area heuristic splitter.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::mesh::Element;
use crate::split::{bisect, Branching, Split, Splitter};
use crate::utils::{count_to_real, joint_aabb_of_elements, total_cmp};
use crate::RmiValue;

/// Default leaf size of the [`SahSplitter`].
pub const DEFAULT_SAH_LEAF_SIZE: usize = 16;

/// Splits at the cut position minimizing the expected traversal cost.
///
/// For every axis the elements are stably sorted by centroid, and every cut position `i`
/// is priced as `i * volume(left) + (L - i) * volume(right)` using prefix and suffix box
/// accumulation. The cheapest cut over all axes wins, provided it is strictly cheaper
/// than `L * volume(all)`. When the node's box is flat the surface area replaces the
/// volume, since every volume would be zero.
///
/// Nodes of at most `leaf_size` elements are never split.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SahSplitter {
    /// Branching factor of the produced tree.
    pub branching: Branching,
    /// Largest element count kept in a leaf without pricing a split.
    pub leaf_size: usize,
}

impl SahSplitter {
    /// A splitter with the given branching factor and the default leaf size.
    pub fn new(branching: Branching) -> SahSplitter {
        SahSplitter {
            branching,
            ..SahSplitter::default()
        }
    }

    /// Sets the leaf size. Zero is treated as one.
    pub fn with_leaf_size(mut self, leaf_size: usize) -> SahSplitter {
        self.leaf_size = leaf_size.max(1);
        self
    }
}

impl Default for SahSplitter {
    fn default() -> SahSplitter {
        SahSplitter {
            branching: Branching::KD,
            leaf_size: DEFAULT_SAH_LEAF_SIZE,
        }
    }
}

impl<T: RmiValue> Splitter<T> for SahSplitter {
    fn branching(&self) -> Branching {
        self.branching
    }

    fn split(&self, elements: &mut [Element<T>], _depth: u32) -> Split {
        let leaf_size = self.leaf_size.max(1);
        if elements.len() <= leaf_size {
            return Split::Terminal;
        }
        bisect(elements, self.branching.bisections(), leaf_size, |slice, _| {
            cheapest_cut(slice)
        })
    }

    fn name(&self) -> &'static str {
        "sah"
    }
}

/// The cost signal of a box.
fn box_metric<T: RmiValue>(aabb: &Aabb<T>, use_volume: bool) -> T {
    if use_volume {
        aabb.volume()
    } else {
        aabb.surface_area()
    }
}

/// Finds the cheapest cut of `elements`, reorders them along the winning axis and
/// returns the cut position. Returns `None` and leaves the order untouched when no cut
/// beats keeping the elements together.
fn cheapest_cut<T: RmiValue>(elements: &mut [Element<T>]) -> Option<usize> {
    let len = elements.len();
    if len < 2 {
        return None;
    }

    let parent = joint_aabb_of_elements(elements);
    let use_volume = parent.volume() > T::zero();
    let mut best_cost = count_to_real::<T>(len) * box_metric(&parent, use_volume);
    let mut best: Option<(Vec<usize>, usize)> = None;

    let mut suffix = vec![Aabb::empty(); len + 1];
    for axis in Axis::ALL {
        let i = axis.index();
        let mut order = (0..len).collect::<Vec<_>>();
        // `sort_by` is stable: ties keep their current relative order.
        order.sort_by(|&a, &b| total_cmp(elements[a].centroid[i], elements[b].centroid[i]));

        for k in (0..len).rev() {
            suffix[k] = suffix[k + 1].join(&elements[order[k]].aabb);
        }

        let mut prefix = Aabb::empty();
        let mut axis_best = None;
        for cut in 1..len {
            prefix.join_mut(&elements[order[cut - 1]].aabb);
            let cost = count_to_real::<T>(cut) * box_metric(&prefix, use_volume)
                + count_to_real::<T>(len - cut) * box_metric(&suffix[cut], use_volume);
            if cost < best_cost {
                best_cost = cost;
                axis_best = Some(cut);
            }
        }

        if let Some(cut) = axis_best {
            best = Some((order, cut));
        }
    }

    let (order, cut) = best?;
    let reordered = order.iter().map(|&k| elements[k]).collect::<Vec<_>>();
    elements.copy_from_slice(&reordered);
    Some(cut)
}

#[cfg(test)]
mod tests {
    use crate::mesh::Element;
    use crate::split::{Branching, Range, SahSplitter, Split, Splitter, SubRange};
    use crate::testbase::{elements_of, random_triangle_soup, unit_triangles_along_x, TPoint3, TTriangle};

    #[test]
    fn test_small_node_is_terminal() {
        let triangles = unit_triangles_along_x(16);
        let mut elements = elements_of(&triangles);
        assert_eq!(SahSplitter::default().split(&mut elements, 0), Split::Terminal);
    }

    #[test]
    fn test_cuts_between_two_clusters() {
        // Ten triangles near the origin, ten far away on the y axis, interleaved.
        let triangles = (0..20)
            .map(|i| {
                let offset = if i % 2 == 0 { 0.0 } else { 100.0 };
                let x = (i / 2) as f64 * 0.1;
                TTriangle::new(
                    TPoint3::new(x, offset, 0.0),
                    TPoint3::new(x + 0.05, offset, 0.0),
                    TPoint3::new(x, offset + 0.05, 0.05),
                )
            })
            .collect::<Vec<_>>();
        let mut elements = elements_of(&triangles);
        let splitter = SahSplitter::default().with_leaf_size(4);

        let split = splitter.split(&mut elements, 0);
        assert_eq!(
            split,
            Split::Partition(vec![
                SubRange {
                    range: Range::new(0, 10),
                    splittable: true
                },
                SubRange {
                    range: Range::new(10, 20),
                    splittable: true
                },
            ])
        );
        assert!(elements[..10].iter().all(|e| e.centroid.y < 50.0));
        assert!(elements[10..].iter().all(|e| e.centroid.y > 50.0));
        // The stable sort keeps mesh order inside each cluster.
        let near = elements[..10].iter().map(|e| e.index).collect::<Vec<_>>();
        assert_eq!(near, (0..20).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn test_coincident_elements_are_terminal() {
        let triangle = TTriangle::new(
            TPoint3::new(0.0, 0.0, 0.0),
            TPoint3::new(1.0, 0.0, 0.0),
            TPoint3::new(0.0, 1.0, 1.0),
        );
        let triangles = vec![triangle; 100];
        let mut elements = elements_of(&triangles);
        let before = elements.clone();

        assert_eq!(SahSplitter::default().split(&mut elements, 0), Split::Terminal);
        assert_eq!(elements, before);
    }

    #[test]
    fn test_flat_mesh_uses_surface_area() {
        // All triangles lie in the z = 0 plane, so every box has zero volume.
        let triangles = (0..64)
            .map(|i| {
                let x = i as f64;
                TTriangle::new(
                    TPoint3::new(x, 0.0, 0.0),
                    TPoint3::new(x + 0.5, 0.0, 0.0),
                    TPoint3::new(x, 0.5, 0.0),
                )
            })
            .collect::<Vec<_>>();
        let mut elements = elements_of(&triangles);
        match SahSplitter::default().split(&mut elements, 0) {
            Split::Partition(pieces) => assert_eq!(pieces.len(), 2),
            Split::Terminal => panic!("a flat mesh must still be split"),
        }
    }

    #[test]
    fn test_octree_partition_covers_slice() {
        let triangles = random_triangle_soup(500, 5);
        let mut elements = elements_of(&triangles);
        let split = SahSplitter::new(Branching::OCT).split(&mut elements, 0);

        let Split::Partition(pieces) = split else {
            panic!("500 scattered triangles must be split");
        };
        assert!(pieces.len() >= 2 && pieces.len() <= 8);
        let mut expected_begin = 0;
        for piece in &pieces {
            assert_eq!(piece.range.begin, expected_begin);
            assert!(!piece.range.is_empty());
            expected_begin = piece.range.end;
        }
        assert_eq!(expected_begin, elements.len());
    }

    #[test]
    fn test_deterministic_for_fixed_order() {
        let triangles = random_triangle_soup(300, 9);
        let run = || {
            let mut elements = elements_of(&triangles);
            let split = SahSplitter::new(Branching::QUAD).split(&mut elements, 0);
            (split, elements.iter().map(|e: &Element<f64>| e.index).collect::<Vec<_>>())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_nan_coordinates_keep_the_element_set() {
        let mut triangles = random_triangle_soup(100, 13);
        triangles[10].b.y = f64::NAN;
        triangles[57].c = TPoint3::new(f64::NAN, f64::NAN, f64::NAN);
        let mut elements = elements_of(&triangles);

        let _ = SahSplitter::default().with_leaf_size(4).split(&mut elements, 0);
        let mut indices = elements.iter().map(|e| e.index).collect::<Vec<_>>();
        indices.sort_unstable();
        assert_eq!(indices, (0..100).collect::<Vec<_>>());
    }
}
