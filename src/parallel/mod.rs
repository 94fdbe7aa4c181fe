//! Parallel tree construction and the two concurrent query engines.
//!
//! The fork-join engine (feature `rayon`) turns every child the ray hits into a rayon
//! task. The work-stealing engine runs on a [`WorkStealingPool`] of plain threads, each
//! with its own queue of pending nodes.

#[cfg(feature = "rayon")]
mod fork_join;
mod work_queue;
mod work_stealing;

#[cfg(feature = "rayon")]
pub(crate) use fork_join::{build_tree, intersect_fork_join, intersect_fork_join_in};
pub use work_queue::WorkQueue;
pub use work_stealing::{WorkStealingPool, Worker};

use crate::error::Result;
use crate::mesh::MeshSource;
use crate::ray::Ray;
use crate::tree::{Node, Tree};
use crate::RmiValue;
use log::debug;
use nalgebra::Point3;

/// Default for [`ParallelBuildOptions::sequential_cutoff`].
#[cfg(feature = "rayon")]
pub const DEFAULT_SEQUENTIAL_CUTOFF: usize = 1024;

/// Options of [`Tree::build_parallel_with`].
#[cfg(feature = "rayon")]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParallelBuildOptions {
    /// Number of pool threads. Must not be zero.
    pub threads: usize,
    /// Subtrees with fewer elements are built on the current thread, without forking.
    pub sequential_cutoff: usize,
}

#[cfg(feature = "rayon")]
impl ParallelBuildOptions {
    /// Options for `threads` threads and the default cutoff.
    pub fn new(threads: usize) -> ParallelBuildOptions {
        ParallelBuildOptions {
            threads,
            sequential_cutoff: DEFAULT_SEQUENTIAL_CUTOFF,
        }
    }

    /// Sets the sequential cutoff.
    pub fn with_sequential_cutoff(mut self, sequential_cutoff: usize) -> ParallelBuildOptions {
        self.sequential_cutoff = sequential_cutoff;
        self
    }
}

#[cfg(feature = "rayon")]
impl Default for ParallelBuildOptions {
    fn default() -> ParallelBuildOptions {
        ParallelBuildOptions::new(rayon::current_num_threads())
    }
}

/// Runs [`Ray::intersects_tree`] on a [`WorkStealingPool`]. Items are nodes whose box the
/// ray hits. A worker descends into one hit child itself and queues the others.
pub(crate) fn intersect_work_stealing<T, M>(
    ray: &Ray<T>,
    tree: &Tree<'_, T, M>,
    threads: usize,
    epsilon: T,
) -> Result<Vec<Point3<T>>>
where
    T: RmiValue,
    M: MeshSource<T> + ?Sized,
{
    let mut pool: WorkStealingPool<&Node<T>> = WorkStealingPool::new(threads)?;
    debug!("work-stealing query on {threads} threads");
    if !ray.intersects_aabb(tree.aabb()) {
        return Ok(Vec::new());
    }

    pool.run(tree.root(), |worker, mut node, hits| loop {
        match node {
            Node::Leaf { range, .. } => {
                ray.collect_leaf_hits(tree, *range, epsilon, hits);
                return;
            }
            Node::Internal { children, .. } => {
                let mut hit_children = children
                    .iter()
                    .filter(|child| ray.intersects_aabb(child.aabb()));
                match hit_children.next() {
                    Some(first) => {
                        for other in hit_children {
                            worker.push(other);
                        }
                        node = first;
                    }
                    None => return,
                }
            }
        }
    })
}
