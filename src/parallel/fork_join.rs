//! Fork-join tree construction and queries on rayon pools.

use crate::error::{Result, RmiError};
use crate::mesh::{Element, MeshSource};
use crate::parallel::ParallelBuildOptions;
use crate::ray::Ray;
use crate::split::Splitter;
use crate::tree::{Node, NodeBuildArgs, Tree};
use crate::RmiValue;
use log::trace;
use nalgebra::Point3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

fn thread_pool(threads: usize, role: &'static str) -> Result<ThreadPool> {
    if threads == 0 {
        return Err(RmiError::InvalidThreadCount(threads));
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |index| format!("rmi-{role}-{index}"))
        .build()?)
}

/// Builds the nodes over `elements` with one task per pending child.
pub(crate) fn build_tree<T, S>(
    elements: &mut [Element<T>],
    splitter: &S,
    options: &ParallelBuildOptions,
) -> Result<Node<T>>
where
    T: RmiValue,
    S: Splitter<T> + ?Sized,
{
    let pool = thread_pool(options.threads, "build")?;
    let cutoff = options.sequential_cutoff;
    Ok(pool.install(|| build_node(NodeBuildArgs::root(elements), splitter, cutoff)))
}

fn build_node<T, S>(args: NodeBuildArgs<'_, T>, splitter: &S, cutoff: usize) -> Node<T>
where
    T: RmiValue,
    S: Splitter<T> + ?Sized,
{
    // Small subtrees are not worth a task each.
    if args.len() < cutoff {
        return args.build(splitter);
    }
    args.build_with_executor(splitter, |children| {
        children
            .into_par_iter()
            .map(|child| build_node(child, splitter, cutoff))
            .collect()
    })
}

/// Runs [`Ray::intersects_tree`] on a pool of `threads` threads built for this query.
pub(crate) fn intersect_fork_join<T, M>(
    ray: &Ray<T>,
    tree: &Tree<'_, T, M>,
    threads: usize,
    epsilon: T,
) -> Result<Vec<Point3<T>>>
where
    T: RmiValue,
    M: MeshSource<T> + ?Sized,
{
    let pool = thread_pool(threads, "query")?;
    Ok(intersect_fork_join_in(&pool, ray, tree, epsilon))
}

/// Runs [`Ray::intersects_tree`] on `pool` with one task per hit child.
pub(crate) fn intersect_fork_join_in<T, M>(
    pool: &ThreadPool,
    ray: &Ray<T>,
    tree: &Tree<'_, T, M>,
    epsilon: T,
) -> Vec<Point3<T>>
where
    T: RmiValue,
    M: MeshSource<T> + ?Sized,
{
    if !ray.intersects_aabb(tree.aabb()) {
        return Vec::new();
    }
    trace!("fork-join query on {} threads", pool.current_num_threads());
    pool.install(|| intersect_node(ray, tree, tree.root(), epsilon))
}

fn intersect_node<T, M>(
    ray: &Ray<T>,
    tree: &Tree<'_, T, M>,
    node: &Node<T>,
    epsilon: T,
) -> Vec<Point3<T>>
where
    T: RmiValue,
    M: MeshSource<T> + ?Sized,
{
    match node {
        Node::Leaf { range, .. } => {
            let mut hits = Vec::new();
            ray.collect_leaf_hits(tree, *range, epsilon, &mut hits);
            hits
        }
        Node::Internal { children, .. } => children
            .par_iter()
            .filter(|child| ray.intersects_aabb(child.aabb()))
            .map(|child| intersect_node(ray, tree, child, epsilon))
            .reduce(Vec::new, |mut hits, mut more| {
                hits.append(&mut more);
                hits
            }),
    }
}
