//! A crate which finds the intersections of rays with triangulated surface meshes.
//!
//! ## About
//!
//! Meshes are indexed by an N-ary bounding volume tree. A tree is built once from a
//! reorderable view over the mesh triangles ([`ElementView`]) and a [`Splitter`] policy,
//! and is read-only afterwards. The branching factor is a runtime value: one bisection
//! per level gives a binary "KD" tree, two give a quadtree and three an octree.
//!
//! Two splitters are provided. [`SahSplitter`] sweeps every cut position on every axis
//! and minimizes the expected traversal cost, [`MedianSplitter`] cuts at the positional
//! median on an axis that rotates with depth.
//!
//! Queries return every intersection point of a ray with the mesh. They can be run
//! sequentially, with fork-join tasks on a [rayon](https://docs.rs/rayon) pool, or on a
//! work-stealing pool of plain threads.
//!
//! ## Example
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use rmi::{ElementView, Ray, SahSplitter, Tree, Triangle};
//!
//! let triangles = (1..=100)
//!     .map(|x| {
//!         let x = x as f64;
//!         Triangle::new(
//!             Point3::new(x, 0.0, 0.0),
//!             Point3::new(x, 1.0, 0.0),
//!             Point3::new(x, 0.0, 1.0),
//!         )
//!     })
//!     .collect::<Vec<_>>();
//!
//! let tree = Tree::build(ElementView::new(triangles.as_slice()), &SahSplitter::default());
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
//! let hits = ray.intersects_tree(&tree, f64::EPSILON);
//! assert_eq!(hits.len(), 100);
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - parallel tree construction and the fork-join query engine
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for
//!   the plain value types
//!

use nalgebra::{ClosedAddAssign, ClosedDivAssign, ClosedMulAssign, ClosedSubAssign, Scalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

pub mod aabb;
pub mod axis;
pub mod error;
pub mod mesh;
pub mod parallel;
pub mod ray;
pub mod split;
pub mod tree;
mod utils;

#[cfg(test)]
mod testbase;

pub use aabb::{Aabb, Bounded};
pub use error::{Result, RmiError};
pub use mesh::{Element, ElementView, MeshSource, RawMesh, Triangle};
pub use ray::{Hit, Ray};
pub use split::{Branching, MedianSplitter, Range, SahSplitter, Split, Splitter, SubRange};
pub use tree::{Node, Tree};
pub use utils::approx_eq;

#[cfg(feature = "rayon")]
pub use parallel::ParallelBuildOptions;

/// The float type a mesh is stored and queried in. Implemented for `f32` and `f64`.
pub trait RmiValue:
    Scalar
    + Copy
    + Float
    + FromPrimitive
    + ClosedAddAssign
    + ClosedSubAssign
    + ClosedMulAssign
    + ClosedDivAssign
    + Send
    + Sync
    + Debug
    + Display
{
}

impl<T> RmiValue for T where
    T: Scalar
        + Copy
        + Float
        + FromPrimitive
        + ClosedAddAssign
        + ClosedSubAssign
        + ClosedMulAssign
        + ClosedDivAssign
        + Send
        + Sync
        + Debug
        + Display
{
}

/// Default intersection tolerance: the machine epsilon of `T`.
pub fn default_epsilon<T: RmiValue>() -> T {
    T::epsilon()
}
