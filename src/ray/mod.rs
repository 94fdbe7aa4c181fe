//! Rays and their intersections with boxes, triangles, meshes and trees.

mod ray_impl;
mod traverse;

pub use ray_impl::*;
