//! Common utilities shared by unit tests.
#![cfg(test)]

use crate::aabb::{Aabb, Bounded};
use crate::mesh::{Element, MeshSource};
use crate::ray::Ray;
use crate::split::{Split, Splitter};
use crate::tree::{Node, Tree, MAX_TREE_DEPTH};
use crate::utils::approx_eq;
use crate::Triangle;
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Point type used in tests.
pub type TPoint3 = Point3<f64>;

/// Vector type used in tests.
pub type TVector3 = Vector3<f64>;

/// Box type used in tests.
pub type TAabb3 = Aabb<f64>;

/// Triangle type used in tests.
pub type TTriangle = Triangle<f64>;

/// Ray type used in tests.
pub type TRay3 = Ray<f64>;

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Convert a `TupleVec` to a [`TPoint3`].
pub fn tuple_to_point(tpl: &TupleVec) -> TPoint3 {
    TPoint3::new(tpl.0 as f64, tpl.1 as f64, tpl.2 as f64)
}

/// Convert a `TupleVec` to a [`TVector3`].
pub fn tuple_to_vector(tpl: &TupleVec) -> TVector3 {
    TVector3::new(tpl.0 as f64, tpl.1 as f64, tpl.2 as f64)
}

/// `n` triangles in the planes `x = 1, 2, ..., n`, each with the right angle on the
/// x axis: `(x, 0, 0)`, `(x, 1, 0)`, `(x, 0, 1)`.
pub fn unit_triangles_along_x(n: usize) -> Vec<TTriangle> {
    (1..=n)
        .map(|x| {
            let x = x as f64;
            TTriangle::new(
                TPoint3::new(x, 0.0, 0.0),
                TPoint3::new(x, 1.0, 0.0),
                TPoint3::new(x, 0.0, 1.0),
            )
        })
        .collect()
}

/// The elements of `triangles`, in mesh order.
pub fn elements_of(triangles: &[TTriangle]) -> Vec<Element<f64>> {
    triangles
        .iter()
        .enumerate()
        .map(|(index, triangle)| Element::new(index, triangle))
        .collect()
}

/// `n` deterministic random triangles with edges up to 2 units long, scattered in
/// `[-100, 100]^3`.
pub fn random_triangle_soup(n: usize, seed: u64) -> Vec<TTriangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let offset = |rng: &mut StdRng, extent: f64| {
        TVector3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        )
    };
    (0..n)
        .map(|_| {
            let a = TPoint3::origin() + offset(&mut rng, 100.0);
            TTriangle::new(a, a + offset(&mut rng, 1.0), a + offset(&mut rng, 1.0))
        })
        .collect()
}

/// Creates a unit size cube centered at `pos` and pushes the triangles to `shapes`.
fn push_cube(pos: TPoint3, shapes: &mut Vec<TTriangle>) {
    let top_front_right = pos + TVector3::new(0.5, 0.5, -0.5);
    let top_back_right = pos + TVector3::new(0.5, 0.5, 0.5);
    let top_back_left = pos + TVector3::new(-0.5, 0.5, 0.5);
    let top_front_left = pos + TVector3::new(-0.5, 0.5, -0.5);
    let bottom_front_right = pos + TVector3::new(0.5, -0.5, -0.5);
    let bottom_back_right = pos + TVector3::new(0.5, -0.5, 0.5);
    let bottom_back_left = pos + TVector3::new(-0.5, -0.5, 0.5);
    let bottom_front_left = pos + TVector3::new(-0.5, -0.5, -0.5);

    let faces = [
        (top_back_right, top_front_right, top_front_left),
        (top_front_left, top_back_left, top_back_right),
        (bottom_front_left, bottom_front_right, bottom_back_right),
        (bottom_back_right, bottom_back_left, bottom_front_left),
        (top_back_left, top_front_left, bottom_front_left),
        (bottom_front_left, bottom_back_left, top_back_left),
        (bottom_front_right, top_front_right, top_back_right),
        (top_back_right, bottom_back_right, bottom_front_right),
        (top_front_left, top_front_right, bottom_front_right),
        (bottom_front_right, bottom_front_left, top_front_left),
        (bottom_back_right, top_back_right, top_back_left),
        (top_back_left, bottom_back_left, bottom_back_right),
    ];
    shapes.extend(faces.into_iter().map(|(a, b, c)| TTriangle::new(a, b, c)));
}

/// Implementation of splitmix64.
/// For reference see: http://xoroshiro.di.unimi.it/splitmix64.c
fn splitmix64(x: &mut u64) -> u64 {
    *x = x.wrapping_add(0x9E3779B97F4A7C15u64);
    let mut z = *x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EBu64);
    z ^ (z >> 31)
}

/// Generates a new `Point3`, which will lie inside the given `aabb`. Mutates the seed.
fn next_point3(seed: &mut u64, aabb: &TAabb3) -> TPoint3 {
    let u = splitmix64(seed);
    let a = ((u >> 32) & 0xFFFFFFFF) as i64 - 0x80000000;
    let b = (u & 0xFFFFFFFF) as i64 - 0x80000000;
    let c = (a ^ b.rotate_left(6)) as i32 as i64;
    let unit = |v: i64| (v as f64 / i32::MAX as f64 + 1.0) * 0.5;
    let size = aabb.size();
    aabb.min + TVector3::new(unit(a) * size.x, unit(b) * size.y, unit(c) * size.z)
}

/// The space [`create_n_cubes`] scatters its cubes in.
pub fn default_bounds() -> TAabb3 {
    TAabb3::with_bounds(
        TPoint3::new(-10.0, -10.0, -10.0),
        TPoint3::new(10.0, 10.0, 10.0),
    )
}

/// Creates `n` deterministic random cubes. Returns the `Vec` of surface `Triangle`s.
pub fn create_n_cubes(n: usize) -> Vec<TTriangle> {
    let bounds = default_bounds();
    let mut vec = Vec::new();
    let mut seed = 0;
    for _ in 0..n {
        push_cube(next_point3(&mut seed, &bounds), &mut vec);
    }
    vec
}

/// `n` deterministic rays starting in `[-15, 15]^3` and pointing at some point of
/// [`default_bounds`].
pub fn random_rays(n: usize, seed: u64) -> Vec<TRay3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let point = |rng: &mut StdRng, extent: f64| {
        TPoint3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        )
    };
    (0..n)
        .map(|_| {
            let origin = point(&mut rng, 15.0);
            let target = point(&mut rng, 10.0);
            TRay3::new(origin, target - origin)
        })
        .collect()
}

/// A triangulated `n` by `n` grid on the tilted plane `z = 0.5 x + 0.25 y`. Inner vertices
/// are shared by six triangles and inner edges by two.
pub fn tilted_grid(n: usize) -> Vec<TTriangle> {
    let vertex = |i: usize, j: usize| {
        let (x, y) = (i as f64, j as f64);
        TPoint3::new(x, y, 0.5 * x + 0.25 * y)
    };
    let mut triangles = Vec::with_capacity(2 * n * n);
    for i in 0..n {
        for j in 0..n {
            triangles.push(TTriangle::new(vertex(i, j), vertex(i + 1, j), vertex(i + 1, j + 1)));
            triangles.push(TTriangle::new(vertex(i, j), vertex(i + 1, j + 1), vertex(i, j + 1)));
        }
    }
    triangles
}

/// Rays from deterministic random origins in `[-extent, extent]^3`, aimed exactly at the
/// vertices and edge midpoints of `triangles`.
///
/// A target is skipped when its triangle is needle shaped (twice its area below a fifth
/// of its longest squared edge), or when the ray meets the triangle's plane at a cosine
/// below `0.2`.
pub fn vertex_and_edge_rays(triangles: &[TTriangle], extent: f64, seed: u64) -> Vec<TRay3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rays = Vec::new();
    for triangle in triangles {
        let (a, b, c) = (triangle.a, triangle.b, triangle.c);
        let normal = (b - a).cross(&(c - a));
        let longest = [(b - a), (c - b), (a - c)]
            .iter()
            .map(|edge| edge.norm_squared())
            .fold(0.0, f64::max);
        if normal.norm() < 0.2 * longest {
            continue;
        }
        let normal = normal.normalize();

        let targets = [
            a,
            b,
            c,
            nalgebra::center(&a, &b),
            nalgebra::center(&b, &c),
            nalgebra::center(&c, &a),
        ];
        for target in targets {
            let origin = TPoint3::new(
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
                rng.random_range(-extent..extent),
            );
            let direction = target - origin;
            if direction.norm() < 1.0 {
                continue;
            }
            let ray = TRay3::new(origin, direction);
            if normal.dot(&ray.direction).abs() >= 0.2 {
                rays.push(ray);
            }
        }
    }
    rays
}

/// Asserts that `actual` and `expected` hold the same points in any order, each
/// coordinate within `epsilon`.
pub fn assert_same_points(actual: &[TPoint3], expected: &[TPoint3], epsilon: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "got {} points, expected {}",
        actual.len(),
        expected.len()
    );
    let mut matched = vec![false; expected.len()];
    for point in actual {
        let found = expected
            .iter()
            .enumerate()
            .position(|(i, other)| !matched[i] && approx_eq(point, other, epsilon));
        match found {
            Some(i) => matched[i] = true,
            None => panic!("unexpected point {point}"),
        }
    }
}

/// Checks the structure of `tree`:
///
/// - the root covers all elements,
/// - children of a node are contiguous, non-empty, cover their parent and number between
///   2 and the branching factor,
/// - every box contains the boxes of its children and of its elements,
/// - the elements are a permutation of the mesh indices.
pub fn assert_tree_invariants<M: MeshSource<f64> + ?Sized>(tree: &Tree<'_, f64, M>) {
    let elements = tree.elements();
    assert_eq!(tree.root().range(), crate::Range::new(0, elements.len()));

    let mut indices = elements.iter().map(|element| element.index).collect::<Vec<_>>();
    indices.sort_unstable();
    assert!(indices.iter().copied().eq(0..tree.mesh().size()));

    for element in elements {
        let triangle = tree.mesh().triangle(element.index);
        assert_eq!(element.aabb, triangle.aabb());
        assert!(approx_eq(&element.centroid, &triangle.centroid(), 1e-12));
    }

    assert_node(tree, tree.root(), 0);
}

fn assert_node<M: MeshSource<f64> + ?Sized>(tree: &Tree<'_, f64, M>, node: &Node<f64>, depth: u32) {
    assert!(depth <= MAX_TREE_DEPTH);
    let range = node.range();
    for element in tree.elements_in(range) {
        assert!(node.aabb().approx_contains_aabb_eps(&element.aabb, 1e-9));
    }

    if let Node::Internal { children, .. } = node {
        assert!(children.len() >= 2);
        assert!(children.len() <= tree.branching().max_children());
        let mut begin = range.begin;
        for child in children {
            assert!(!child.range().is_empty());
            assert_eq!(child.range().begin, begin);
            begin = child.range().end;
            assert!(node.aabb().approx_contains_aabb_eps(child.aabb(), 1e-9));
            assert_node(tree, child, depth + 1);
        }
        assert_eq!(begin, range.end);
    }
}

/// Asserts that `splitter` would not split any leaf of `tree` further. Leaves at the
/// depth ceiling are exempt.
pub fn assert_leaves_are_final<M, S>(tree: &Tree<'_, f64, M>, splitter: &S)
where
    M: MeshSource<f64> + ?Sized,
    S: Splitter<f64> + ?Sized,
{
    fn visit<M, S>(tree: &Tree<'_, f64, M>, node: &Node<f64>, depth: u32, splitter: &S)
    where
        M: MeshSource<f64> + ?Sized,
        S: Splitter<f64> + ?Sized,
    {
        match node {
            Node::Leaf { range, .. } => {
                if depth < MAX_TREE_DEPTH {
                    let mut elements = tree.elements_in(*range).to_vec();
                    assert_eq!(
                        splitter.split(&mut elements, depth),
                        Split::Terminal,
                        "leaf {range} at depth {depth} is splittable"
                    );
                }
            }
            Node::Internal { children, .. } => {
                for child in children {
                    visit(tree, child, depth + 1, splitter);
                }
            }
        }
    }
    visit(tree, tree.root(), 0, splitter);
}
