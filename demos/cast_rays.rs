use nalgebra::{Point3, Vector3};
use rmi::{Branching, ElementView, RawMesh, Ray, SahSplitter, Tree};

pub fn main() -> rmi::Result<()> {
    // A staircase of 100,000 unit right triangles, one in each plane x = 1, 2, ...
    let count = 100_000_u32;
    let mut coords = Vec::with_capacity(count as usize * 9);
    let mut indices = Vec::with_capacity(count as usize * 3);
    for i in 0..count {
        let x = (i + 1) as f32;
        coords.extend_from_slice(&[x, 0.0, 0.0, x, 1.0, 0.0, x, 0.0, 1.0]);
        indices.extend_from_slice(&[3 * i, 3 * i + 1, 3 * i + 2]);
    }
    let mesh = RawMesh::new(coords, &indices)?;

    let splitter = SahSplitter::new(Branching::OCT);
    let tree = Tree::build_parallel(ElementView::new(&mesh), &splitter, 4)?;
    println!("{tree:?}");

    let ray = Ray::new(Point3::new(0.0, 0.25, 0.25), Vector3::new(1.0, 0.0, 0.0));
    let epsilon = rmi::default_epsilon::<f32>();
    let sequential = ray.intersects_tree(&tree, epsilon);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build()?;
    let fork_join = ray.intersects_tree_fork_join_in(&pool, &tree, epsilon);
    let work_stealing = ray.intersects_tree_work_stealing(&tree, 4, epsilon)?;
    println!(
        "hits: {} sequential, {} fork-join, {} work-stealing",
        sequential.len(),
        fork_join.len(),
        work_stealing.len()
    );
    dbg!(ray.nearest_intersection(&tree, epsilon));
    Ok(())
}
