//! Error types for tree construction and parallel queries.

use thiserror::Error;

/// Errors surfaced by the fallible entry points of this crate.
///
/// Geometric degeneracies are not errors: a ray parallel to a triangle simply does not
/// intersect it. Invalid partitions returned by a [`Splitter`] are programming errors
/// and panic instead.
///
/// [`Splitter`]: ../split/trait.Splitter.html
#[derive(Error, Debug)]
pub enum RmiError {
    /// A parallel entry point was asked to run on zero threads.
    #[error("invalid thread count {0}: at least one thread is required")]
    InvalidThreadCount(usize),

    /// The rayon pool backing a fork-join build or query could not be created.
    #[cfg(feature = "rayon")]
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A work-stealing worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A work-stealing worker panicked before finishing its share of the query.
    #[error("worker thread panicked")]
    WorkerPanicked,

    /// The requested number of bisections per tree level is out of range.
    #[error("invalid branching: {0} bisections per level, expected 1..={max}", max = crate::split::MAX_BISECTIONS)]
    InvalidBranching(u32),

    /// A raw vertex/index buffer does not describe a triangle mesh.
    #[error("malformed mesh: {message}")]
    MalformedMesh {
        /// Description of the defect.
        message: String,
    },
}

/// Result type for the fallible operations of this crate.
pub type Result<T> = std::result::Result<T, RmiError>;
