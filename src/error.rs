//! Error kinds for the CAG engine, the render program, and the parallel
//! kernel executor.
//!
//! The teacher hand-rolls one `Display`/`Error` impl per failure-prone
//! subsystem (`mesh::LoadError`); this crate has many more leaf error
//! sites, so each subsystem gets a `thiserror`-derived enum and they are
//! unified under [`RasterError`] for the top-level `rasterize` entry
//! point.

use thiserror::Error;

/// Errors from the CAG arrangement pipeline (snapping through face
/// recovery).
#[derive(Debug, Error)]
pub enum CagError {
    #[error("path has {0} vertices, need at least 3")]
    TooFewVertices(usize),

    #[error("non-finite coordinate in input path")]
    NonFiniteCoordinate,

    #[error("integer snapping would overflow the configured range; retry with a coarser transform")]
    NumericRange,

    #[error("arrangement produced no faces (all inputs cancelled)")]
    Degenerate,
}

/// Errors from constructing or compiling a render program.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{op} expects {expected} children, got {actual}")]
    ArityMismatch { op: &'static str, expected: usize, actual: usize },

    #[error("instruction stream exceeded the evaluator's stack capacity ({capacity})")]
    StackOverflow { capacity: usize },
}

/// Fatal errors from the parallel kernel executor. These
/// indicate a bug in the pipeline and abort the current dispatch rather
/// than propagating as a recoverable `Result` to rendering callers.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("workgroup barrier count mismatch: invocation {invocation} expected {expected} barriers, saw {actual}")]
    BarrierMismatch { invocation: usize, expected: usize, actual: usize },

    #[error("dispatch declares aliasing read-write resource slots: {0} and {1}")]
    AliasingSlots(usize, usize),

    #[error("invalid parallel dispatch configuration: {0}")]
    InvalidConfiguration(String),
}

/// The unified error type returned by the crate's top-level `rasterize`
/// entry point.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Cag(#[from] CagError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}
