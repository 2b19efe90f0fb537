//! The parallel-kernel abstraction (spec.md §4.5): a portable
//! `ParallelContext`/`ParallelExecutor`/`ParallelKernel` workgroup model,
//! and the primitive-reduction passes built on it — reduce, scan, radix
//! sort, histogram, merge — that back a GPU-style variant of the
//! rasterizer's reduction passes. This crate implements only the CPU
//! simulator executor; GPU execution is out of scope (spec.md §1).

pub mod context;
pub mod executor;
pub mod histogram;
pub mod merge;
pub mod monoid;
pub mod radix_sort;
pub mod reduce;
pub mod scan;

pub use context::{DispatchSize, InvocationId, ParallelContext};
pub use executor::{CpuSimulator, ParallelExecutor, ParallelKernel};
pub use histogram::histogram;
pub use merge::merge;
pub use monoid::Monoid;
pub use radix_sort::radix_sort;
pub use reduce::reduce;
pub use scan::scan;
