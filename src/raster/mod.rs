//! The analytic rasterizer: clips each renderable face to pixel/filter
//! cells, evaluates its render program on the clipped micro-polygon, and
//! accumulates the result into an output raster under a reconstruction
//! filter.

pub mod face;
pub mod filter;
pub mod output;
pub mod two_pass;

pub use face::RenderableFace;
pub use filter::ReconstructionFilter;
pub use output::{ImageRaster, OutputRaster, RasterColorConverter, RasterColorSpace};
pub use two_pass::{rasterize_faces, FineFaceRecord, TwoPassConfig};
