//! A 2D vector-graphics rasterizer built around an analytic polygon
//! rasterization core: exact-arithmetic planar arrangement (`cag`), a
//! pure shading-operator tree (`render`), and the clipping and
//! analytic-integration machinery that turns the two into pixels
//! (`clip`, `raster`). A portable workgroup-style `parallel` abstraction
//! backs the primitive-reduction passes the rasterizer can be driven by.

pub mod cag;
pub mod clip;
pub mod error;
pub mod math;
pub mod parallel;
pub mod paths;
pub mod raster;
pub mod render;
pub mod rasterize;

pub use error::{CagError, KernelError, ProgramError, RasterError};
pub use paths::RenderPath;
pub use rasterize::rasterize;
