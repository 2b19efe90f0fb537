//! Clipping primitives: line-against-AABB and polygon-against-AABB, the
//! geometric substrate the rasterizer's two-pass scheme clips faces with.

pub mod line;
pub mod polygon;

pub use line::clip_segment;
pub use polygon::{clip_polygon, ClippedPolygon};
