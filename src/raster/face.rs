//! A face (as a polygon with optional holes) paired with the render
//! program that shades it — the unit the rasterizer consumes.

use std::collections::HashMap;

use crate::math::vec2::Vec2;
use crate::render::program::RenderProgram;

/// Packed per-face program-binding bits (spec.md §4.4/§6): whether the
/// fine pass needs to compute a centroid or retain the clipped polygon for
/// this face's program, and whether the program is constant (so
/// evaluation can be hoisted out of the per-pixel loop).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceProgramBits {
    pub needs_centroid: bool,
    pub needs_face: bool,
    pub is_constant: bool,
}

impl FaceProgramBits {
    /// Derive the binding bits for `program` by a conservative tree walk:
    /// `needs_centroid` is set by any gradient or `LinearBlend` node
    /// (they sample at the centroid or pixel center, never a fixed
    /// point); `needs_face` by any node reading `ctx.point`/face geometry
    /// (`Image`, the two gradient families); `is_constant` holds only for
    /// programs with no per-pixel-varying leaf at all.
    pub fn derive(program: &RenderProgram) -> Self {
        let mut bits = FaceProgramBits { needs_centroid: false, needs_face: false, is_constant: true };
        walk(program, &mut bits);
        bits
    }
}

fn walk(program: &RenderProgram, bits: &mut FaceProgramBits) {
    use RenderProgram::*;
    match program {
        Color(_) | PathBoolean(_) => {}
        NormalDebug | BarycentricDebug | Depth => {
            bits.is_constant = false;
        }
        Image { .. } => {
            bits.needs_face = true;
            bits.is_constant = false;
        }
        LinearBlend { .. } => {
            bits.needs_centroid = true;
            bits.is_constant = false;
        }
        LinearGradient { .. } | RadialGradient { .. } => {
            bits.needs_centroid = true;
            bits.needs_face = true;
            bits.is_constant = false;
        }
        _ => {}
    }
    for child in program.children() {
        walk(child, bits);
    }
}

/// A face ready for rasterization: its outer boundary and holes in pixel
/// space, the render program that shades it, each input path's winding
/// number over this face (read by `PathBoolean` leaves), and the derived
/// program-binding bits.
#[derive(Clone, Debug)]
pub struct RenderableFace {
    pub outer: Vec<Vec2>,
    pub holes: Vec<Vec<Vec2>>,
    pub program: RenderProgram,
    pub winding_map: HashMap<u32, i32>,
    pub bits: FaceProgramBits,
}

impl RenderableFace {
    pub fn new(outer: Vec<Vec2>, holes: Vec<Vec<Vec2>>, program: RenderProgram, winding_map: HashMap<u32, i32>) -> Self {
        let bits = FaceProgramBits::derive(&program);
        Self { outer, holes, program, winding_map, bits }
    }

    /// Axis-aligned bounding box of the outer boundary, used by the
    /// coarse pass to find the tiles/bins a face touches.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        if self.outer.is_empty() {
            return None;
        }
        let mut min = self.outer[0];
        let mut max = self.outer[0];
        for &p in &self.outer {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Some((min, max))
    }
}
