//! The crate's top-level entry point (spec.md §6/§7): arranges a set of
//! input paths, recovers the fillable faces, binds each to the render
//! program, and rasterizes them into the caller's output raster.

use crate::cag::arrangement::{Arrangement, ArrangementConfig};
use crate::error::{CagError, RasterError};
use crate::math::vec2::Vec2;
use crate::paths::RenderPath;
use crate::raster::face::RenderableFace;
use crate::raster::output::OutputRaster;
use crate::raster::two_pass::{rasterize_faces, TwoPassConfig};
use crate::render::program::RenderProgram;
use crate::render::simplify::simplify;

/// Rasterize `paths` shaded by `program` into `raster`, clipped to the
/// `TwoPassConfig` the caller supplies. `program` is simplified once up
/// front and that simplified tree is shared by every recovered face.
///
/// A CAG pass that produces no fillable faces (`CagError::Degenerate`)
/// leaves `raster` untouched rather than erroring, per spec.md §7 — an
/// empty boolean combination of paths is a blank image, not a failure.
pub fn rasterize(paths: &[RenderPath], program: &RenderProgram, raster: &mut dyn OutputRaster, config: &TwoPassConfig) -> Result<(), RasterError> {
    let arrangement = match Arrangement::build(paths, ArrangementConfig::default()) {
        Ok(a) => a,
        Err(CagError::Degenerate) => return Ok(()),
        Err(other) => return Err(other.into()),
    };

    let filled = arrangement.filter_faces(Arrangement::default_is_inside);
    if filled.is_empty() {
        return Ok(());
    }

    let simplified = simplify(program);

    let faces: Vec<RenderableFace> = filled
        .iter()
        .map(|face| {
            let outer = arrangement.face_outline(face).into_iter().map(|(x, y)| Vec2::new(x as f32, y as f32)).collect();
            let holes = arrangement
                .face_holes(face)
                .into_iter()
                .map(|hole| hole.into_iter().map(|(x, y)| Vec2::new(x as f32, y as f32)).collect())
                .collect();
            RenderableFace::new(outer, holes, simplified.clone(), face.windings.clone())
        })
        .collect();

    rasterize_faces(&faces, raster, config, None);
    Ok(())
}
