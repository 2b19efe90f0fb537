//! Tree-walking evaluation of a render program against a per-face/per-pixel
//! context.

use std::collections::HashMap;

use crate::math::vec2::Vec2;
use crate::math::vec4::Vec4;

use super::color::{premultiply, unpremultiply};
use super::program::{BlendMode, LinearBlendAccuracy, RenderProgram};

/// Everything a node might need to evaluate itself at a point: where that
/// point is, what face it belongs to, and the winding map the CAG engine
/// computed for that face.
#[derive(Clone, Debug)]
pub struct RenderEvaluationContext<'a> {
    /// The point being shaded, in the caller's original coordinate system
    /// (a pixel center, or a clipped micro-polygon's centroid).
    pub point: Vec2,
    /// The pixel's bounds, used by pixel-center-accuracy nodes.
    pub pixel_center: Vec2,
    /// The clipped face polygon's centroid, used by centroid-accuracy
    /// nodes; `None` when the evaluator has no face geometry at hand.
    pub centroid: Option<Vec2>,
    /// Per-path winding numbers for the face currently being shaded.
    pub winding_map: &'a HashMap<u32, i32>,
    /// Optional image sample hook; `Image` nodes read through this since
    /// this crate does not implement image decoding itself.
    pub image_sample: Option<&'a dyn Fn(u32, Vec2) -> Vec4>,
    /// The interpolation parameter a `LinearBlend` node reads, already
    /// resolved into `[0, 1]` by whatever upstream geometry defines it
    /// (a gradient line, a face-local parametrization, ...). `LinearBlend`
    /// itself carries no geometry of its own in this crate's operator
    /// set; see `DESIGN.md` for why the parameter lives on the context
    /// instead.
    pub linear_t: f32,
}

impl RenderProgram {
    /// Evaluate this node at `ctx`, producing a premultiplied color.
    pub fn evaluate(&self, ctx: &RenderEvaluationContext) -> Vec4 {
        use RenderProgram::*;
        match self {
            Color(c) => *c,
            PathBoolean(path_id) => {
                if ctx.winding_map.get(path_id).copied().unwrap_or(0) != 0 {
                    Vec4::ONE
                } else {
                    Self::TRANSPARENT
                }
            }
            Alpha(child, a) => child.evaluate(ctx) * *a,
            Premultiply(child) => premultiply(child.evaluate(ctx)),
            Unpremultiply(child) => unpremultiply(child.evaluate(ctx)),
            ColorSpace(conversion, child) => conversion.apply(child.evaluate(ctx)),
            NormalDebug | BarycentricDebug | Depth => Self::TRANSPARENT,
            Image { sampler, transform, .. } => {
                let p = transform.apply(ctx.point);
                ctx.image_sample.map(|f| f(sampler.0, p)).unwrap_or(Self::TRANSPARENT)
            }
            Blend(mode, a, b) => blend(*mode, a.evaluate(ctx), b.evaluate(ctx)),
            Stack(children) => {
                children.iter().fold(Self::TRANSPARENT, |acc, child| composite_over(acc, child.evaluate(ctx)))
            }
            LinearBlend { accuracy, zero, one } => {
                if *accuracy == LinearBlendAccuracy::SplitAccurate {
                    log::warn!("LinearBlendAccuracy::SplitAccurate is not implemented; falling back to UnsplitCentroid");
                }
                let t = ctx.linear_t.clamp(0.0, 1.0);
                zero.evaluate(ctx).lerp(one.evaluate(ctx), t)
            }
            LinearGradient { accuracy, extend, line, stops } => {
                let sample = gradient_sample_point(ctx, *accuracy);
                let (p0, p1) = *line;
                let d = p1 - p0;
                let len_sq = d.dot(d);
                let raw_t = if len_sq > 0.0 { (sample - p0).dot(d) / len_sq } else { 0.0 };
                super::gradient::evaluate(stops, extend.apply(raw_t))
            }
            RadialGradient { accuracy, extend, center0, radius0, center1, radius1, stops, .. } => {
                let sample = gradient_sample_point(ctx, *accuracy);
                let raw_t = radial_gradient_t(sample, *center0, *radius0, *center1, *radius1);
                super::gradient::evaluate(stops, extend.apply(raw_t))
            }
            Filter(matrix, child) => matrix.apply(child.evaluate(ctx)),
        }
    }
}

/// Which point a gradient (or `LinearBlend`) samples at, per its
/// `accuracy`: the clipped face's centroid, or the pixel center. Logs a
/// one-time warning and falls back to the centroid for the reserved
/// `SplitAccurate` variant.
pub(super) fn gradient_sample_point(ctx: &RenderEvaluationContext, accuracy: LinearBlendAccuracy) -> Vec2 {
    match accuracy {
        LinearBlendAccuracy::UnsplitPixelCenter => ctx.pixel_center,
        LinearBlendAccuracy::UnsplitCentroid => ctx.centroid.unwrap_or(ctx.point),
        LinearBlendAccuracy::SplitAccurate => {
            log::warn!("LinearGradientAccuracy::SplitAccurate is not implemented; falling back to UnsplitCentroid");
            ctx.centroid.unwrap_or(ctx.point)
        }
    }
}

/// Two-circle radial gradient parameter, degenerating to the classic
/// single-circle case when `center0 == center1` and `radius0 == 0`.
pub(super) fn radial_gradient_t(p: Vec2, c0: Vec2, r0: f32, c1: Vec2, r1: f32) -> f32 {
    let d = c1 - c0;
    let dr = r1 - r0;
    let pd = p - c0;
    let a = d.dot(d) - dr * dr;
    let b = pd.dot(d) + r0 * dr;
    let c = pd.dot(pd) - r0 * r0;
    if a.abs() < 1e-9 {
        if b.abs() < 1e-9 {
            return 0.0;
        }
        return c / (2.0 * b);
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return 0.0;
    }
    let sqrt_disc = disc.sqrt();
    let t1 = (b + sqrt_disc) / a;
    let t2 = (b - sqrt_disc) / a;
    t1.max(t2)
}

fn blend(mode: BlendMode, a: Vec4, b: Vec4) -> Vec4 {
    match mode {
        BlendMode::Normal => composite_over(a, b),
        BlendMode::Multiply => a.mul_componentwise(b),
        BlendMode::Screen => Vec4::ONE - (Vec4::ONE - a).mul_componentwise(Vec4::ONE - b),
        BlendMode::Darken => component_wise_min(a, b),
        BlendMode::Lighten => component_wise_max(a, b),
    }
}

fn component_wise_min(a: Vec4, b: Vec4) -> Vec4 {
    Vec4::rgba(a.r().min(b.r()), a.g().min(b.g()), a.b().min(b.b()), a.a().min(b.a()))
}

fn component_wise_max(a: Vec4, b: Vec4) -> Vec4 {
    Vec4::rgba(a.r().max(b.r()), a.g().max(b.g()), a.b().max(b.b()), a.a().max(b.a()))
}

/// Porter-Duff "source over destination" on premultiplied colors:
/// `src + dst * (1 - src.a)`.
fn composite_over(dst: Vec4, src: Vec4) -> Vec4 {
    src + dst * (1.0 - src.a())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(winding: &HashMap<u32, i32>) -> RenderEvaluationContext {
        RenderEvaluationContext {
            point: Vec2::ZERO,
            pixel_center: Vec2::ZERO,
            centroid: Some(Vec2::ZERO),
            winding_map: winding,
            image_sample: None,
            linear_t: 0.0,
        }
    }

    #[test]
    fn color_leaf_evaluates_to_itself() {
        let winding = HashMap::new();
        let p = RenderProgram::Color(Vec4::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(p.evaluate(&ctx(&winding)), Vec4::rgba(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn path_boolean_reads_winding_map() {
        let mut winding = HashMap::new();
        winding.insert(3u32, 1);
        let p = RenderProgram::PathBoolean(3);
        assert_eq!(p.evaluate(&ctx(&winding)), Vec4::ONE);
        let q = RenderProgram::PathBoolean(4);
        assert_eq!(q.evaluate(&ctx(&winding)), RenderProgram::TRANSPARENT);
    }

    #[test]
    fn stack_composites_back_to_front() {
        let winding = HashMap::new();
        let bottom = RenderProgram::Color(Vec4::rgba(1.0, 0.0, 0.0, 1.0));
        let top = RenderProgram::Color(Vec4::rgba(0.0, 1.0, 0.0, 0.5));
        let p = RenderProgram::Stack(vec![bottom, top]);
        let result = p.evaluate(&ctx(&winding));
        // top (premultiplied, a=0.5) over bottom (opaque red): 0.5 green + 0.5 * opaque red.
        assert!((result.r() - 0.5).abs() < 1e-6);
        assert!((result.g() - 0.5).abs() < 1e-6);
        assert!((result.a() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn blend_multiply_matches_componentwise_product() {
        let winding = HashMap::new();
        let a = RenderProgram::Color(Vec4::rgba(0.5, 0.5, 0.5, 1.0));
        let b = RenderProgram::Color(Vec4::rgba(0.4, 0.4, 0.4, 1.0));
        let p = RenderProgram::Blend(BlendMode::Multiply, Box::new(a), Box::new(b));
        let result = p.evaluate(&ctx(&winding));
        assert!((result.r() - 0.2).abs() < 1e-6);
    }
}
