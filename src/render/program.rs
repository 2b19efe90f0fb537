//! The render-program tree IR: a tagged-variant sum type over shading
//! operators, each node immutable once constructed.

use crate::error::ProgramError;
use crate::math::vec2::Vec2;
use crate::math::vec4::Vec4;

use super::color::ColorSpaceConversion;
use super::gradient::{ExtendMode, GradientStop, RadialGradientKind};

/// Which sample point an "Unsplit" accuracy variant evaluates the gradient
/// parameter at. The "Split" family (sub-dividing a face along gradient
/// iso-lines before evaluation) is a reserved variant: see
/// `RadialGradientAccuracy`/`LinearGradientAccuracy`/`LinearBlendAccuracy`
/// doc comments and `DESIGN.md` for why it currently falls back to
/// `UnsplitCentroid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearBlendAccuracy {
    UnsplitCentroid,
    UnsplitPixelCenter,
    /// Reserved; evaluation falls back to `UnsplitCentroid` with a
    /// one-time `log::warn!`.
    SplitAccurate,
}

pub type LinearGradientAccuracy = LinearBlendAccuracy;
pub type RadialGradientAccuracy = LinearBlendAccuracy;

/// The small subset of compositing modes this crate implements; a full
/// CSS/Porter-Duff blend-mode table is out of scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

/// A 2D affine transform, row-major `[a, b, c, d, e, f]` mapping
/// `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine2 {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }
}

/// A 4x5 color matrix (4 output channels, 4 input channels + a constant
/// column), applied to a straight-alpha color. The identity matrix leaves
/// a color unchanged and simplifies its `Filter` node away entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [[f32; 5]; 4]);

impl ColorMatrix {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, c: Vec4) -> Vec4 {
        let input = [c.r(), c.g(), c.b(), c.a(), 1.0];
        let mut out = [0.0_f32; 4];
        for (row, slot) in self.0.iter().zip(out.iter_mut()) {
            *slot = row.iter().zip(input.iter()).map(|(m, x)| m * x).sum();
        }
        Vec4::rgba(out[0], out[1], out[2], out[3])
    }
}

/// An image sampler handle; this crate does not implement image decoding
/// or resampling (resource loading is out of scope) — `Image` nodes read
/// from whatever `RenderEvaluationContext::image_sample` the host supplies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSampler(pub u32);

/// A node in the shading-operator tree. Children are owned (`Box`), so the
/// tree is a strict DAG-free tree; simplification may still produce
/// identity-equal shared subtrees by returning `Rc`-free clones of
/// structurally identical nodes (cheap here since nodes are small).
#[derive(Clone, Debug, PartialEq)]
pub enum RenderProgram {
    Color(Vec4),
    /// References an input path by id; evaluates to `Vec4::ONE` (a white
    /// mask) wherever that path's winding is non-zero in the evaluation
    /// context, `TRANSPARENT` elsewhere. Used to build masks out of the
    /// CAG engine's winding maps without a separate boolean-mask node.
    PathBoolean(u32),

    Alpha(Box<RenderProgram>, f32),
    Premultiply(Box<RenderProgram>),
    Unpremultiply(Box<RenderProgram>),
    ColorSpace(ColorSpaceConversion, Box<RenderProgram>),
    NormalDebug,
    BarycentricDebug,
    Depth,
    Image { sampler: ImageSampler, extend: ExtendMode, transform: Affine2 },

    Blend(BlendMode, Box<RenderProgram>, Box<RenderProgram>),
    Stack(Vec<RenderProgram>),
    LinearBlend { accuracy: LinearBlendAccuracy, zero: Box<RenderProgram>, one: Box<RenderProgram> },
    LinearGradient { accuracy: LinearGradientAccuracy, extend: ExtendMode, line: (Vec2, Vec2), stops: Vec<GradientStop> },
    RadialGradient {
        kind: RadialGradientKind,
        accuracy: RadialGradientAccuracy,
        extend: ExtendMode,
        center0: Vec2,
        radius0: f32,
        center1: Vec2,
        radius1: f32,
        stops: Vec<GradientStop>,
    },
    Filter(ColorMatrix, Box<RenderProgram>),
}

/// The fully-transparent / fully-opaque structural flags computed
/// bottom-up for a node, used for early-pruning simplifications.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StructuralFlags {
    pub fully_transparent: bool,
    pub fully_opaque: bool,
}

impl RenderProgram {
    /// Constant-color fully-transparent leaf.
    pub const TRANSPARENT: Vec4 = Vec4::ZERO;

    pub fn transparent() -> Self {
        RenderProgram::Color(Self::TRANSPARENT)
    }

    pub fn children(&self) -> Vec<&RenderProgram> {
        use RenderProgram::*;
        match self {
            Color(_) | PathBoolean(_) | NormalDebug | BarycentricDebug | Depth | Image { .. } => Vec::new(),
            Alpha(c, _) | Premultiply(c) | Unpremultiply(c) | ColorSpace(_, c) | Filter(_, c) => vec![c.as_ref()],
            Blend(_, a, b) => vec![a.as_ref(), b.as_ref()],
            Stack(children) => children.iter().collect(),
            LinearBlend { zero, one, .. } => vec![zero.as_ref(), one.as_ref()],
            LinearGradient { .. } | RadialGradient { .. } => Vec::new(),
        }
    }

    /// This node's variant name, for `ArityMismatch` error messages.
    fn op_name(&self) -> &'static str {
        use RenderProgram::*;
        match self {
            Color(_) => "Color",
            PathBoolean(_) => "PathBoolean",
            Alpha(..) => "Alpha",
            Premultiply(_) => "Premultiply",
            Unpremultiply(_) => "Unpremultiply",
            ColorSpace(..) => "ColorSpace",
            NormalDebug => "NormalDebug",
            BarycentricDebug => "BarycentricDebug",
            Depth => "Depth",
            Image { .. } => "Image",
            Blend(..) => "Blend",
            Stack(_) => "Stack",
            LinearBlend { .. } => "LinearBlend",
            LinearGradient { .. } => "LinearGradient",
            RadialGradient { .. } => "RadialGradient",
            Filter(..) => "Filter",
        }
    }

    /// Replace this node's children, returning `self` unchanged (by value
    /// equality) when `new` is identical to the current child list — the
    /// immutability contract's `withChildren`. `new` must have exactly as
    /// many elements as [`RenderProgram::children`] returns for this node;
    /// a caller-supplied child vector of the wrong length is an
    /// [`ProgramError::ArityMismatch`], not a panic.
    pub fn with_children(&self, new: Vec<RenderProgram>) -> Result<RenderProgram, ProgramError> {
        use RenderProgram::*;
        let expected = self.children().len();
        if new.len() != expected {
            return Err(ProgramError::ArityMismatch { op: self.op_name(), expected, actual: new.len() });
        }
        let same = new.iter().zip(self.children()).all(|(a, b)| a == b);
        if same {
            return Ok(self.clone());
        }
        const ARITY_CHECKED: &str = "length matched `expected` above";
        Ok(match self {
            Alpha(_, a) => Alpha(Box::new(new.into_iter().next().expect(ARITY_CHECKED)), *a),
            Premultiply(_) => Premultiply(Box::new(new.into_iter().next().expect(ARITY_CHECKED))),
            Unpremultiply(_) => Unpremultiply(Box::new(new.into_iter().next().expect(ARITY_CHECKED))),
            ColorSpace(k, _) => ColorSpace(*k, Box::new(new.into_iter().next().expect(ARITY_CHECKED))),
            Filter(m, _) => Filter(*m, Box::new(new.into_iter().next().expect(ARITY_CHECKED))),
            Blend(mode, _, _) => {
                let mut it = new.into_iter();
                let a = it.next().expect(ARITY_CHECKED);
                let b = it.next().expect(ARITY_CHECKED);
                Blend(*mode, Box::new(a), Box::new(b))
            }
            Stack(_) => Stack(new),
            LinearBlend { accuracy, .. } => {
                let mut it = new.into_iter();
                let zero = it.next().expect(ARITY_CHECKED);
                let one = it.next().expect(ARITY_CHECKED);
                LinearBlend { accuracy: *accuracy, zero: Box::new(zero), one: Box::new(one) }
            }
            other => other.clone(),
        })
    }

    /// Bottom-up structural flags, computed from this node's own kind and
    /// its (already-computed) children's flags.
    pub fn structural_flags(&self, child_flags: &[StructuralFlags]) -> StructuralFlags {
        use RenderProgram::*;
        match self {
            Color(c) => StructuralFlags { fully_transparent: c.a() == 0.0, fully_opaque: c.a() == 1.0 },
            PathBoolean(_) | NormalDebug | BarycentricDebug | Depth | Image { .. } => StructuralFlags::default(),
            Alpha(_, a) => {
                if *a == 0.0 {
                    StructuralFlags { fully_transparent: true, fully_opaque: false }
                } else {
                    let child = child_flags[0];
                    StructuralFlags { fully_transparent: child.fully_transparent, fully_opaque: child.fully_opaque && *a == 1.0 }
                }
            }
            Premultiply(_) | Unpremultiply(_) | ColorSpace(_, _) | Filter(_, _) => child_flags[0],
            Blend(_, _, _) => StructuralFlags::default(),
            Stack(children) => {
                if children.is_empty() {
                    return StructuralFlags { fully_transparent: true, fully_opaque: false };
                }
                let fully_transparent = child_flags.iter().all(|f| f.fully_transparent);
                let fully_opaque = child_flags.last().map(|f| f.fully_opaque).unwrap_or(false);
                StructuralFlags { fully_transparent, fully_opaque }
            }
            LinearBlend { .. } => StructuralFlags::default(),
            LinearGradient { .. } | RadialGradient { .. } => StructuralFlags::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_children_replaces_a_single_child() {
        let p = RenderProgram::Alpha(Box::new(RenderProgram::Color(Vec4::ONE)), 0.5);
        let replaced = p.with_children(vec![RenderProgram::Color(Vec4::ZERO)]).unwrap();
        assert_eq!(replaced, RenderProgram::Alpha(Box::new(RenderProgram::Color(Vec4::ZERO)), 0.5));
    }

    #[test]
    fn with_children_returns_the_same_node_when_children_are_unchanged() {
        let child = RenderProgram::Color(Vec4::ONE);
        let p = RenderProgram::Alpha(Box::new(child.clone()), 0.5);
        let replaced = p.with_children(vec![child]).unwrap();
        assert_eq!(replaced, p);
    }

    #[test]
    fn with_children_rejects_a_child_count_mismatch() {
        let p = RenderProgram::Alpha(Box::new(RenderProgram::Color(Vec4::ONE)), 0.5);
        let err = p.with_children(Vec::new()).unwrap_err();
        match err {
            ProgramError::ArityMismatch { op, expected, actual } => {
                assert_eq!(op, "Alpha");
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            other => panic!("expected ArityMismatch, got {other:?}"),
        }
    }

    #[test]
    fn with_children_rejects_too_many_children_for_a_leaf() {
        let p = RenderProgram::Color(Vec4::ONE);
        assert!(p.with_children(vec![RenderProgram::Color(Vec4::ZERO)]).is_err());
    }
}
