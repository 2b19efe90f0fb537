//! Bottom-up algebraic simplification of a render-program tree.
//!
//! `simplify` recurses into children first (so a parent only ever sees
//! already-simplified children), then applies `get_simplified`'s local
//! rewrite rules. A simplified tree evaluates identically to its input —
//! this is the soundness contract the property tests in
//! `render::eval` exercise.

use crate::math::vec4::Vec4;

use super::color::ColorSpaceConversion;
use super::program::RenderProgram;

/// Recursively simplify `program`, returning a new (possibly identical)
/// tree.
pub fn simplify(program: &RenderProgram) -> RenderProgram {
    let children: Vec<RenderProgram> = program.children().into_iter().map(simplify).collect();
    let rebuilt = program
        .with_children(children)
        .expect("children rebuilt from program.children() always match arity");
    get_simplified(&rebuilt).unwrap_or(rebuilt)
}

/// Local, single-node rewrite rules. Returns `None` meaning "unchanged";
/// callers should keep the input node when this returns `None`. Assumes
/// `program`'s children are already simplified.
fn get_simplified(program: &RenderProgram) -> Option<RenderProgram> {
    use RenderProgram::*;
    match program {
        Alpha(child, a) => {
            if *a == 0.0 {
                Some(RenderProgram::transparent())
            } else if *a == 1.0 {
                Some((**child).clone())
            } else if let Alpha(inner, a2) = child.as_ref() {
                // Alpha(Alpha(x, a2), a) -> Alpha(x, a * a2).
                Some(Alpha(inner.clone(), a * a2))
            } else {
                None
            }
        }
        Premultiply(child) => {
            if let Unpremultiply(inner) = child.as_ref() {
                Some((**inner).clone())
            } else {
                None
            }
        }
        Unpremultiply(child) => {
            if let Premultiply(inner) = child.as_ref() {
                Some((**inner).clone())
            } else {
                None
            }
        }
        ColorSpace(conversion, child) => {
            if let ColorSpace(inner_conversion, inner) = child.as_ref() {
                if *inner_conversion == conversion.inverse() {
                    return Some((**inner).clone());
                }
            }
            None
        }
        Filter(matrix, child) => {
            if matrix.is_identity() {
                Some((**child).clone())
            } else {
                None
            }
        }
        Blend(mode, a, b) => {
            use super::program::BlendMode;
            if *mode == BlendMode::Normal {
                if let Color(c) = b.as_ref() {
                    if c.a() == 0.0 {
                        return Some((**a).clone());
                    }
                }
            }
            None
        }
        Stack(children) => {
            if children.is_empty() {
                return Some(RenderProgram::transparent());
            }
            if children.len() == 1 {
                return Some(children[0].clone());
            }
            // Drop a fully-transparent prefix; it contributes nothing
            // under painter's-algorithm compositing.
            let flags: Vec<_> = children.iter().map(|c| c.structural_flags(&child_flags_of(c))).collect();
            let first_visible = flags.iter().position(|f| !f.fully_transparent).unwrap_or(children.len() - 1);
            // Truncate everything before (and including) the last fully-opaque
            // element, since it fully occludes what came before it.
            let last_opaque = flags.iter().rposition(|f| f.fully_opaque).unwrap_or(0).max(first_visible);
            let kept: Vec<RenderProgram> = children[last_opaque..].to_vec();
            if kept.len() == children.len() {
                None
            } else if kept.len() == 1 {
                Some(kept.into_iter().next().unwrap())
            } else {
                Some(Stack(kept))
            }
        }
        _ => None,
    }
}

/// Recompute a node's own child structural-flags list (its children are
/// already simplified, but flags are not cached on the node itself in
/// this crate's representation — recomputing from leaves is cheap given
/// the tree sizes render programs reach in practice).
fn child_flags_of(node: &RenderProgram) -> Vec<super::program::StructuralFlags> {
    node.children().into_iter().map(|c| c.structural_flags(&child_flags_of(c))).collect()
}

/// Build the minimal chain of `Unpremultiply -> conversion(s) ->
/// Premultiply` nodes converting `program`'s output from color space `from`
/// to `to`, then re-simplifies. When `from == to` this degenerates to
/// `program.simplified()` (the identity conversion chain collapses
/// entirely under `get_simplified`'s `ColorSpace` inverse-cancellation and
/// `Premultiply(Unpremultiply(x))` rules).
pub fn convert_color_space(program: &RenderProgram, from: ColorSpaceChain, to: ColorSpaceChain) -> RenderProgram {
    let mut node = program.clone();
    let steps = from.conversion_path_to(to);
    if !steps.is_empty() {
        node = RenderProgram::Unpremultiply(Box::new(node));
        for step in steps {
            node = RenderProgram::ColorSpace(step, Box::new(node));
        }
        node = RenderProgram::Premultiply(Box::new(node));
    }
    simplify(&node)
}

/// The color spaces a conversion chain can name as an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpaceChain {
    Srgb,
    LinearSrgb,
    Oklab,
    LinearDisplayP3,
}

impl ColorSpaceChain {
    /// The sequence of `ColorSpaceConversion` steps from `self` to `to`,
    /// always routed through linear-sRGB (the accumulation space), empty
    /// when `self == to`.
    fn conversion_path_to(self, to: ColorSpaceChain) -> Vec<ColorSpaceConversion> {
        use ColorSpaceChain::*;
        use ColorSpaceConversion as C;
        if self == to {
            return Vec::new();
        }
        let to_linear: Vec<C> = match self {
            Srgb => vec![C::SrgbToLinearSrgb],
            LinearSrgb => vec![],
            Oklab => vec![C::OklabToLinearSrgb],
            LinearDisplayP3 => vec![C::LinearDisplayP3ToLinearSrgb],
        };
        let from_linear: Vec<C> = match to {
            Srgb => vec![C::LinearSrgbToSrgb],
            LinearSrgb => vec![],
            Oklab => vec![C::LinearSrgbToOklab],
            LinearDisplayP3 => vec![C::LinearSrgbToLinearDisplayP3],
        };
        to_linear.into_iter().chain(from_linear).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::program::ColorMatrix;

    #[test]
    fn alpha_zero_collapses_to_transparent() {
        let p = RenderProgram::Alpha(Box::new(RenderProgram::Color(Vec4::rgba(1.0, 0.0, 0.0, 1.0))), 0.0);
        assert_eq!(simplify(&p), RenderProgram::transparent());
    }

    #[test]
    fn stack_of_empty_collapses_to_transparent() {
        let p = RenderProgram::Stack(Vec::new());
        assert_eq!(simplify(&p), RenderProgram::transparent());
    }

    #[test]
    fn stack_of_one_collapses_to_child() {
        let c = RenderProgram::Color(Vec4::rgba(0.0, 1.0, 0.0, 1.0));
        let p = RenderProgram::Stack(vec![c.clone()]);
        assert_eq!(simplify(&p), c);
    }

    #[test]
    fn stack_drops_occluded_prefix_behind_opaque_layer() {
        let behind = RenderProgram::Color(Vec4::rgba(1.0, 0.0, 0.0, 1.0));
        let opaque = RenderProgram::Color(Vec4::rgba(0.0, 1.0, 0.0, 1.0));
        let p = RenderProgram::Stack(vec![behind, opaque.clone()]);
        assert_eq!(simplify(&p), opaque);
    }

    #[test]
    fn filter_identity_simplifies_to_child() {
        let child = RenderProgram::Color(Vec4::rgba(0.2, 0.5, 0.9, 1.0));
        let p = RenderProgram::Filter(ColorMatrix::IDENTITY, Box::new(child.clone()));
        assert_eq!(simplify(&p), child);
    }

    #[test]
    fn convert_color_space_identity_equals_plain_simplify() {
        let p = RenderProgram::Color(Vec4::rgba(0.2, 0.5, 0.9, 1.0));
        let converted = convert_color_space(&p, ColorSpaceChain::Srgb, ColorSpaceChain::Srgb);
        assert_eq!(converted, simplify(&p));
    }
}
