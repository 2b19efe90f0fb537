//! Postfix instruction compilation and a fixed-capacity stack evaluator.
//!
//! `write_instructions` emits children before their parent's own opcode,
//! exactly mirroring the recursive tree evaluator's traversal order, so
//! that stack evaluation is bit-identical to `RenderProgram::evaluate`.

use crate::error::ProgramError;
use crate::math::vec4::Vec4;

use super::color::{premultiply, unpremultiply};
use super::eval::RenderEvaluationContext;
use super::program::{Affine2, BlendMode, ColorMatrix, ImageSampler, LinearBlendAccuracy, RenderProgram};

/// One instruction in the compiled postfix stream. Immediate operands are
/// stored inline rather than in a side table — these programs are small
/// enough that this costs nothing and keeps the evaluator a single linear
/// scan.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    PushColor(Vec4),
    PushPathBoolean(u32),
    Alpha(f32),
    Premultiply,
    Unpremultiply,
    ColorSpace(super::color::ColorSpaceConversion),
    PushDebugTransparent,
    Image { sampler: ImageSampler, transform: Affine2 },
    Blend(BlendMode),
    /// Composite `count` stack-top colors back-to-front (painter's
    /// algorithm), replacing them with a single result.
    Stack(usize),
    LinearBlend(LinearBlendAccuracy),
    LinearGradient(Box<LinearGradientInstruction>),
    RadialGradient(Box<RadialGradientInstruction>),
    Filter(ColorMatrix),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradientInstruction {
    pub accuracy: LinearBlendAccuracy,
    pub extend: super::gradient::ExtendMode,
    pub line: (crate::math::vec2::Vec2, crate::math::vec2::Vec2),
    pub stops: Vec<super::gradient::GradientStop>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradientInstruction {
    pub kind: super::gradient::RadialGradientKind,
    pub accuracy: LinearBlendAccuracy,
    pub extend: super::gradient::ExtendMode,
    pub center0: crate::math::vec2::Vec2,
    pub radius0: f32,
    pub center1: crate::math::vec2::Vec2,
    pub radius1: f32,
    pub stops: Vec<super::gradient::GradientStop>,
}

/// Compile `program` into a postfix instruction stream.
pub fn write_instructions(program: &RenderProgram, out: &mut Vec<Instruction>) {
    use RenderProgram::*;
    match program {
        Color(c) => out.push(Instruction::PushColor(*c)),
        PathBoolean(id) => out.push(Instruction::PushPathBoolean(*id)),
        Alpha(child, a) => {
            write_instructions(child, out);
            out.push(Instruction::Alpha(*a));
        }
        Premultiply(child) => {
            write_instructions(child, out);
            out.push(Instruction::Premultiply);
        }
        Unpremultiply(child) => {
            write_instructions(child, out);
            out.push(Instruction::Unpremultiply);
        }
        ColorSpace(conversion, child) => {
            write_instructions(child, out);
            out.push(Instruction::ColorSpace(*conversion));
        }
        NormalDebug | BarycentricDebug | Depth => out.push(Instruction::PushDebugTransparent),
        Image { sampler, transform, .. } => out.push(Instruction::Image { sampler: *sampler, transform: *transform }),
        Blend(mode, a, b) => {
            write_instructions(a, out);
            write_instructions(b, out);
            out.push(Instruction::Blend(*mode));
        }
        Stack(children) => {
            for child in children {
                write_instructions(child, out);
            }
            out.push(Instruction::Stack(children.len()));
        }
        LinearBlend { accuracy, zero, one } => {
            write_instructions(zero, out);
            write_instructions(one, out);
            out.push(Instruction::LinearBlend(*accuracy));
        }
        LinearGradient { accuracy, extend, line, stops } => {
            out.push(Instruction::LinearGradient(Box::new(LinearGradientInstruction {
                accuracy: *accuracy,
                extend: *extend,
                line: *line,
                stops: stops.clone(),
            })));
        }
        RadialGradient { kind, accuracy, extend, center0, radius0, center1, radius1, stops } => {
            out.push(Instruction::RadialGradient(Box::new(RadialGradientInstruction {
                kind: *kind,
                accuracy: *accuracy,
                extend: *extend,
                center0: *center0,
                radius0: *radius0,
                center1: *center1,
                radius1: *radius1,
                stops: stops.clone(),
            })));
        }
        Filter(matrix, child) => {
            write_instructions(child, out);
            out.push(Instruction::Filter(*matrix));
        }
    }
}

/// A fixed-capacity stack of colors backing instruction evaluation.
/// `evaluate` returns `ProgramError::StackOverflow` rather than growing
/// unboundedly — a well-formed compiled program never exceeds a small,
/// predictable depth (the tree's height), so overflow indicates a bug in
/// the instruction stream, not a legitimate large input.
pub struct InstructionStack {
    values: Vec<Vec4>,
    capacity: usize,
}

impl InstructionStack {
    pub fn new(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity), capacity }
    }

    fn push(&mut self, v: Vec4) -> Result<(), ProgramError> {
        if self.values.len() >= self.capacity {
            return Err(ProgramError::StackOverflow { capacity: self.capacity });
        }
        self.values.push(v);
        Ok(())
    }

    fn pop(&mut self) -> Result<Vec4, ProgramError> {
        self.values.pop().ok_or(ProgramError::ArityMismatch { op: "pop", expected: 1, actual: 0 })
    }
}

/// Evaluate a compiled instruction stream against `ctx`, returning the
/// single resulting color. Bit-identical to `RenderProgram::evaluate` on
/// the same (uncompiled) tree.
pub fn evaluate_instructions(
    instructions: &[Instruction],
    ctx: &RenderEvaluationContext,
    stack_capacity: usize,
) -> Result<Vec4, ProgramError> {
    let mut stack = InstructionStack::new(stack_capacity);
    for instruction in instructions {
        match instruction {
            Instruction::PushColor(c) => stack.push(*c)?,
            Instruction::PushPathBoolean(id) => {
                let v = if ctx.winding_map.get(id).copied().unwrap_or(0) != 0 { Vec4::ONE } else { Vec4::ZERO };
                stack.push(v)?;
            }
            Instruction::Alpha(a) => {
                let c = stack.pop()?;
                stack.push(c * *a)?;
            }
            Instruction::Premultiply => {
                let c = stack.pop()?;
                stack.push(premultiply(c))?;
            }
            Instruction::Unpremultiply => {
                let c = stack.pop()?;
                stack.push(unpremultiply(c))?;
            }
            Instruction::ColorSpace(conversion) => {
                let c = stack.pop()?;
                stack.push(conversion.apply(c))?;
            }
            Instruction::PushDebugTransparent => stack.push(Vec4::ZERO)?,
            Instruction::Image { sampler, transform } => {
                let p = transform.apply(ctx.point);
                let sample = ctx.image_sample.map(|f| f(sampler.0, p)).unwrap_or(Vec4::ZERO);
                stack.push(sample)?;
            }
            Instruction::Blend(mode) => {
                let b = stack.pop()?;
                let a = stack.pop()?;
                stack.push(blend_instruction(*mode, a, b))?;
            }
            Instruction::Stack(count) => {
                let mut layers = Vec::with_capacity(*count);
                for _ in 0..*count {
                    layers.push(stack.pop()?);
                }
                layers.reverse();
                let result = layers.into_iter().fold(Vec4::ZERO, composite_over_instruction);
                stack.push(result)?;
            }
            Instruction::LinearBlend(accuracy) => {
                let one = stack.pop()?;
                let zero = stack.pop()?;
                if *accuracy == LinearBlendAccuracy::SplitAccurate {
                    log::warn!("LinearBlendAccuracy::SplitAccurate is not implemented; falling back to UnsplitCentroid");
                }
                let t = ctx.linear_t.clamp(0.0, 1.0);
                stack.push(zero.lerp(one, t))?;
            }
            Instruction::LinearGradient(g) => {
                let sample = super::eval::gradient_sample_point(ctx, g.accuracy);
                let (p0, p1) = g.line;
                let d = p1 - p0;
                let len_sq = d.dot(d);
                let raw_t = if len_sq > 0.0 { (sample - p0).dot(d) / len_sq } else { 0.0 };
                stack.push(super::gradient::evaluate(&g.stops, g.extend.apply(raw_t)))?;
            }
            Instruction::RadialGradient(g) => {
                let sample = super::eval::gradient_sample_point(ctx, g.accuracy);
                let raw_t = super::eval::radial_gradient_t(sample, g.center0, g.radius0, g.center1, g.radius1);
                stack.push(super::gradient::evaluate(&g.stops, g.extend.apply(raw_t)))?;
            }
            Instruction::Filter(matrix) => {
                let c = stack.pop()?;
                stack.push(matrix.apply(c))?;
            }
        }
    }
    stack.pop()
}

fn blend_instruction(mode: BlendMode, a: Vec4, b: Vec4) -> Vec4 {
    match mode {
        BlendMode::Normal => composite_over_instruction(a, b),
        BlendMode::Multiply => a.mul_componentwise(b),
        BlendMode::Screen => Vec4::ONE - (Vec4::ONE - a).mul_componentwise(Vec4::ONE - b),
        BlendMode::Darken => Vec4::rgba(a.r().min(b.r()), a.g().min(b.g()), a.b().min(b.b()), a.a().min(b.a())),
        BlendMode::Lighten => Vec4::rgba(a.r().max(b.r()), a.g().max(b.g()), a.b().max(b.b()), a.a().max(b.a())),
    }
}

fn composite_over_instruction(dst: Vec4, src: Vec4) -> Vec4 {
    src + dst * (1.0 - src.a())
}
