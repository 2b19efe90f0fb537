//! The render-program algebra: a tree IR of shading operators, bottom-up
//! simplification, tree-walking evaluation, and postfix instruction
//! compilation.

pub mod color;
pub mod eval;
pub mod gradient;
pub mod instructions;
pub mod program;
pub mod simplify;

pub use color::ColorSpaceConversion;
pub use eval::RenderEvaluationContext;
pub use gradient::{ExtendMode, GradientStop, RadialGradientKind};
pub use instructions::{write_instructions, Instruction};
pub use program::{Affine2, BlendMode, ColorMatrix, ImageSampler, LinearBlendAccuracy, RenderProgram, StructuralFlags};
pub use simplify::{convert_color_space, simplify, ColorSpaceChain};
