//! Shared numeric types used throughout the crate.
//!
//! [`vec2`] and [`vec4`] are ordinary floating-point vectors used in pixel
//! space and for premultiplied colors; [`rational`] is the exact-arithmetic
//! layer the CAG engine builds its arrangement on.

pub mod rational;
pub mod vec2;
pub mod vec4;

pub use rational::{Rat, RationalPoint, RationalVector};
pub use vec2::Vec2;
pub use vec4::Vec4;
