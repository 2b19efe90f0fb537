//! Color-space conversions and premultiplied/straight-alpha composition.
//!
//! All conversions operate on straight (non-premultiplied) RGB; callers
//! compose `Premultiply`/`Unpremultiply` around a conversion node rather
//! than conversions knowing about alpha handling themselves, matching
//! the algebraic-composition design this crate's simplifier relies on.

use crate::math::vec4::Vec4;

/// Which of the pairwise color-space conversions a `ColorSpace` node
/// performs. Each has a well-defined inverse, used to detect
/// `ColorSpace(inverse(k), ColorSpace(k, x))` cancellation during
/// simplification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpaceConversion {
    SrgbToLinearSrgb,
    LinearSrgbToSrgb,
    LinearSrgbToOklab,
    OklabToLinearSrgb,
    LinearSrgbToLinearDisplayP3,
    LinearDisplayP3ToLinearSrgb,
}

impl ColorSpaceConversion {
    pub fn inverse(self) -> Self {
        use ColorSpaceConversion::*;
        match self {
            SrgbToLinearSrgb => LinearSrgbToSrgb,
            LinearSrgbToSrgb => SrgbToLinearSrgb,
            LinearSrgbToOklab => OklabToLinearSrgb,
            OklabToLinearSrgb => LinearSrgbToOklab,
            LinearSrgbToLinearDisplayP3 => LinearDisplayP3ToLinearSrgb,
            LinearDisplayP3ToLinearSrgb => LinearSrgbToLinearDisplayP3,
        }
    }

    /// Apply this conversion to a straight-alpha RGBA color; alpha passes
    /// through unchanged.
    pub fn apply(self, c: Vec4) -> Vec4 {
        use ColorSpaceConversion::*;
        let rgb = match self {
            SrgbToLinearSrgb => srgb_to_linear(c.rgb()),
            LinearSrgbToSrgb => linear_to_srgb(c.rgb()),
            LinearSrgbToOklab => linear_srgb_to_oklab(c.rgb()),
            OklabToLinearSrgb => oklab_to_linear_srgb(c.rgb()),
            LinearSrgbToLinearDisplayP3 => linear_srgb_to_linear_p3(c.rgb()),
            LinearDisplayP3ToLinearSrgb => linear_p3_to_linear_srgb(c.rgb()),
        };
        Vec4::rgba(rgb[0], rgb[1], rgb[2], c.a())
    }
}

fn srgb_channel_to_linear(u: f32) -> f32 {
    if u <= 0.04045 {
        u / 12.92
    } else {
        ((u + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_channel_to_srgb(u: f32) -> f32 {
    if u <= 0.0031308 {
        u * 12.92
    } else {
        1.055 * u.powf(1.0 / 2.4) - 0.055
    }
}

pub fn srgb_to_linear(rgb: [f32; 3]) -> [f32; 3] {
    [srgb_channel_to_linear(rgb[0]), srgb_channel_to_linear(rgb[1]), srgb_channel_to_linear(rgb[2])]
}

pub fn linear_to_srgb(rgb: [f32; 3]) -> [f32; 3] {
    [linear_channel_to_srgb(rgb[0]), linear_channel_to_srgb(rgb[1]), linear_channel_to_srgb(rgb[2])]
}

/// Linear sRGB -> Oklab, via the standard LMS intermediate (Björn Ottosson's
/// matrices).
pub fn linear_srgb_to_oklab(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    let l = 0.4122214708 * r + 0.5363325363 * g + 0.0514459929 * b;
    let m = 0.2119034982 * r + 0.6806995451 * g + 0.1073969566 * b;
    let s = 0.0883024619 * r + 0.2817188376 * g + 0.6299787005 * b;

    let l_ = l.cbrt();
    let m_ = m.cbrt();
    let s_ = s.cbrt();

    [
        0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
        1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
        0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
    ]
}

pub fn oklab_to_linear_srgb(lab: [f32; 3]) -> [f32; 3] {
    let [l, a, b] = lab;
    let l_ = l + 0.3963377774 * a + 0.2158037573 * b;
    let m_ = l - 0.1055613458 * a - 0.0638541728 * b;
    let s_ = l - 0.0894841775 * a - 1.2914855480 * b;

    let l3 = l_ * l_ * l_;
    let m3 = m_ * m_ * m_;
    let s3 = s_ * s_ * s_;

    [
        4.0767416621 * l3 - 3.3077115913 * m3 + 0.2309699292 * s3,
        -1.2684380046 * l3 + 2.6097574011 * m3 - 0.3413193965 * s3,
        -0.0041960863 * l3 - 0.7034186147 * m3 + 1.7076147010 * s3,
    ]
}

/// Linear sRGB -> linear Display-P3, via the CIE XYZ intermediate (D65
/// white point shared by both primaries' matrices).
pub fn linear_srgb_to_linear_p3(rgb: [f32; 3]) -> [f32; 3] {
    const SRGB_TO_XYZ: [[f32; 3]; 3] = [
        [0.4124564, 0.3575761, 0.1804375],
        [0.2126729, 0.7151522, 0.0721750],
        [0.0193339, 0.1191920, 0.9503041],
    ];
    const XYZ_TO_P3: [[f32; 3]; 3] = [
        [2.4934969, -0.9313836, -0.4027108],
        [-0.8294890, 1.7626641, 0.0236247],
        [0.0358458, -0.0761724, 0.9568845],
    ];
    mat3_mul(&XYZ_TO_P3, mat3_mul(&SRGB_TO_XYZ, rgb))
}

pub fn linear_p3_to_linear_srgb(rgb: [f32; 3]) -> [f32; 3] {
    const P3_TO_XYZ: [[f32; 3]; 3] = [
        [0.4865709, 0.2656677, 0.1982173],
        [0.2289746, 0.6917385, 0.0792869],
        [0.0000000, 0.0451134, 1.0439444],
    ];
    const XYZ_TO_SRGB: [[f32; 3]; 3] = [
        [3.2404542, -1.5371385, -0.4985314],
        [-0.9692660, 1.8760108, 0.0415560],
        [0.0556434, -0.2040259, 1.0572252],
    ];
    mat3_mul(&XYZ_TO_SRGB, mat3_mul(&P3_TO_XYZ, rgb))
}

fn mat3_mul(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Divide RGB by alpha (straight alpha from premultiplied); writes
/// transparent black when alpha is exactly zero, matching the stack
/// evaluator's `Unpremultiply` instruction.
pub fn unpremultiply(c: Vec4) -> Vec4 {
    if c.a() == 0.0 {
        Vec4::ZERO
    } else {
        Vec4::rgba(c.r() / c.a(), c.g() / c.a(), c.b() / c.a(), c.a())
    }
}

/// Multiply RGB by alpha (premultiplied from straight).
pub fn premultiply(c: Vec4) -> Vec4 {
    Vec4::rgba(c.r() * c.a(), c.g() * c.a(), c.b() * c.a(), c.a())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn srgb_linear_round_trip() {
        let rgb = [0.2_f32, 0.5, 0.9];
        let round = linear_to_srgb(srgb_to_linear(rgb));
        assert_relative_eq!(round[0], rgb[0], epsilon = 1e-5);
        assert_relative_eq!(round[1], rgb[1], epsilon = 1e-5);
        assert_relative_eq!(round[2], rgb[2], epsilon = 1e-5);
    }

    #[test]
    fn oklab_round_trip_within_tolerance() {
        let rgb = [0.2_f32, 0.5, 0.9];
        let round = oklab_to_linear_srgb(linear_srgb_to_oklab(rgb));
        assert_relative_eq!(round[0], rgb[0], epsilon = 1e-5);
        assert_relative_eq!(round[1], rgb[1], epsilon = 1e-5);
        assert_relative_eq!(round[2], rgb[2], epsilon = 1e-5);
    }

    #[test]
    fn display_p3_round_trip_within_tolerance() {
        let rgb = [0.2_f32, 0.5, 0.9];
        let round = linear_p3_to_linear_srgb(linear_srgb_to_linear_p3(rgb));
        assert_relative_eq!(round[0], rgb[0], epsilon = 1e-4);
        assert_relative_eq!(round[1], rgb[1], epsilon = 1e-4);
        assert_relative_eq!(round[2], rgb[2], epsilon = 1e-4);
    }

    #[test]
    fn premultiply_unpremultiply_round_trip() {
        let c = Vec4::rgba(0.8, 0.4, 0.2, 0.5);
        let round = unpremultiply(premultiply(c));
        assert_relative_eq!(round.r(), c.r(), epsilon = 1e-6);
        assert_relative_eq!(round.g(), c.g(), epsilon = 1e-6);
        assert_relative_eq!(round.b(), c.b(), epsilon = 1e-6);
    }

    #[test]
    fn unpremultiply_zero_alpha_is_transparent_black() {
        let c = Vec4::rgba(0.8, 0.4, 0.2, 0.0);
        assert_eq!(unpremultiply(c), Vec4::ZERO);
    }
}
