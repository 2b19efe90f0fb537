//! Gradient stops, extend modes, and ratio-space interpolation.

use crate::math::vec4::Vec4;

/// How an out-of-`[0,1]` gradient parameter is mapped back into range.
/// Bit values match the external binary encoding: Pad=0, Reflect=1,
/// Repeat=2 (3 reserved).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtendMode {
    Pad,
    Reflect,
    Repeat,
}

impl ExtendMode {
    pub fn bits(self) -> u8 {
        match self {
            ExtendMode::Pad => 0,
            ExtendMode::Reflect => 1,
            ExtendMode::Repeat => 2,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(ExtendMode::Pad),
            1 => Some(ExtendMode::Reflect),
            2 => Some(ExtendMode::Repeat),
            _ => None,
        }
    }

    /// Map an unbounded gradient parameter `t` into `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            ExtendMode::Pad => t.clamp(0.0, 1.0),
            ExtendMode::Repeat => t.rem_euclid(1.0),
            ExtendMode::Reflect => {
                // section = floor(t) mod 2N, N = 1 here (single unit period);
                // reflect folds the second half back over the first.
                let n = 1.0;
                let period = 2.0 * n;
                let wrapped = t.rem_euclid(period);
                if wrapped < n {
                    wrapped
                } else {
                    period - wrapped
                }
            }
        }
    }
}

/// The kind of radial gradient geometry, matching the external 2-bit
/// encoding (Circular=0, Strip=1, FocalOnCircle=2, Cone=3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadialGradientKind {
    Circular,
    Strip,
    FocalOnCircle,
    Cone,
}

impl RadialGradientKind {
    pub fn bits(self) -> u8 {
        match self {
            RadialGradientKind::Circular => 0,
            RadialGradientKind::Strip => 1,
            RadialGradientKind::FocalOnCircle => 2,
            RadialGradientKind::Cone => 3,
        }
    }
}

/// A single gradient stop: a ratio in `[0, 1]` and a premultiplied color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub ratio: f32,
    pub color: Vec4,
}

/// Blend two adjacent stops' colors by the local interpolation parameter
/// `u` (premultiplied-space linear interpolation, matching the
/// accumulation space the rest of the evaluator works in).
pub fn ratio_blend(a: GradientStop, b: GradientStop, u: f32) -> Vec4 {
    a.color.lerp(b.color, u)
}

/// Locate the stop interval containing `t` (assumed already extend-mapped
/// into `[0, 1]`) by linear search over sorted ratios, and return the
/// blended color. `stops` must be sorted ascending by `ratio` and contain
/// at least one element; a single-stop gradient returns that stop's color
/// everywhere.
pub fn evaluate(stops: &[GradientStop], t: f32) -> Vec4 {
    debug_assert!(!stops.is_empty());
    if stops.len() == 1 {
        return stops[0].color;
    }
    if t <= stops[0].ratio {
        return stops[0].color;
    }
    if t >= stops[stops.len() - 1].ratio {
        return stops[stops.len() - 1].color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.ratio && t <= b.ratio {
            let span = b.ratio - a.ratio;
            let u = if span > 0.0 { (t - a.ratio) / span } else { 0.0 };
            return ratio_blend(a, b, u);
        }
    }
    stops[stops.len() - 1].color
}

/// The "before-ratio count" search hint from the external binary encoding:
/// the number of stops with `ratio <= t`, usable to seed a binary search
/// starting point on the decoder side.
pub fn before_ratio_count(stops: &[GradientStop], t: f32) -> u16 {
    stops.iter().filter(|s| s.ratio <= t).count() as u16
}
