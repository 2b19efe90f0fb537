//! Matthes–Drakopoulos line-against-AABB clipping.
//!
//! Unlike Cohen–Sutherland, there is no outcode loop: each endpoint is
//! clipped against the x-slab, then the y-slab, so it is corrected at
//! most twice (once per axis) with no iteration.

use crate::math::vec2::Vec2;

/// Clip the segment `(p0, p1)` to the axis-aligned box `[min, max]`,
/// mutating both endpoints in place to the clipped segment. Returns
/// `false` (leaving `p0`/`p1` unspecified-but-unchanged) when no portion
/// of the line through `p0`/`p1` lies inside the box.
pub fn clip_segment(p0: &mut Vec2, p1: &mut Vec2, min: Vec2, max: Vec2) -> bool {
    let (x0, y0) = (p0.x, p0.y);
    let (x1, y1) = (p1.x, p1.y);

    if (x0 < min.x && x1 < min.x) || (x0 > max.x && x1 > max.x) {
        return false;
    }
    if (y0 < min.y && y1 < min.y) || (y0 > max.y && y1 > max.y) {
        return false;
    }

    let dx = x1 - x0;
    let dy = y1 - y0;

    let (mut x0, mut y0, mut x1, mut y1) = (x0, y0, x1, y1);

    if x0 < min.x {
        y0 += dy * (min.x - x0) / dx;
        x0 = min.x;
    } else if x0 > max.x {
        y0 += dy * (max.x - x0) / dx;
        x0 = max.x;
    }
    if x1 < min.x {
        y1 += dy * (min.x - x1) / dx;
        x1 = min.x;
    } else if x1 > max.x {
        y1 += dy * (max.x - x1) / dx;
        x1 = max.x;
    }

    if (y0 < min.y && y1 < min.y) || (y0 > max.y && y1 > max.y) {
        return false;
    }

    if y0 < min.y {
        x0 += dx * (min.y - y0) / dy;
        y0 = min.y;
    } else if y0 > max.y {
        x0 += dx * (max.y - y0) / dy;
        y0 = max.y;
    }
    if y1 < min.y {
        x1 += dx * (min.y - y1) / dy;
        y1 = min.y;
    } else if y1 > max.y {
        x1 += dx * (max.y - y1) / dy;
        y1 = max.y;
    }

    if x0 < min.x || x0 > max.x || x1 < min.x || x1 > max.x {
        return false;
    }

    *p0 = Vec2::new(x0, y0);
    *p1 = Vec2::new(x1, y1);
    true
}
