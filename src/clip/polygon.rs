//! Sutherland–Hodgman polygon clipping against an axis-aligned box, with
//! per-side edge-touch bookkeeping for the rasterizer's fast paths.

use crate::math::vec2::Vec2;

/// A polygon clipped to an AABB, plus the edge-touch counts the fine pass
/// uses to recognize fully-covered strips without re-integrating them.
#[derive(Clone, Debug, PartialEq)]
pub struct ClippedPolygon {
    pub vertices: Vec<Vec2>,
    pub min_x_count: i32,
    pub min_y_count: i32,
    pub max_x_count: i32,
    pub max_y_count: i32,
}

const EPS: f32 = 1e-6;

/// Clip a CCW `polygon` to `[min, max]`. An empty result means the polygon
/// lies entirely outside the box.
pub fn clip_polygon(polygon: &[Vec2], min: Vec2, max: Vec2) -> ClippedPolygon {
    let after_min_x = clip_half_plane(polygon, |p| p.x >= min.x - EPS, |a, b| lerp_x(a, b, min.x));
    let after_max_x = clip_half_plane(&after_min_x, |p| p.x <= max.x + EPS, |a, b| lerp_x(a, b, max.x));
    let after_min_y = clip_half_plane(&after_max_x, |p| p.y >= min.y - EPS, |a, b| lerp_y(a, b, min.y));
    let vertices = clip_half_plane(&after_min_y, |p| p.y <= max.y + EPS, |a, b| lerp_y(a, b, max.y));

    let (min_x_count, min_y_count, max_x_count, max_y_count) = edge_touch_counts(&vertices, min, max);
    ClippedPolygon { vertices, min_x_count, min_y_count, max_x_count, max_y_count }
}

fn clip_half_plane(input: &[Vec2], inside: impl Fn(Vec2) -> bool, intersect: impl Fn(Vec2, Vec2) -> Vec2) -> Vec<Vec2> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut output = Vec::with_capacity(input.len() + 1);
    for i in 0..input.len() {
        let curr = input[i];
        let prev = input[(i + input.len() - 1) % input.len()];
        let curr_in = inside(curr);
        let prev_in = inside(prev);
        if curr_in {
            if !prev_in {
                output.push(intersect(prev, curr));
            }
            output.push(curr);
        } else if prev_in {
            output.push(intersect(prev, curr));
        }
    }
    output
}

fn lerp_x(a: Vec2, b: Vec2, x: f32) -> Vec2 {
    let t = (x - a.x) / (b.x - a.x);
    Vec2::new(x, a.y + (b.y - a.y) * t)
}

fn lerp_y(a: Vec2, b: Vec2, y: f32) -> Vec2 {
    let t = (y - a.y) / (b.y - a.y);
    Vec2::new(a.x + (b.x - a.x) * t, y)
}

/// For each boundary edge lying on one of the box's four sides, accrue
/// +1/-1 by travel direction. For a CCW polygon exactly matching the box,
/// traversal runs rightward along `minY`, upward along `maxX`, leftward
/// along `maxY`, and downward along `minX` — each counted as +1; the
/// opposite direction (a hole boundary touching the same side) counts -1.
fn edge_touch_counts(vertices: &[Vec2], min: Vec2, max: Vec2) -> (i32, i32, i32, i32) {
    let mut counts = (0, 0, 0, 0);
    if vertices.len() < 2 {
        return counts;
    }
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        if (a.x - min.x).abs() < EPS && (b.x - min.x).abs() < EPS {
            counts.0 += if b.y < a.y { 1 } else { -1 };
        }
        if (a.y - min.y).abs() < EPS && (b.y - min.y).abs() < EPS {
            counts.1 += if b.x > a.x { 1 } else { -1 };
        }
        if (a.x - max.x).abs() < EPS && (b.x - max.x).abs() < EPS {
            counts.2 += if b.y > a.y { 1 } else { -1 };
        }
        if (a.y - max.y).abs() < EPS && (b.y - max.y).abs() < EPS {
            counts.3 += if b.x < a.x { 1 } else { -1 };
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![Vec2::new(min, min), Vec2::new(max, min), Vec2::new(max, max), Vec2::new(min, max)]
    }

    #[test]
    fn polygon_fully_inside_box_is_unchanged_up_to_winding() {
        let poly = square(2.0, 8.0);
        let clipped = clip_polygon(&poly, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert_eq!(clipped.vertices.len(), 4);
        assert_eq!((clipped.min_x_count, clipped.min_y_count, clipped.max_x_count, clipped.max_y_count), (0, 0, 0, 0));
    }

    #[test]
    fn polygon_fully_outside_box_clips_to_empty() {
        let poly = square(20.0, 30.0);
        let clipped = clip_polygon(&poly, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(clipped.vertices.is_empty());
    }

    #[test]
    fn polygon_matching_box_touches_all_four_sides() {
        let poly = square(0.0, 10.0);
        let clipped = clip_polygon(&poly, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert_eq!(clipped.min_x_count, 1);
        assert_eq!(clipped.min_y_count, 1);
        assert_eq!(clipped.max_x_count, 1);
        assert_eq!(clipped.max_y_count, 1);
    }

    #[test]
    fn polygon_straddling_one_side_is_clipped_to_half() {
        let poly = square(-5.0, 5.0);
        let clipped = clip_polygon(&poly, Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(clipped.vertices.iter().all(|p| p.x >= -EPS && p.x <= 10.0 + EPS));
        assert!(!clipped.vertices.is_empty());
    }
}
