//! Integer snapping and exact segment intersection.

use crate::error::CagError;
use crate::math::rational::{Rat, RationalPoint};
use crate::paths::RenderPath;

/// Affine map from floating-point input coordinates into the signed
/// integer lattice `[-range, range]`, and its inverse (used to map
/// arrangement output back into the caller's coordinate system).
#[derive(Clone, Copy, Debug)]
pub struct ToIntegerMatrix {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ToIntegerMatrix {
    /// Build a uniform-scale transform mapping the bounding box of `points`
    /// into `[-range, range]²`, preserving aspect ratio so that half-edge
    /// angular ordering is not skewed.
    pub fn fit(points: impl Iterator<Item = (f64, f64)>, range: i32) -> Option<Self> {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut any = false;
        for (x, y) in points {
            any = true;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        if !any {
            return None;
        }
        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let half_extent = ((max_x - min_x).max(max_y - min_y) / 2.0).max(f64::EPSILON);
        let scale = range as f64 / half_extent;
        Some(Self { scale, translate_x: -cx, translate_y: -cy })
    }

    pub fn apply(&self, x: f64, y: f64) -> (i32, i32) {
        let sx = (x + self.translate_x) * self.scale;
        let sy = (y + self.translate_y) * self.scale;
        (sx.round() as i32, sy.round() as i32)
    }

    /// Map a point out of the integer lattice back into the caller's
    /// original coordinate system.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.scale - self.translate_x, y / self.scale - self.translate_y)
    }
}

/// A directed segment with 32-bit integer endpoints, produced by snapping
/// one edge of an input path through a [`ToIntegerMatrix`].
#[derive(Clone, Debug)]
pub struct IntegerEdge {
    pub p0: (i32, i32),
    pub p1: (i32, i32),
    pub path_id: u32,
    /// Index of this edge within the flat edge list the arrangement builds;
    /// half-edges refer back to their owning edge by this index.
    pub edge_index: usize,
    /// Intersections along this edge, always kept sorted by `t`.
    pub intersections: Vec<RationalIntersection>,
}

/// A `(t, point)` pair: `t ∈ [0, 1]` is the parametric position along the
/// owning edge, `point` is the exact rational intersection coordinate.
#[derive(Clone, Debug)]
pub struct RationalIntersection {
    pub t: Rat,
    pub point: RationalPoint,
}

impl IntegerEdge {
    pub fn is_zero_length(&self) -> bool {
        self.p0 == self.p1
    }

    pub fn insert_intersection(&mut self, intersection: RationalIntersection) {
        let pos = self
            .intersections
            .binary_search_by(|existing| existing.t.cmp(&intersection.t))
            .unwrap_or_else(|insert_at| insert_at);
        self.intersections.insert(pos, intersection);
    }

}

/// Snap every edge of every input path into the integer lattice. Drops
/// zero-length edges immediately (failure semantics place
/// this at step 1, not step 3, since a degenerate edge can never
/// participate in an intersection or a boundary).
pub fn snap_paths(paths: &[RenderPath], range: i32) -> Result<(Vec<IntegerEdge>, ToIntegerMatrix), CagError> {
    for path in paths {
        if path.vertices.len() < 3 {
            return Err(CagError::TooFewVertices(path.vertices.len()));
        }
        if path.vertices.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(CagError::NonFiniteCoordinate);
        }
    }

    let all_points = paths.iter().flat_map(|p| p.vertices.iter().copied());
    let matrix = ToIntegerMatrix::fit(all_points, range).ok_or(CagError::Degenerate)?;

    let mut edges = Vec::new();
    for path in paths {
        let n = path.vertices.len();
        for i in 0..n {
            let (x0, y0) = path.vertices[i];
            let (x1, y1) = path.vertices[(i + 1) % n];
            let p0 = matrix.apply(x0, y0);
            let p1 = matrix.apply(x1, y1);
            if p0 == p1 {
                continue;
            }
            if p0.0.unsigned_abs() as i64 > i64::from(range) * 2
                || p1.0.unsigned_abs() as i64 > i64::from(range) * 2
            {
                return Err(CagError::NumericRange);
            }
            let edge_index = edges.len();
            edges.push(IntegerEdge {
                p0,
                p1,
                path_id: path.id,
                edge_index,
                intersections: Vec::new(),
            });
        }
    }
    Ok((edges, matrix))
}

/// Exact cross product of `(bx - ax, by - ay)` and `(cx - ax, cy - ay)`,
/// widened to `i128` so it cannot overflow for any pair of edges whose
/// endpoints fit in the configured integer range (`IntegerEdge`
/// invariant).
fn cross(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i128 {
    let (ax, ay) = (a.0 as i128, a.1 as i128);
    let (bx, by) = (b.0 as i128, b.1 as i128);
    let (cx, cy) = (c.0 as i128, c.1 as i128);
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

fn bbox_overlap(e1: &IntegerEdge, e2: &IntegerEdge) -> bool {
    let (min1x, max1x) = (e1.p0.0.min(e1.p1.0), e1.p0.0.max(e1.p1.0));
    let (min1y, max1y) = (e1.p0.1.min(e1.p1.1), e1.p0.1.max(e1.p1.1));
    let (min2x, max2x) = (e2.p0.0.min(e2.p1.0), e2.p0.0.max(e2.p1.0));
    let (min2y, max2y) = (e2.p0.1.min(e2.p1.1), e2.p0.1.max(e2.p1.1));
    min1x <= max2x && max1x >= min2x && min1y <= max2y && max1y >= min2y
}

/// Parametric position of `p` on `edge`'s line, as a fraction of `edge`'s
/// length (not clamped to `[0, 1]`). Used both for collinear-overlap
/// ranges and for locating a T-junction: a point that lies exactly on an
/// edge's line without the two edges being collinear.
fn project_param(edge: &IntegerEdge, p: (i32, i32)) -> Rat {
    let dx = (edge.p1.0 - edge.p0.0) as i64;
    let dy = (edge.p1.1 - edge.p0.1) as i64;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0 {
        return Rat::zero();
    }
    let px = (p.0 - edge.p0.0) as i64;
    let py = (p.1 - edge.p0.1) as i64;
    Rat::new(px * dx + py * dy, len_sq)
}

/// Test two `IntegerEdge`s for intersection using exact `i128` cross
/// products, and append the resulting `RationalIntersection`(s) to both.
/// Handles the proper-crossing case, the collinear-overlap case, and the
/// T-junction case: one edge's endpoint landing exactly in the interior
/// of the other edge without the two edges being collinear.
pub fn intersect_pair(e1: &mut IntegerEdge, e2: &mut IntegerEdge) {
    if !bbox_overlap(e1, e2) {
        return;
    }

    let d1 = cross(e1.p0, e1.p1, e2.p0);
    let d2 = cross(e1.p0, e1.p1, e2.p1);
    let d3 = cross(e2.p0, e2.p1, e1.p0);
    let d4 = cross(e2.p0, e2.p1, e1.p1);

    if d1 == 0 && d2 == 0 && d3 == 0 && d4 == 0 {
        intersect_collinear(e1, e2);
        return;
    }

    if ((d1 > 0) != (d2 > 0)) && ((d3 > 0) != (d4 > 0)) && d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0 {
        // Proper crossing. Solve p0 + t1*r = q0 + t2*s for t1, t2 via the
        // standard two-line cross-product formula (r = e1.p1-e1.p0,
        // s = e2.p1-e2.p0, qmp = e2.p0-e1.p0).
        let r = ((e1.p1.0 - e1.p0.0) as i128, (e1.p1.1 - e1.p0.1) as i128);
        let s = ((e2.p1.0 - e2.p0.0) as i128, (e2.p1.1 - e2.p0.1) as i128);
        let qmp = ((e2.p0.0 - e1.p0.0) as i128, (e2.p0.1 - e1.p0.1) as i128);
        let cross2 = |a: (i128, i128), b: (i128, i128)| a.0 * b.1 - a.1 * b.0;

        let denom = cross2(r, s);
        if denom == 0 {
            return;
        }
        let t1 = Rat::new(cross2(qmp, s) as i64, denom as i64);
        let t2 = Rat::new(cross2(qmp, r) as i64, denom as i64);

        let px = Rat::from_integer(e1.p0.0 as i64)
            + (Rat::from_integer(e1.p1.0 as i64) - Rat::from_integer(e1.p0.0 as i64)) * t1.clone();
        let py = Rat::from_integer(e1.p0.1 as i64)
            + (Rat::from_integer(e1.p1.1 as i64) - Rat::from_integer(e1.p0.1 as i64)) * t1.clone();
        let point = RationalPoint::new(px, py);

        e1.insert_intersection(RationalIntersection { t: t1, point: point.clone() });
        e2.insert_intersection(RationalIntersection { t: t2, point });
        return;
    }

    // T-junction: exactly one endpoint lies on the other edge's line
    // (d_i == 0) without the edges being collinear. Split the edge whose
    // interior is touched; a touch at the touched edge's own endpoint
    // (t == 0 or t == 1) is a shared vertex already, not a T-junction, so
    // only strictly interior touches get a new split recorded.
    let zero = Rat::zero();
    let one = Rat::from_integer(1);
    let interior = |t: &Rat| *t > zero && *t < one;

    if d1 == 0 {
        let t = project_param(e1, e2.p0);
        if interior(&t) {
            let point = RationalPoint::new(Rat::from_integer(e2.p0.0 as i64), Rat::from_integer(e2.p0.1 as i64));
            e1.insert_intersection(RationalIntersection { t, point });
        }
    }
    if d2 == 0 {
        let t = project_param(e1, e2.p1);
        if interior(&t) {
            let point = RationalPoint::new(Rat::from_integer(e2.p1.0 as i64), Rat::from_integer(e2.p1.1 as i64));
            e1.insert_intersection(RationalIntersection { t, point });
        }
    }
    if d3 == 0 {
        let t = project_param(e2, e1.p0);
        if interior(&t) {
            let point = RationalPoint::new(Rat::from_integer(e1.p0.0 as i64), Rat::from_integer(e1.p0.1 as i64));
            e2.insert_intersection(RationalIntersection { t, point });
        }
    }
    if d4 == 0 {
        let t = project_param(e2, e1.p1);
        if interior(&t) {
            let point = RationalPoint::new(Rat::from_integer(e1.p1.0 as i64), Rat::from_integer(e1.p1.1 as i64));
            e2.insert_intersection(RationalIntersection { t, point });
        }
    }
}

/// Collinear-overlap case: both edges lie on the same line. Record an
/// intersection at both endpoints of the overlapping sub-range, on both
/// edges.
fn intersect_collinear(e1: &mut IntegerEdge, e2: &mut IntegerEdge) {
    let t_e1_in_e2_p0 = project_param(e2, e1.p0);
    let t_e1_in_e2_p1 = project_param(e2, e1.p1);
    let t_e2_in_e1_p0 = project_param(e1, e2.p0);
    let t_e2_in_e1_p1 = project_param(e1, e2.p1);

    let zero = Rat::zero();
    let one = Rat::from_integer(1);
    let in_unit = |t: &Rat| *t >= zero && *t <= one;

    if in_unit(&t_e2_in_e1_p0) {
        let point = RationalPoint::new(Rat::from_integer(e2.p0.0 as i64), Rat::from_integer(e2.p0.1 as i64));
        e1.insert_intersection(RationalIntersection { t: t_e2_in_e1_p0, point });
    }
    if in_unit(&t_e2_in_e1_p1) {
        let point = RationalPoint::new(Rat::from_integer(e2.p1.0 as i64), Rat::from_integer(e2.p1.1 as i64));
        e1.insert_intersection(RationalIntersection { t: t_e2_in_e1_p1, point });
    }
    if in_unit(&t_e1_in_e2_p0) {
        let point = RationalPoint::new(Rat::from_integer(e1.p0.0 as i64), Rat::from_integer(e1.p0.1 as i64));
        e2.insert_intersection(RationalIntersection { t: t_e1_in_e2_p0, point });
    }
    if in_unit(&t_e1_in_e2_p1) {
        let point = RationalPoint::new(Rat::from_integer(e1.p1.0 as i64), Rat::from_integer(e1.p1.1 as i64));
        e2.insert_intersection(RationalIntersection { t: t_e1_in_e2_p1, point });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_fits_points_into_range() {
        let pts = [(0.0, 0.0), (10.0, 10.0)];
        let m = ToIntegerMatrix::fit(pts.into_iter(), 1 << 20).unwrap();
        let (ix, iy) = m.apply(10.0, 10.0);
        assert!(ix.abs() <= (1 << 20) + 1);
        assert!(iy.abs() <= (1 << 20) + 1);
    }

    #[test]
    fn crossing_segments_intersect_at_midpoint() {
        let mut e1 = IntegerEdge {
            p0: (0, 0),
            p1: (10, 10),
            path_id: 0,
            edge_index: 0,
            intersections: Vec::new(),
        };
        let mut e2 = IntegerEdge {
            p0: (0, 10),
            p1: (10, 0),
            path_id: 1,
            edge_index: 1,
            intersections: Vec::new(),
        };
        intersect_pair(&mut e1, &mut e2);
        assert_eq!(e1.intersections.len(), 1);
        assert_eq!(e2.intersections.len(), 1);
        let p = &e1.intersections[0].point;
        assert_eq!(p.x, Rat::from_integer(5));
        assert_eq!(p.y, Rat::from_integer(5));
    }

    #[test]
    fn parallel_non_overlapping_segments_do_not_intersect() {
        let mut e1 = IntegerEdge {
            p0: (0, 0),
            p1: (10, 0),
            path_id: 0,
            edge_index: 0,
            intersections: Vec::new(),
        };
        let mut e2 = IntegerEdge {
            p0: (0, 5),
            p1: (10, 5),
            path_id: 1,
            edge_index: 1,
            intersections: Vec::new(),
        };
        intersect_pair(&mut e1, &mut e2);
        assert!(e1.intersections.is_empty());
        assert!(e2.intersections.is_empty());
    }

    #[test]
    fn collinear_overlap_marks_both_shared_endpoints() {
        let mut e1 = IntegerEdge {
            p0: (0, 0),
            p1: (10, 0),
            path_id: 0,
            edge_index: 0,
            intersections: Vec::new(),
        };
        let mut e2 = IntegerEdge {
            p0: (5, 0),
            p1: (15, 0),
            path_id: 1,
            edge_index: 1,
            intersections: Vec::new(),
        };
        intersect_pair(&mut e1, &mut e2);
        // e1 gains a split at e2's start (x=5); e2 gains a split at e1's end (x=10).
        assert_eq!(e1.intersections.len(), 1);
        assert_eq!(e2.intersections.len(), 1);
    }

    #[test]
    fn t_junction_splits_the_touched_edge_at_the_others_endpoint() {
        // e2's endpoint (5, 0) lands in the interior of e1 without the two
        // edges being collinear; e1 must be split there even though e2
        // needs no split of its own.
        let mut e1 = IntegerEdge {
            p0: (0, 0),
            p1: (10, 0),
            path_id: 0,
            edge_index: 0,
            intersections: Vec::new(),
        };
        let mut e2 = IntegerEdge {
            p0: (5, -5),
            p1: (5, 0),
            path_id: 1,
            edge_index: 1,
            intersections: Vec::new(),
        };
        intersect_pair(&mut e1, &mut e2);
        assert_eq!(e1.intersections.len(), 1);
        assert_eq!(e1.intersections[0].point, RationalPoint::new(Rat::from_integer(5), Rat::from_integer(0)));
        assert!(e2.intersections.is_empty());
    }

    #[test]
    fn shared_vertex_between_non_collinear_edges_needs_no_extra_split() {
        // Adjacent edges of the same boundary sharing an endpoint: the
        // touch is at both edges' own endpoints, not a T-junction.
        let mut e1 = IntegerEdge {
            p0: (0, 0),
            p1: (10, 0),
            path_id: 0,
            edge_index: 0,
            intersections: Vec::new(),
        };
        let mut e2 = IntegerEdge {
            p0: (10, 0),
            p1: (10, 10),
            path_id: 0,
            edge_index: 1,
            intersections: Vec::new(),
        };
        intersect_pair(&mut e1, &mut e2);
        assert!(e1.intersections.is_empty());
        assert!(e2.intersections.is_empty());
    }
}
