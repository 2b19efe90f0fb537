//! Face recovery and winding evaluation.

use std::collections::HashMap;

use crate::math::rational::{Rat, RationalPoint};

use super::boundary::{BoundaryKind, RationalBoundary};
use super::halfedge::RationalHalfEdge;
use super::integer_edge::IntegerEdge;

/// A connected open region of the arrangement: one outer boundary (`None`
/// for the distinguished unbounded face) and zero or more inner (hole)
/// boundaries, plus each input path's winding number around any interior
/// point (constant per face by the Jordan-curve theorem).
#[derive(Clone, Debug)]
pub struct RationalFace {
    pub outer: Option<usize>,
    pub inner: Vec<usize>,
    pub windings: HashMap<u32, i32>,
}

impl RationalFace {
    pub fn is_unbounded(&self) -> bool {
        self.outer.is_none()
    }
}

/// Exact ray-casting point-in-polygon test: does `point` lie strictly
/// inside the closed polygon traced by `boundary`? Casts a ray in the `+x`
/// direction and counts crossings using exact sign comparisons.
pub fn point_in_boundary(half_edges: &[RationalHalfEdge], boundary: &RationalBoundary, point: &RationalPoint) -> bool {
    let mut inside = false;
    for &idx in &boundary.half_edges {
        let h = &half_edges[idx as usize];
        let (ax, ay) = (&h.start.x, &h.start.y);
        let (bx, by) = (&h.end.x, &h.end.y);
        let straddles = (*ay > point.y) != (*by > point.y);
        if straddles {
            // x at which the edge crosses the horizontal line y = point.y:
            // x = ax + (point.y - ay) * (bx - ax) / (by - ay)
            let t = (point.y.clone() - ay.clone()) / non_zero(by.clone() - ay.clone());
            let x_at_y = ax.clone() + (bx.clone() - ax.clone()) * t;
            if x_at_y > point.x {
                inside = !inside;
            }
        }
    }
    inside
}

// Debug-only guard before the division above: `straddles` already rules out
// `by == ay`, so this only documents that invariant at the call site — in a
// release build a zero denominator would reach `Rat`'s own `Div` impl
// unchecked.
fn non_zero(denom: Rat) -> Rat {
    debug_assert!(!denom.is_zero());
    denom
}

/// Recover faces from a set of boundaries: each Outer
/// boundary seeds a bounded face; each Inner boundary is attached either to
/// the innermost Outer boundary that contains it, or — if none contains it
/// — to the distinguished unbounded face as one of its holes.
pub fn recover_faces(half_edges: &[RationalHalfEdge], boundaries: &[RationalBoundary]) -> Vec<RationalFace> {
    let outer_indices: Vec<usize> =
        boundaries.iter().enumerate().filter(|(_, b)| b.kind == BoundaryKind::Outer).map(|(i, _)| i).collect();
    let inner_indices: Vec<usize> =
        boundaries.iter().enumerate().filter(|(_, b)| b.kind == BoundaryKind::Inner).map(|(i, _)| i).collect();

    let mut faces: Vec<RationalFace> =
        outer_indices.iter().map(|&outer| RationalFace { outer: Some(outer), inner: Vec::new(), windings: HashMap::new() }).collect();
    let mut unbounded = RationalFace { outer: None, inner: Vec::new(), windings: HashMap::new() };

    for &inner in &inner_indices {
        let sample = boundary_sample_point(half_edges, &boundaries[inner]);
        let mut best: Option<(usize, Rat)> = None;
        for (face_idx, &outer) in outer_indices.iter().enumerate() {
            if !point_in_boundary(half_edges, &boundaries[outer], &sample) {
                continue;
            }
            let area = boundary_area_abs(half_edges, &boundaries[outer]);
            if best.as_ref().map(|(_, a)| area < *a).unwrap_or(true) {
                best = Some((face_idx, area));
            }
        }
        match best {
            Some((face_idx, _)) => faces[face_idx].inner.push(inner),
            None => unbounded.inner.push(inner),
        }
    }

    faces.push(unbounded);
    faces
}

fn boundary_sample_point(half_edges: &[RationalHalfEdge], boundary: &RationalBoundary) -> RationalPoint {
    super::boundary::interior_sample_point(half_edges, boundary, Rat::new(1, 1_000_000))
}

fn boundary_area_abs(half_edges: &[RationalHalfEdge], boundary: &RationalBoundary) -> Rat {
    let mut sum = Rat::zero();
    for &idx in &boundary.half_edges {
        let h = &half_edges[idx as usize];
        sum = sum + (h.start.x.clone() * h.end.y.clone() - h.end.x.clone() * h.start.y.clone());
    }
    if sum.signum() < 0 {
        -sum
    } else {
        sum
    }
}

/// Exact crossing-count winding number of `path_id`'s original polygon
/// around `point`. Only edges belonging to `path_id`
/// participate; each contributes its path's `winding_contribution`.
pub fn winding_number(edges: &[IntegerEdge], path_id: u32, winding_contribution: i32, point: &RationalPoint) -> i32 {
    let mut winding = 0;
    for edge in edges.iter().filter(|e| e.path_id == path_id) {
        let a = (Rat::from_integer(edge.p0.0 as i64), Rat::from_integer(edge.p0.1 as i64));
        let b = (Rat::from_integer(edge.p1.0 as i64), Rat::from_integer(edge.p1.1 as i64));
        let straddles = (a.1 > point.y) != (b.1 > point.y);
        if !straddles {
            continue;
        }
        let t = (point.y.clone() - a.1.clone()) / non_zero(b.1.clone() - a.1.clone());
        let x_at_y = a.0.clone() + (b.0.clone() - a.0.clone()) * t;
        if x_at_y > point.x {
            winding += if b.1 > a.1 { winding_contribution } else { -winding_contribution };
        }
    }
    winding
}

/// Compute every face's winding map over every path present in `edges`,
/// mutating `faces` in place. The unbounded face keeps winding 0 for every
/// path, the distinguished face's defining invariant.
pub fn assign_windings(
    half_edges: &[RationalHalfEdge],
    boundaries: &[RationalBoundary],
    edges: &[IntegerEdge],
    path_windings: &HashMap<u32, i32>,
    faces: &mut [RationalFace],
) {
    let path_ids: Vec<u32> = path_windings.keys().copied().collect();
    for face in faces.iter_mut() {
        if face.is_unbounded() {
            for &pid in &path_ids {
                face.windings.insert(pid, 0);
            }
            continue;
        }
        let outer = face.outer.expect("bounded face has an outer boundary");
        let sample = boundary_sample_point(half_edges, &boundaries[outer]);
        for &pid in &path_ids {
            let contribution = path_windings[&pid];
            let w = winding_number(edges, pid, contribution, &sample);
            face.windings.insert(pid, w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cag::halfedge::{build_half_edges, RationalHalfEdge as HE};
    use crate::cag::boundary::{build_boundaries, link_next_pointers};

    fn square(off_x: i32, off_y: i32, id: u32) -> Vec<IntegerEdge> {
        let pts = [(0 + off_x, 0 + off_y), (10 + off_x, 0 + off_y), (10 + off_x, 10 + off_y), (0 + off_x, 10 + off_y)];
        let mut edges = Vec::new();
        for i in 0..4 {
            edges.push(IntegerEdge { p0: pts[i], p1: pts[(i + 1) % 4], path_id: id, edge_index: i, intersections: Vec::new() });
        }
        edges
    }

    fn build(edges: &[IntegerEdge]) -> (Vec<HE>, Vec<super::super::boundary::RationalBoundary>) {
        let mut half_edges = build_half_edges(edges);
        link_next_pointers(&mut half_edges);
        let boundaries = build_boundaries(&half_edges);
        (half_edges, boundaries)
    }

    #[test]
    fn single_square_has_one_bounded_face_with_winding_one() {
        let edges = square(0, 0, 0);
        let (half_edges, boundaries) = build(&edges);
        let mut faces = recover_faces(&half_edges, &boundaries);
        let bounded: Vec<_> = faces.iter().filter(|f| !f.is_unbounded()).collect();
        assert_eq!(bounded.len(), 1);

        let mut path_windings = HashMap::new();
        path_windings.insert(0u32, 1);
        assign_windings(&half_edges, &boundaries, &edges, &path_windings, &mut faces);

        let bounded_face = faces.iter().find(|f| !f.is_unbounded()).unwrap();
        assert_eq!(bounded_face.windings[&0], 1);
        let unbounded_face = faces.iter().find(|f| f.is_unbounded()).unwrap();
        assert_eq!(unbounded_face.windings[&0], 0);
    }
}
