//! Vertex gathering, angular ordering, and boundary construction.

use std::collections::HashMap;

use crate::math::rational::{Rat, RationalPoint};

use super::halfedge::{RationalHalfEdge, UNSET};

/// A cyclic ordered sequence of half-edges bounding a planar region.
#[derive(Clone, Debug)]
pub struct RationalBoundary {
    pub half_edges: Vec<u32>,
    pub kind: BoundaryKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Counter-clockwise; signed area > 0.
    Outer,
    /// Clockwise hole; signed area < 0.
    Inner,
}

/// Assign `next_index` on every half-edge by sorting the outgoing
/// half-edges at each vertex into counter-clockwise angular order and
/// applying the standard "sharpest right turn" DCEL rule: for half-edge
/// `h` arriving at `v`, `next(h)` is the outgoing half-edge immediately
/// *clockwise* of `twin(h)` in `v`'s CCW-sorted adjacency. Walking
/// `next` repeatedly then traces the boundary of the face lying to the
/// left of each directed half-edge.
pub fn link_next_pointers(half_edges: &mut [RationalHalfEdge]) {
    let mut by_start: HashMap<(Rat, Rat), Vec<u32>> = HashMap::new();
    for (i, h) in half_edges.iter().enumerate() {
        by_start.entry((h.start.x.clone(), h.start.y.clone())).or_default().push(i as u32);
    }

    for outgoing in by_start.values_mut() {
        outgoing.sort_by(|&a, &b| {
            let da = half_edges[a as usize].direction();
            let db = half_edges[b as usize].direction();
            da.direction_class()
                .cmp(&db.direction_class())
                .then_with(|| da.cross_sign(&db).reverse())
        });
    }

    for i in 0..half_edges.len() {
        let twin_index = half_edges[i].twin_index;
        let vertex_key = {
            let twin_start = &half_edges[twin_index as usize].start;
            (twin_start.x.clone(), twin_start.y.clone())
        };
        let outgoing = by_start.get(&vertex_key).expect("twin start must have outgoing half-edges");
        let pos = outgoing.iter().position(|&e| e == twin_index).expect("twin must be outgoing from its own start");
        let prev_in_ccw_order = outgoing[(pos + outgoing.len() - 1) % outgoing.len()];
        half_edges[i].next_index = prev_in_ccw_order;
    }
}

/// Walk `next` pointers starting from every half-edge that has not yet been
/// claimed by a boundary, producing the full set of boundary cycles.
pub fn build_boundaries(half_edges: &[RationalHalfEdge]) -> Vec<RationalBoundary> {
    let mut visited = vec![false; half_edges.len()];
    let mut boundaries = Vec::new();

    for start in 0..half_edges.len() {
        if visited[start] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut current = start as u32;
        loop {
            if visited[current as usize] {
                break;
            }
            visited[current as usize] = true;
            cycle.push(current);
            current = half_edges[current as usize].next_index;
            if current == UNSET {
                break;
            }
        }
        if cycle.is_empty() {
            continue;
        }
        let area2 = signed_area_times_two(half_edges, &cycle);
        let kind = if area2 > Rat::zero() { BoundaryKind::Outer } else { BoundaryKind::Inner };
        boundaries.push(RationalBoundary { half_edges: cycle, kind });
    }
    boundaries
}

/// Twice the signed area enclosed by a boundary cycle (shoelace formula over
/// exact rationals); positive for CCW, negative for CW.
fn signed_area_times_two(half_edges: &[RationalHalfEdge], cycle: &[u32]) -> Rat {
    let mut sum = Rat::zero();
    for &idx in cycle {
        let h = &half_edges[idx as usize];
        let term = h.start.x.clone() * h.end.y.clone() - h.end.x.clone() * h.start.y.clone();
        sum = sum + term;
    }
    sum
}

/// Centroid-ish interior sample point for a CCW boundary: the midpoint of
/// its first half-edge, offset slightly toward the interior (left side of
/// the directed edge). `epsilon`
/// should be small relative to the arrangement's coordinate range but need
/// not be normalized by edge length — any sufficiently small positive
/// rational keeps the sample inside a non-degenerate face.
pub fn interior_sample_point(half_edges: &[RationalHalfEdge], boundary: &RationalBoundary, epsilon: Rat) -> RationalPoint {
    let h = &half_edges[boundary.half_edges[0] as usize];
    let mid_x = (h.start.x.clone() + h.end.x.clone()) * Rat::new(1, 2);
    let mid_y = (h.start.y.clone() + h.end.y.clone()) * Rat::new(1, 2);
    let dir = h.direction();
    // Left normal of (dx, dy) is (-dy, dx).
    let nx = -dir.y.clone();
    let ny = dir.x.clone();
    RationalPoint::new(mid_x + nx * epsilon.clone(), mid_y + ny * epsilon)
}
