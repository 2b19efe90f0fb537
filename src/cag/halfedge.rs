//! Half-edge arena: the inherently cyclic `twin`/`next` graph is represented
//! as a flat arena indexed by `u32` rather than as a pointer-linked
//! structure.

use crate::math::rational::{RationalPoint, RationalVector};

/// One directed sub-segment of a split `IntegerEdge`. Every half-edge has
/// exactly one twin (the oppositely-oriented copy of the same
/// sub-segment); `twin(twin(h)) == h` and `twin(h).start == h.end`.
#[derive(Clone, Debug)]
pub struct RationalHalfEdge {
    pub start: RationalPoint,
    pub end: RationalPoint,
    /// Index into the arrangement's flat `IntegerEdge` list.
    pub edge_index: u32,
    /// Whether this half-edge runs in the same direction as its owning
    /// `IntegerEdge` (`p0 -> p1`) or the reverse. Only forward half-edges
    /// are used when computing winding numbers against the original path
    /// direction — the backward copy would cancel it out.
    pub forward: bool,
    pub twin_index: u32,
    /// `u32::MAX` until boundary construction assigns it.
    pub next_index: u32,
}

impl RationalHalfEdge {
    pub fn direction(&self) -> RationalVector {
        RationalVector::between(&self.start, &self.end)
    }
}

pub const UNSET: u32 = u32::MAX;

/// Build the half-edge pairs for every `IntegerEdge`, splitting each at its
/// (already t-sorted) intersections. Zero-length
/// sub-segments (degenerate splits at coincident intersection points) are
/// skipped.
pub fn build_half_edges(edges: &[super::integer_edge::IntegerEdge]) -> Vec<RationalHalfEdge> {
    use crate::math::rational::Rat;

    let mut half_edges = Vec::new();
    for edge in edges {
        let start = RationalPoint::new(Rat::from_integer(edge.p0.0 as i64), Rat::from_integer(edge.p0.1 as i64));
        let end = RationalPoint::new(Rat::from_integer(edge.p1.0 as i64), Rat::from_integer(edge.p1.1 as i64));

        let mut stops = Vec::with_capacity(edge.intersections.len() + 2);
        stops.push(start.clone());
        for intersection in &edge.intersections {
            stops.push(intersection.point.clone());
        }
        stops.push(end.clone());

        for pair in stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a == b {
                continue;
            }
            let forward_index = half_edges.len() as u32;
            let backward_index = forward_index + 1;
            half_edges.push(RationalHalfEdge {
                start: a.clone(),
                end: b.clone(),
                edge_index: edge.edge_index as u32,
                forward: true,
                twin_index: backward_index,
                next_index: UNSET,
            });
            half_edges.push(RationalHalfEdge {
                start: b.clone(),
                end: a.clone(),
                edge_index: edge.edge_index as u32,
                forward: false,
                twin_index: forward_index,
                next_index: UNSET,
            });
        }
    }
    half_edges
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::cag::integer_edge::IntegerEdge;
    use proptest::prelude::*;

    proptest! {
        /// spec.md §8: every half-edge has a twin, `twin(twin(h)) = h`,
        /// and `twin(h).start = h.end`, for arbitrary (non-degenerate)
        /// endpoint pairs.
        #[test]
        fn twin_parity_holds_for_arbitrary_edges(
            p0 in (-1000i32..1000, -1000i32..1000),
            p1 in (-1000i32..1000, -1000i32..1000),
        ) {
            prop_assume!(p0 != p1);
            let edges = vec![IntegerEdge { p0, p1, path_id: 0, edge_index: 0, intersections: Vec::new() }];
            let half_edges = build_half_edges(&edges);
            for (i, h) in half_edges.iter().enumerate() {
                let twin = &half_edges[h.twin_index as usize];
                prop_assert_eq!(twin.twin_index as usize, i);
                prop_assert_eq!(&twin.start, &h.end);
                prop_assert_eq!(&twin.end, &h.start);
            }
        }
    }
}
