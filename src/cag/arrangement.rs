//! Orchestrates the full planar arrangement pipeline: snap, intersect,
//! split into half-edges, link next pointers, recover boundaries and
//! faces, then evaluate windings and filter by an `is_inside` predicate.

use std::collections::HashMap;

use crate::error::CagError;
use crate::math::rational::RationalPoint;
use crate::paths::RenderPath;

use super::boundary::{build_boundaries, link_next_pointers, RationalBoundary};
use super::face::{assign_windings, recover_faces, RationalFace};
use super::halfedge::{build_half_edges, RationalHalfEdge};
use super::integer_edge::{intersect_pair, snap_paths, IntegerEdge, ToIntegerMatrix};

/// Tuning knobs for [`Arrangement::build`].
#[derive(Clone, Copy, Debug)]
pub struct ArrangementConfig {
    /// Half-width of the integer lattice edges are snapped into. Larger
    /// values reduce snapping error at the cost of larger intermediate
    /// `i128` products during intersection testing.
    pub integer_range: i32,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self { integer_range: 1 << 20 }
    }
}

/// The result of arranging a set of input paths: the full half-edge arena,
/// its boundary cycles, its recovered faces (each carrying a winding
/// number per input path), and the matrix used to snap the inputs.
pub struct Arrangement {
    pub half_edges: Vec<RationalHalfEdge>,
    pub boundaries: Vec<RationalBoundary>,
    pub faces: Vec<RationalFace>,
    pub matrix: ToIntegerMatrix,
    edges: Vec<IntegerEdge>,
}

impl Arrangement {
    /// Run the full pipeline over `paths`.
    pub fn build(paths: &[RenderPath], config: ArrangementConfig) -> Result<Self, CagError> {
        let (mut edges, matrix) = snap_paths(paths, config.integer_range)?;

        for i in 0..edges.len() {
            for j in (i + 1)..edges.len() {
                let (left, right) = edges.split_at_mut(j);
                intersect_pair(&mut left[i], &mut right[0]);
            }
        }

        let mut half_edges = build_half_edges(&edges);
        link_next_pointers(&mut half_edges);
        let boundaries = build_boundaries(&half_edges);
        let mut faces = recover_faces(&half_edges, &boundaries);

        let path_windings: HashMap<u32, i32> = paths.iter().map(|p| (p.id, p.winding_contribution)).collect();
        assign_windings(&half_edges, &boundaries, &edges, &path_windings, &mut faces);

        Ok(Self { half_edges, boundaries, faces, matrix, edges })
    }

    /// The bounded faces for which `is_inside` accepts the face's winding
    /// map, i.e. the faces that belong to the boolean combination of input
    /// paths the caller is asking for. The unbounded face is never
    /// returned even if `is_inside` would accept it.
    pub fn filter_faces<'a, F>(&'a self, is_inside: F) -> Vec<&'a RationalFace>
    where
        F: Fn(&HashMap<u32, i32>) -> bool,
    {
        self.faces.iter().filter(|f| !f.is_unbounded() && is_inside(&f.windings)).collect()
    }

    /// Default "fill" predicate: non-zero winding for at least one path.
    pub fn default_is_inside(windings: &HashMap<u32, i32>) -> bool {
        windings.values().any(|&w| w != 0)
    }

    /// The outer boundary's vertices of `face`, mapped back into the
    /// caller's original coordinate system, suitable for feeding into a
    /// renderable-face's pixel-space polygon.
    pub fn face_outline(&self, face: &RationalFace) -> Vec<(f64, f64)> {
        let Some(outer) = face.outer else { return Vec::new() };
        self.boundaries[outer]
            .half_edges
            .iter()
            .map(|&idx| {
                let h = &self.half_edges[idx as usize];
                let (x, y) = h.start.to_f64();
                self.matrix.invert(x, y)
            })
            .collect()
    }

    /// The inner (hole) boundaries of `face`, each mapped back into the
    /// caller's original coordinate system.
    pub fn face_holes(&self, face: &RationalFace) -> Vec<Vec<(f64, f64)>> {
        face.inner
            .iter()
            .map(|&idx| {
                self.boundaries[idx]
                    .half_edges
                    .iter()
                    .map(|&he| {
                        let h = &self.half_edges[he as usize];
                        let (x, y) = h.start.to_f64();
                        self.matrix.invert(x, y)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn edges(&self) -> &[IntegerEdge] {
        &self.edges
    }

    /// Sample interior point of a face in the caller's original coordinate
    /// system, or `None` for the unbounded face.
    pub fn face_sample_point(&self, face: &RationalFace) -> Option<(f64, f64)> {
        let outer = face.outer?;
        let sample: RationalPoint =
            super::boundary::interior_sample_point(&self.half_edges, &self.boundaries[outer], crate::math::rational::Rat::new(1, 1_000_000));
        let (x, y) = sample.to_f64();
        Some(self.matrix.invert(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_path(id: u32, off: f64) -> RenderPath {
        RenderPath::new(id, vec![(off, off), (off + 10.0, off), (off + 10.0, off + 10.0), (off, off + 10.0)])
    }

    #[test]
    fn single_square_has_one_fillable_face() {
        let paths = vec![square_path(0, 0.0)];
        let arrangement = Arrangement::build(&paths, ArrangementConfig::default()).unwrap();
        let filled = arrangement.filter_faces(Arrangement::default_is_inside);
        assert_eq!(filled.len(), 1);
    }

    #[test]
    fn too_few_vertices_is_rejected() {
        let paths = vec![RenderPath::new(0, vec![(0.0, 0.0), (1.0, 1.0)])];
        let err = Arrangement::build(&paths, ArrangementConfig::default()).unwrap_err();
        matches!(err, CagError::TooFewVertices(2));
    }

    #[test]
    fn overlapping_squares_union_yields_three_bounded_subfaces() {
        // Two unit-ish squares offset by half their width, unioned via
        // non-zero winding: the arrangement still records each monotone
        // region (left-only, overlap, right-only) as a separate face, all
        // with winding != 0, all accepted by the default fill predicate.
        let paths = vec![square_path(0, 0.0), square_path(1, 5.0)];
        let arrangement = Arrangement::build(&paths, ArrangementConfig::default()).unwrap();
        let filled = arrangement.filter_faces(Arrangement::default_is_inside);
        assert_eq!(filled.len(), 3);
    }

    #[test]
    fn overlapping_squares_xor_yields_two_fillable_faces() {
        let paths = vec![square_path(0, 0.0), square_path(1, 5.0)];
        let arrangement = Arrangement::build(&paths, ArrangementConfig::default()).unwrap();
        let filled = arrangement.filter_faces(|w| {
            let a = *w.get(&0).unwrap_or(&0) != 0;
            let b = *w.get(&1).unwrap_or(&0) != 0;
            a != b
        });
        assert_eq!(filled.len(), 2);
    }
}
