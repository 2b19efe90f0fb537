//! Input path representation.

/// An input closed polygonal path plus a numeric id. Owned by the caller of
/// the core; read-only during rasterization.
#[derive(Clone, Debug)]
pub struct RenderPath {
    pub id: u32,
    /// Vertices in order; the path is implicitly closed (the last vertex
    /// connects back to the first).
    pub vertices: Vec<(f64, f64)>,
    /// How many times this path counts toward a face's winding number at a
    /// point it encloses. Almost always `1`; a caller modeling a "subtract"
    /// path can use `-1` so that `isInside` predicates built from
    /// `windingMap` see the expected sign.
    pub winding_contribution: i32,
}

impl RenderPath {
    pub fn new(id: u32, vertices: Vec<(f64, f64)>) -> Self {
        Self { id, vertices, winding_contribution: 1 }
    }

    pub fn with_winding_contribution(mut self, contribution: i32) -> Self {
        self.winding_contribution = contribution;
        self
    }
}
