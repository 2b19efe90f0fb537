//! The Constructive Area Geometry engine: exact-arithmetic planar
//! arrangement construction, face recovery, and winding evaluation.

pub mod arrangement;
pub mod boundary;
pub mod face;
pub mod halfedge;
pub mod integer_edge;

pub use arrangement::{Arrangement, ArrangementConfig};
pub use boundary::{BoundaryKind, RationalBoundary};
pub use face::RationalFace;
pub use halfedge::RationalHalfEdge;
pub use integer_edge::{IntegerEdge, RationalIntersection, ToIntegerMatrix};
