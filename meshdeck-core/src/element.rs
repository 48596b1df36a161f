//! Element taxonomy and per-shape geometry kernels.
//!
//! [`ElementType`] is the closed set of supported cells, keyed by VTK-style
//! shape codes. Each type resolves to a [`Shape`], and each shape carries a
//! [`ShapeGeometry`] implementation computing its quality metrics from the
//! corner (vertex) coordinates. Quadratic mid-side nodes never enter the
//! geometry kernels.
//!
//! # Node ordering
//!
//! Volumetric cells follow the right-hand convention where the first face
//! `(0, 1, 2[, 3])` has its normal pointing into the element (towards the
//! apex or opposite face). Elements ordered this way have positive Jacobians.
//!
//! # Submodules
//!
//! - [`line`], [`triangle`], [`quad`] - 1D and 2D cells
//! - [`tetra`], [`hexa`], [`prism`], [`pyramid`] - 3D cells

use crate::types::{polygon_angles, Point3, LENGTH_EPS};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod hexa;
pub mod line;
pub mod prism;
pub mod pyramid;
pub mod quad;
pub mod tetra;
pub mod triangle;

pub use hexa::Hexahedron;
pub use line::Line;
pub use prism::Prism;
pub use pyramid::Pyramid;
pub use quad::Quadrilateral;
pub use tetra::Tetrahedron;
pub use triangle::Triangle;

/// Ratio reported when an element has a zero-length edge.
///
/// Kept finite so statistics and JSON output stay well defined.
pub const DEGENERATE_RATIO: f64 = 1e12;

/// Supported element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    /// 2-node line.
    Line2,
    /// 3-node line (quadratic).
    Line3,
    /// 3-node triangle.
    Tri3,
    /// 6-node triangle (quadratic).
    Tri6,
    /// 4-node quadrilateral.
    Quad4,
    /// 8-node quadrilateral (serendipity).
    Quad8,
    /// 9-node quadrilateral (Lagrange).
    Quad9,
    /// 4-node tetrahedron.
    Tet4,
    /// 10-node tetrahedron (quadratic).
    Tet10,
    /// 8-node hexahedron.
    Hex8,
    /// 20-node hexahedron (serendipity).
    Hex20,
    /// 27-node hexahedron (Lagrange).
    Hex27,
    /// 6-node triangular prism (wedge).
    Prism6,
    /// 15-node triangular prism (quadratic).
    Prism15,
    /// 5-node pyramid.
    Pyramid5,
    /// 13-node pyramid (quadratic).
    Pyramid13,
    /// 3-node surface triangle in 3D, used for boundary conditions.
    SurfaceTri3,
    /// 4-node surface quadrilateral in 3D, used for boundary conditions.
    SurfaceQuad4,
}

/// Every entry of the taxonomy, in declaration order.
pub const TAXONOMY: [ElementType; 18] = [
    ElementType::Line2,
    ElementType::Line3,
    ElementType::Tri3,
    ElementType::Tri6,
    ElementType::Quad4,
    ElementType::Quad8,
    ElementType::Quad9,
    ElementType::Tet4,
    ElementType::Tet10,
    ElementType::Hex8,
    ElementType::Hex20,
    ElementType::Hex27,
    ElementType::Prism6,
    ElementType::Prism15,
    ElementType::Pyramid5,
    ElementType::Pyramid13,
    ElementType::SurfaceTri3,
    ElementType::SurfaceQuad4,
];

impl ElementType {
    /// Shape code (VTK cell-type numbering, surface conditions offset by 100).
    pub fn code(self) -> u8 {
        match self {
            ElementType::Line2 => 3,
            ElementType::Line3 => 21,
            ElementType::Tri3 => 5,
            ElementType::Tri6 => 22,
            ElementType::Quad4 => 9,
            ElementType::Quad8 => 23,
            ElementType::Quad9 => 28,
            ElementType::Tet4 => 10,
            ElementType::Tet10 => 24,
            ElementType::Hex8 => 12,
            ElementType::Hex20 => 25,
            ElementType::Hex27 => 29,
            ElementType::Prism6 => 13,
            ElementType::Prism15 => 26,
            ElementType::Pyramid5 => 14,
            ElementType::Pyramid13 => 27,
            ElementType::SurfaceTri3 => 105,
            ElementType::SurfaceQuad4 => 109,
        }
    }

    /// Look up a shape code, `None` if it is not part of the taxonomy.
    pub fn from_code_strict(code: u8) -> Option<Self> {
        TAXONOMY.iter().copied().find(|t| t.code() == code)
    }

    /// Look up a shape code, falling back to [`ElementType::Tet4`].
    ///
    /// The fallback is logged at warn level so the substitution is visible.
    pub fn from_code(code: u8) -> Self {
        Self::from_code_strict(code).unwrap_or_else(|| {
            log::warn!("unknown shape code {code}, treating cell as 4-node tetrahedron");
            ElementType::Tet4
        })
    }

    /// Number of nodes for this element type.
    pub fn n_nodes(self) -> usize {
        match self {
            ElementType::Line2 => 2,
            ElementType::Line3 => 3,
            ElementType::Tri3 | ElementType::SurfaceTri3 => 3,
            ElementType::Tri6 => 6,
            ElementType::Quad4 | ElementType::SurfaceQuad4 => 4,
            ElementType::Quad8 => 8,
            ElementType::Quad9 => 9,
            ElementType::Tet4 => 4,
            ElementType::Tet10 => 10,
            ElementType::Hex8 => 8,
            ElementType::Hex20 => 20,
            ElementType::Hex27 => 27,
            ElementType::Prism6 => 6,
            ElementType::Prism15 => 15,
            ElementType::Pyramid5 => 5,
            ElementType::Pyramid13 => 13,
        }
    }

    /// Element-type name written to the solver deck.
    pub fn solver_name(self) -> &'static str {
        match self {
            ElementType::Line2 => "LineElement3D2N",
            ElementType::Line3 => "LineElement3D3N",
            ElementType::Tri3 => "Element2D3N",
            ElementType::Tri6 => "Element2D6N",
            ElementType::Quad4 => "Element2D4N",
            ElementType::Quad8 => "Element2D8N",
            ElementType::Quad9 => "Element2D9N",
            ElementType::Tet4 => "Element3D4N",
            ElementType::Tet10 => "Element3D10N",
            ElementType::Hex8 => "Element3D8N",
            ElementType::Hex20 => "Element3D20N",
            ElementType::Hex27 => "Element3D27N",
            ElementType::Prism6 => "Element3D6N",
            ElementType::Prism15 => "Element3D15N",
            ElementType::Pyramid5 => "Element3D5N",
            ElementType::Pyramid13 => "Element3D13N",
            ElementType::SurfaceTri3 => "SurfaceCondition3D3N",
            ElementType::SurfaceQuad4 => "SurfaceCondition3D4N",
        }
    }

    /// Geometric shape family.
    pub fn shape(self) -> Shape {
        match self {
            ElementType::Line2 | ElementType::Line3 => Shape::Line,
            ElementType::Tri3 | ElementType::Tri6 | ElementType::SurfaceTri3 => Shape::Triangle,
            ElementType::Quad4
            | ElementType::Quad8
            | ElementType::Quad9
            | ElementType::SurfaceQuad4 => Shape::Quad,
            ElementType::Tet4 | ElementType::Tet10 => Shape::Tetrahedron,
            ElementType::Hex8 | ElementType::Hex20 | ElementType::Hex27 => Shape::Hexahedron,
            ElementType::Prism6 | ElementType::Prism15 => Shape::Prism,
            ElementType::Pyramid5 | ElementType::Pyramid13 => Shape::Pyramid,
        }
    }

    /// Number of vertex nodes (the leading entries of the connectivity).
    pub fn corner_count(self) -> usize {
        self.shape().geometry().n_corners()
    }

    /// Topological dimension (1, 2 or 3).
    pub fn dimension(self) -> usize {
        self.shape().dimension()
    }

    /// Whether this entry is a boundary condition facet rather than a domain element.
    pub fn is_condition(self) -> bool {
        matches!(self, ElementType::SurfaceTri3 | ElementType::SurfaceQuad4)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.solver_name())
    }
}

/// Shape families with their own metric formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Line,
    Triangle,
    Quad,
    Tetrahedron,
    Hexahedron,
    Prism,
    Pyramid,
}

impl Shape {
    /// Geometry kernel for this shape.
    pub fn geometry(self) -> &'static dyn ShapeGeometry {
        match self {
            Shape::Line => &Line,
            Shape::Triangle => &Triangle,
            Shape::Quad => &Quadrilateral,
            Shape::Tetrahedron => &Tetrahedron,
            Shape::Hexahedron => &Hexahedron,
            Shape::Prism => &Prism,
            Shape::Pyramid => &Pyramid,
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            Shape::Line => 1,
            Shape::Triangle | Shape::Quad => 2,
            Shape::Tetrahedron | Shape::Hexahedron | Shape::Prism | Shape::Pyramid => 3,
        }
    }
}

/// Closed-form geometry of one shape family.
///
/// All methods take the corner coordinates only (length = [`n_corners`]).
/// Implementations are stateless and shared across threads.
///
/// [`n_corners`]: ShapeGeometry::n_corners
pub trait ShapeGeometry: Send + Sync {
    /// Number of corner nodes.
    fn n_corners(&self) -> usize;

    /// Edges used for aspect and edge ratios, as corner index pairs.
    fn edges(&self) -> &'static [[usize; 2]];

    /// Boundary facets as corner index lists (edges for 2D shapes).
    fn faces(&self) -> &'static [&'static [usize]];

    /// Deviation from the regular shape, 0 for an ideal element.
    fn skewness(&self, corners: &[Point3]) -> f64;

    /// Signed Jacobian normalized by the ideal element, 1 for an ideal element.
    fn jacobian_ratio(&self, corners: &[Point3]) -> f64;

    /// Signed length, area or volume using the reference formula.
    fn measure(&self, corners: &[Point3]) -> f64;

    /// Signed measure by exact decomposition.
    ///
    /// Defaults to [`measure`](ShapeGeometry::measure) for shapes whose
    /// reference formula is already exact.
    fn exact_measure(&self, corners: &[Point3]) -> f64 {
        self.measure(corners)
    }

    /// Lengths of the edges returned by [`edges`](ShapeGeometry::edges).
    fn edge_lengths(&self, corners: &[Point3]) -> Vec<f64> {
        self.edges()
            .iter()
            .map(|&[a, b]| (corners[b] - corners[a]).norm())
            .collect()
    }

    /// Longest edge over shortest edge.
    fn aspect_ratio(&self, corners: &[Point3]) -> f64 {
        let lengths = self.edge_lengths(corners);
        let min = lengths.iter().copied().fold(f64::INFINITY, f64::min);
        let max = lengths.iter().copied().fold(0.0, f64::max);
        if min < LENGTH_EPS {
            DEGENERATE_RATIO
        } else {
            max / min
        }
    }

    /// Mean length of the edges returned by [`edges`](ShapeGeometry::edges).
    fn mean_edge_length(&self, corners: &[Point3]) -> f64 {
        let lengths = self.edge_lengths(corners);
        if lengths.is_empty() {
            return 0.0;
        }
        lengths.iter().sum::<f64>() / lengths.len() as f64
    }
}

/// Largest relative deviation of a polygon's interior angles from `ideal_deg`.
///
/// Returns 1.0 when a corner is degenerate.
pub(crate) fn angle_skewness(polygon: &[Point3], ideal_deg: f64) -> f64 {
    match polygon_angles(polygon) {
        Some(angles) => angles
            .iter()
            .map(|a| (a - ideal_deg).abs() / ideal_deg)
            .fold(0.0, f64::max),
        None => 1.0,
    }
}

/// Worst angle skewness over a set of faces, triangles against 60° and
/// quadrilaterals against 90°.
pub(crate) fn face_angle_skewness(corners: &[Point3], faces: &[&[usize]]) -> f64 {
    faces
        .iter()
        .map(|face| {
            let polygon: Vec<Point3> = face.iter().map(|&i| corners[i]).collect();
            let ideal = if face.len() == 3 { 60.0 } else { 90.0 };
            angle_skewness(&polygon, ideal)
        })
        .fold(0.0, f64::max)
}

/// Scaled corner Jacobian: det[e1, e2, e3] / (|e1| |e2| |e3|).
///
/// Zero when any edge is degenerate.
pub(crate) fn scaled_corner_jacobian(
    corners: &[Point3],
    at: usize,
    [a, b, c]: [usize; 3],
) -> f64 {
    let e1 = corners[a] - corners[at];
    let e2 = corners[b] - corners[at];
    let e3 = corners[c] - corners[at];
    let scale = e1.norm() * e2.norm() * e3.norm();
    if scale < LENGTH_EPS.powi(3) {
        return 0.0;
    }
    e1.dot(&e2.cross(&e3)) / scale
}

/// Jacobian ratio and area of a boundary facet, measured against the facet's
/// own normal. `None` for shapes that are never used as facets.
pub fn facet_metrics(shape: Shape, corners: &[Point3]) -> Option<(f64, f64)> {
    match shape {
        Shape::Triangle => Some((
            Triangle.facet_jacobian_ratio(corners),
            Triangle.facet_area(corners),
        )),
        Shape::Quad => Some((
            Quadrilateral.facet_jacobian_ratio(corners),
            Quadrilateral.facet_area(corners),
        )),
        _ => None,
    }
}

/// Coordinates of the leading `n` connectivity entries.
///
/// Used to strip quadratic mid-side nodes before evaluating metrics.
pub fn corner_coords(element_type: ElementType, coords: &[Point3]) -> &[Point3] {
    let n = element_type.corner_count().min(coords.len());
    &coords[..n]
}
