//! Per-element geometric quality metrics.
//!
//! Six scalars are computed for every element from its corner coordinates:
//!
//! | Metric          | Ideal | Acceptable range |
//! |-----------------|-------|------------------|
//! | aspect ratio    | 1     | [1, 10]          |
//! | skewness        | 0     | [0, 0.85]        |
//! | Jacobian ratio  | 1     | > 0              |
//! | orthogonality   | 1     | [0.15, 1]        |
//! | edge ratio      | 1     | [0.1, 10]        |
//! | volume / area   | > 0   | not ~0           |
//!
//! Elements are independent, so the computation runs in parallel with Rayon.
//! Records come back in element order.

use crate::element::{corner_coords, facet_metrics, ElementType, Shape};
use crate::error::{Error, Result};
use crate::mesh::{Element, Node};
use crate::types::{centroid, newell_normal, Point3, Vec3, LENGTH_EPS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Orthogonality value reported by [`OrthogonalityMethod::Placeholder`].
pub const PLACEHOLDER_ORTHOGONALITY: f64 = 0.8;

/// Volumes with magnitude below this are flagged as zero.
pub const ZERO_VOLUME_TOL: f64 = 1e-12;

/// How orthogonality is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrthogonalityMethod {
    /// Constant [`PLACEHOLDER_ORTHOGONALITY`] for every element.
    #[default]
    Placeholder,
    /// Worst alignment between a face normal and the vector from the element
    /// centroid to that face's centroid (1 = perfectly aligned).
    Geometric,
}

/// How hexahedron volume is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HexVolumeMethod {
    /// Product of the three edges leaving corner 0. Approximate, never negative.
    #[default]
    EdgeProduct,
    /// Six signed tetrahedra around the main diagonal.
    TetDecomposition,
}

/// Closed interval of acceptable metric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Acceptable ranges used to flag outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptableRanges {
    pub aspect_ratio: Range,
    pub skewness: Range,
    pub orthogonality: Range,
    pub edge_ratio: Range,
}

impl Default for AcceptableRanges {
    fn default() -> Self {
        Self {
            aspect_ratio: Range::new(1.0, 10.0),
            skewness: Range::new(0.0, 0.85),
            orthogonality: Range::new(0.15, 1.0),
            edge_ratio: Range::new(0.1, 10.0),
        }
    }
}

/// Quality computation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityOptions {
    pub orthogonality: OrthogonalityMethod,
    pub hex_volume: HexVolumeMethod,
    pub ranges: AcceptableRanges,
}

/// Quality metrics and outlier flags for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub element_id: usize,
    pub element_type: ElementType,
    pub aspect_ratio: f64,
    pub skewness: f64,
    pub jacobian: f64,
    pub orthogonality: f64,
    pub edge_ratio: f64,
    /// Signed length, area or volume depending on dimension.
    pub volume: f64,
    pub is_poor_aspect_ratio: bool,
    pub is_poor_skewness: bool,
    pub is_poor_orthogonality: bool,
    pub is_poor_edge_ratio: bool,
    pub is_negative_jacobian: bool,
    pub is_zero_volume: bool,
}

impl QualityRecord {
    /// Whether any flag is raised.
    pub fn has_issue(&self) -> bool {
        self.is_poor_aspect_ratio
            || self.is_poor_skewness
            || self.is_poor_orthogonality
            || self.is_poor_edge_ratio
            || self.is_negative_jacobian
            || self.is_zero_volume
    }
}

/// Compute metrics for a single element from its node coordinates.
///
/// `coords` are in connectivity order; mid-side nodes are ignored. Surface
/// conditions are measured against their own normal, so a facet facing any
/// direction is positive.
///
/// # Errors
///
/// [`Error::MalformedMesh`] if `coords` holds fewer points than the type's corners.
pub fn compute_element(
    element_id: usize,
    element_type: ElementType,
    coords: &[Point3],
    options: &QualityOptions,
) -> Result<QualityRecord> {
    if coords.len() < element_type.corner_count() {
        return Err(Error::MalformedMesh(format!(
            "element {element_id} has {} nodes, {element_type:?} needs at least {}",
            coords.len(),
            element_type.corner_count()
        )));
    }

    let shape = element_type.shape();
    let geometry = shape.geometry();
    let corners = corner_coords(element_type, coords);

    let aspect_ratio = geometry.aspect_ratio(corners);
    let skewness = geometry.skewness(corners);
    let orthogonality = match options.orthogonality {
        OrthogonalityMethod::Placeholder => PLACEHOLDER_ORTHOGONALITY,
        OrthogonalityMethod::Geometric => geometric_orthogonality(shape, corners),
    };
    let edge_ratio = aspect_ratio;
    let facet = if element_type.is_condition() {
        facet_metrics(shape, corners)
    } else {
        None
    };
    let (jacobian, volume) = match facet {
        Some(metrics) => metrics,
        None => {
            let volume = match (shape, options.hex_volume) {
                (Shape::Hexahedron, HexVolumeMethod::TetDecomposition) => {
                    geometry.exact_measure(corners)
                }
                _ => geometry.measure(corners),
            };
            (geometry.jacobian_ratio(corners), volume)
        }
    };

    let ranges = &options.ranges;
    Ok(QualityRecord {
        element_id,
        element_type,
        aspect_ratio,
        skewness,
        jacobian,
        orthogonality,
        edge_ratio,
        volume,
        is_poor_aspect_ratio: !ranges.aspect_ratio.contains(aspect_ratio),
        is_poor_skewness: !ranges.skewness.contains(skewness),
        is_poor_orthogonality: !ranges.orthogonality.contains(orthogonality),
        is_poor_edge_ratio: !ranges.edge_ratio.contains(edge_ratio),
        is_negative_jacobian: jacobian <= 0.0,
        is_zero_volume: volume.abs() < ZERO_VOLUME_TOL,
    })
}

/// Compute quality records for all elements, one per element, in order.
///
/// # Errors
///
/// Returns an error if an element references a node id outside `nodes` or
/// has fewer nodes than its type's corners.
pub fn compute(
    nodes: &[Node],
    elements: &[Element],
    options: &QualityOptions,
) -> Result<Vec<QualityRecord>> {
    elements
        .par_iter()
        .map(|element| {
            let coords = gather_coords(nodes, element)?;
            compute_element(element.id, element.element_type, &coords, options)
        })
        .collect()
}

fn gather_coords(nodes: &[Node], element: &Element) -> Result<Vec<Point3>> {
    element
        .connectivity
        .iter()
        .map(|&id| {
            id.checked_sub(1)
                .and_then(|idx| nodes.get(idx))
                .map(|n| n.coordinates)
                .ok_or(Error::InvalidNodeReference {
                    element: element.id,
                    node: id,
                    n_nodes: nodes.len(),
                })
        })
        .collect()
}

/// |cos| of the angle between `normal` and `v`, 0 if either is degenerate.
fn alignment(normal: &Vec3, v: &Vec3) -> f64 {
    let scale = normal.norm() * v.norm();
    if scale < LENGTH_EPS * LENGTH_EPS {
        return 0.0;
    }
    (normal.dot(v).abs() / scale).min(1.0)
}

/// Worst face alignment, see [`OrthogonalityMethod::Geometric`].
///
/// For 2D shapes the faces are edges and their normals lie in the element
/// plane. Lines are always orthogonal.
pub fn geometric_orthogonality(shape: Shape, corners: &[Point3]) -> f64 {
    let geometry = shape.geometry();
    let center = centroid(corners);

    match shape.dimension() {
        1 => 1.0,
        2 => {
            let plane = newell_normal(corners);
            if plane.norm() < LENGTH_EPS {
                return 0.0;
            }
            geometry
                .faces()
                .iter()
                .map(|face| {
                    let (a, b) = (corners[face[0]], corners[face[1]]);
                    let normal = (b - a).cross(&plane);
                    alignment(&normal, &((a + b) / 2.0 - center))
                })
                .fold(1.0, f64::min)
        }
        _ => geometry
            .faces()
            .iter()
            .map(|face| {
                let polygon: Vec<Point3> = face.iter().map(|&i| corners[i]).collect();
                let normal = newell_normal(&polygon);
                alignment(&normal, &(centroid(&polygon) - center))
            })
            .fold(1.0, f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_unit_cube_record() {
        let r = compute_element(1, ElementType::Hex8, &unit_cube(), &QualityOptions::default()).unwrap();
        assert_relative_eq!(r.aspect_ratio, 1.0);
        assert_relative_eq!(r.edge_ratio, 1.0);
        assert_relative_eq!(r.skewness, 0.0, epsilon = 1e-10);
        assert_relative_eq!(r.jacobian, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.volume, 1.0, epsilon = 1e-12);
        assert_eq!(r.orthogonality, PLACEHOLDER_ORTHOGONALITY);
        assert!(!r.has_issue());
    }

    #[test]
    fn test_geometric_orthogonality_ideal_shapes() {
        assert_relative_eq!(
            geometric_orthogonality(Shape::Hexahedron, &unit_cube()),
            1.0,
            epsilon = 1e-12
        );
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0),
        ];
        assert_relative_eq!(geometric_orthogonality(Shape::Triangle, &tri), 1.0, epsilon = 1e-12);
        let tet = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        assert_relative_eq!(geometric_orthogonality(Shape::Tetrahedron, &tet), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_geometric_orthogonality_sheared_quad() {
        let c = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let o = geometric_orthogonality(Shape::Quad, &c);
        assert!(o > 0.0 && o < 0.9, "orthogonality {o}");
    }

    #[test]
    fn test_hex_volume_methods() {
        let mut c = unit_cube();
        for p in &mut c[4..] {
            p.x += 1.0;
        }
        let approx = compute_element(1, ElementType::Hex8, &c, &QualityOptions::default()).unwrap();
        let exact = compute_element(
            1,
            ElementType::Hex8,
            &c,
            &QualityOptions {
                hex_volume: HexVolumeMethod::TetDecomposition,
                ..Default::default()
            },
        )
        .unwrap();
        assert_relative_eq!(approx.volume, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(exact.volume, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_flags() {
        let c = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let r = compute_element(7, ElementType::Tri3, &c, &QualityOptions::default()).unwrap();
        assert_eq!(r.element_id, 7);
        assert!(r.is_zero_volume);
        assert!(r.is_negative_jacobian);
        assert!(r.is_poor_aspect_ratio);
        assert!(r.is_poor_skewness);
        assert!(r.is_poor_edge_ratio);
    }

    #[test]
    fn test_quadratic_tet_uses_corners() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        // Mid-side nodes pushed far away must not affect the metrics
        let mut coords = corners.to_vec();
        coords.extend((0..6).map(|i| Point3::new(100.0 + i as f64, 0.0, 0.0)));

        let opts = QualityOptions::default();
        let linear = compute_element(1, ElementType::Tet4, &corners, &opts).unwrap();
        let quadratic = compute_element(1, ElementType::Tet10, &coords, &opts).unwrap();
        assert_relative_eq!(linear.volume, quadratic.volume);
        assert_relative_eq!(linear.aspect_ratio, quadratic.aspect_ratio);
    }

    #[test]
    fn test_compute_preserves_order() {
        let nodes: Vec<Node> = unit_cube()
            .into_iter()
            .enumerate()
            .map(|(i, p)| Node {
                id: i + 1,
                coordinates: p,
            })
            .collect();
        let elements = vec![
            Element {
                id: 1,
                element_type: ElementType::Hex8,
                connectivity: (1..=8).collect(),
            },
            Element {
                id: 2,
                element_type: ElementType::Tet4,
                connectivity: vec![1, 2, 4, 5],
            },
            Element {
                id: 3,
                element_type: ElementType::Quad4,
                connectivity: vec![1, 2, 3, 4],
            },
        ];
        let records = compute(&nodes, &elements, &QualityOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.element_id, i + 1);
        }
        assert_relative_eq!(records[1].volume, 1.0 / 6.0, epsilon = 1e-14);
        assert_relative_eq!(records[2].volume, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_compute_rejects_missing_node() {
        let nodes = vec![Node {
            id: 1,
            coordinates: Point3::zeros(),
        }];
        let elements = vec![Element {
            id: 1,
            element_type: ElementType::Line2,
            connectivity: vec![1, 2],
        }];
        let result = compute(&nodes, &elements, &QualityOptions::default());
        assert!(matches!(result, Err(Error::InvalidNodeReference { node: 2, .. })));
    }

    #[test]
    fn test_compute_element_rejects_short_coords() {
        let c = unit_cube();
        let result = compute_element(4, ElementType::Tet4, &c[..3], &QualityOptions::default());
        assert!(matches!(result, Err(Error::MalformedMesh(_))));
    }

    #[test]
    fn test_downward_surface_facet_is_positive() {
        let c = unit_cube();
        let opts = QualityOptions::default();
        // Base face wound so its normal points out of the cube (-z)
        let base = [c[0], c[3], c[2], c[1]];
        let r = compute_element(2, ElementType::SurfaceQuad4, &base, &opts).unwrap();
        assert_relative_eq!(r.jacobian, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.volume, 1.0, epsilon = 1e-12);
        assert!(!r.is_negative_jacobian);

        let tri = compute_element(3, ElementType::SurfaceTri3, &[c[0], c[2], c[1]], &opts).unwrap();
        assert!(tri.jacobian > 0.0);
        assert_relative_eq!(tri.volume, 0.5, epsilon = 1e-12);

        // The plane element keeps its orientation sign
        let plane = compute_element(4, ElementType::Quad4, &base, &opts).unwrap();
        assert!(plane.is_negative_jacobian);
    }
}
