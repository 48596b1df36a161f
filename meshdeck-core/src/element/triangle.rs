//! Triangle cells (plane elements and 3D surface conditions).
//!
//! # Orientation
//!
//! The signed area is the cross-product area carrying the sign of its z
//! component. For triangles in the xy-plane this is exactly the shoelace
//! formula: counter-clockwise ordering is positive. Triangles whose normal
//! lies in the xy-plane (vertical surfaces) are reported as positive.
//!
//! Surface conditions in 3D have no preferred side, so the facet metrics
//! ([`Triangle::facet_area`], [`Triangle::facet_jacobian_ratio`]) are
//! unsigned and only vanish for a degenerate facet.

use crate::element::{angle_skewness, ShapeGeometry};
use crate::types::Point3;

/// Area of the equilateral triangle with unit edge: √3/4.
const EQUILATERAL_AREA: f64 = 0.433_012_701_892_219_3;

/// 3-node triangle geometry (6-node triangles use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle;

/// Signed area of the triangle (a, b, c).
pub fn signed_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let n = (b - a).cross(&(c - a));
    let area = 0.5 * n.norm();
    if n.z < 0.0 {
        -area
    } else {
        area
    }
}

impl Triangle {
    /// Unsigned area, for boundary facets.
    pub fn facet_area(&self, corners: &[Point3]) -> f64 {
        0.5 * (corners[1] - corners[0]).cross(&(corners[2] - corners[0])).norm()
    }

    /// Unsigned area over the equilateral area for the mean edge length.
    pub fn facet_jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        let a = self.mean_edge_length(corners);
        let ideal = EQUILATERAL_AREA * a * a;
        if ideal <= 0.0 {
            return 0.0;
        }
        self.facet_area(corners) / ideal
    }
}

impl ShapeGeometry for Triangle {
    fn n_corners(&self) -> usize {
        3
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[[0, 1], [1, 2], [2, 0]]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[&[0, 1], &[1, 2], &[2, 0]]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        angle_skewness(&corners[..3], 60.0)
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        let a = self.mean_edge_length(corners);
        let ideal = EQUILATERAL_AREA * a * a;
        if ideal <= 0.0 {
            return 0.0;
        }
        self.measure(corners) / ideal
    }

    fn measure(&self, corners: &[Point3]) -> f64 {
        signed_area(&corners[0], &corners[1], &corners[2])
    }
}
