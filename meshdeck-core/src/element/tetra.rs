//! Tetrahedral cells.
//!
//! Both skewness and the Jacobian ratio compare against the regular
//! tetrahedron whose edge is the element's mean edge length:
//!
//! V_ideal = (√2 / 12) · a³
//!
//! Skewness uses the signed volume, so an inverted element scores above 1.
//!
//! The Jacobian is the determinant of the edge-vector matrix
//! J = [p1 - p0, p2 - p0, p3 - p0], which equals six times the signed volume.

use crate::element::ShapeGeometry;
use crate::types::{tet_signed_volume, Point3};
use nalgebra::Matrix3;
use std::f64::consts::SQRT_2;

/// Volume of the regular tetrahedron with edge `a`.
pub fn regular_volume(a: f64) -> f64 {
    SQRT_2 / 12.0 * a.powi(3)
}

/// 4-node tetrahedron geometry (10-node tetrahedra use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tetrahedron;

impl Tetrahedron {
    /// Determinant of the edge-vector matrix from the first vertex.
    pub fn jacobian_determinant(corners: &[Point3]) -> f64 {
        let j = Matrix3::from_columns(&[
            corners[1] - corners[0],
            corners[2] - corners[0],
            corners[3] - corners[0],
        ]);
        j.determinant()
    }
}

impl ShapeGeometry for Tetrahedron {
    fn n_corners(&self) -> usize {
        4
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[2, 0, 3]]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        let ideal = regular_volume(self.mean_edge_length(corners));
        if ideal <= 0.0 {
            return 1.0;
        }
        (1.0 - self.measure(corners) / ideal).abs()
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        let ideal = regular_volume(self.mean_edge_length(corners));
        if ideal <= 0.0 {
            return 0.0;
        }
        Self::jacobian_determinant(corners) / (6.0 * ideal)
    }

    fn measure(&self, corners: &[Point3]) -> f64 {
        tet_signed_volume(&corners[0], &corners[1], &corners[2], &corners[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regular_tet() -> [Point3; 4] {
        [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ]
    }

    fn unit_tet() -> [Point3; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_regular_tet_is_ideal() {
        let c = regular_tet();
        // Edge length 2√2, volume 8/3
        assert_relative_eq!(Tetrahedron.measure(&c), 8.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(Tetrahedron.aspect_ratio(&c), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Tetrahedron.skewness(&c), 0.0, epsilon = 1e-12);
        assert_relative_eq!(Tetrahedron.jacobian_ratio(&c), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            Tetrahedron.measure(&c),
            regular_volume(2.0 * SQRT_2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unit_tet_volume() {
        let c = unit_tet();
        assert_relative_eq!(Tetrahedron.measure(&c), 1.0 / 6.0, epsilon = 1e-15);
        assert_relative_eq!(Tetrahedron::jacobian_determinant(&c), 1.0, epsilon = 1e-15);
        assert_relative_eq!(Tetrahedron.aspect_ratio(&c), SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_inverted_tet() {
        let [a, b, c, d] = unit_tet();
        let inverted = [a, c, b, d];
        assert_relative_eq!(Tetrahedron.measure(&inverted), -1.0 / 6.0, epsilon = 1e-15);
        assert!(Tetrahedron.jacobian_ratio(&inverted) < 0.0);
        // Signed volume: an inverted tet lies beyond the fully skewed limit
        let upright = Tetrahedron.skewness(&unit_tet());
        assert_relative_eq!(Tetrahedron.skewness(&inverted), 2.0 - upright, epsilon = 1e-12);
        assert!(Tetrahedron.skewness(&inverted) > 1.0);
    }

    #[test]
    fn test_flat_tet() {
        let c = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert_relative_eq!(Tetrahedron.measure(&c), 0.0, epsilon = 1e-15);
        assert_relative_eq!(Tetrahedron.jacobian_ratio(&c), 0.0, epsilon = 1e-15);
        assert_relative_eq!(Tetrahedron.skewness(&c), 1.0, epsilon = 1e-12);
    }
}
