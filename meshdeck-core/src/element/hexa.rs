//! Hexahedral cells.
//!
//! Corner ordering: bottom face `0-1-2-3` counter-clockwise seen from the
//! top face `4-5-6-7`, with node `i + 4` above node `i`.
//!
//! # Approximations
//!
//! - Aspect ratio uses six defining edges: the three edges leaving corner 0
//!   and the three edges leaving the opposite corner 6.
//! - [`measure`](ShapeGeometry::measure) is the product of the three edge
//!   lengths leaving corner 0. It is exact only for rectangular boxes and is
//!   always non-negative. [`exact_measure`](ShapeGeometry::exact_measure)
//!   sums six signed tetrahedra around the 0-6 diagonal instead.

use crate::element::{face_angle_skewness, scaled_corner_jacobian, ShapeGeometry};
use crate::types::{tet_signed_volume, Point3};

/// Edge neighbours of each corner, ordered so that a valid hexahedron has
/// positive determinant at every corner.
const CORNER_NEIGHBOURS: [[usize; 3]; 8] = [
    [1, 3, 4],
    [2, 0, 5],
    [3, 1, 6],
    [0, 2, 7],
    [7, 5, 0],
    [4, 6, 1],
    [5, 7, 2],
    [6, 4, 3],
];

/// Six tetrahedra sharing the 0-6 diagonal.
const DIAGONAL_TETS: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
    [0, 5, 1, 6],
];

/// 8-node hexahedron geometry (20/27-node hexahedra use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Hexahedron;

impl ShapeGeometry for Hexahedron {
    fn n_corners(&self) -> usize {
        8
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[[0, 1], [0, 3], [0, 4], [6, 5], [6, 7], [6, 2]]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[
            &[0, 3, 2, 1],
            &[4, 5, 6, 7],
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[3, 0, 4, 7],
        ]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        face_angle_skewness(corners, self.faces())
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        CORNER_NEIGHBOURS
            .iter()
            .enumerate()
            .map(|(i, &n)| scaled_corner_jacobian(corners, i, n))
            .fold(f64::INFINITY, f64::min)
    }

    fn measure(&self, corners: &[Point3]) -> f64 {
        let a = (corners[1] - corners[0]).norm();
        let b = (corners[3] - corners[0]).norm();
        let c = (corners[4] - corners[0]).norm();
        a * b * c
    }

    fn exact_measure(&self, corners: &[Point3]) -> f64 {
        DIAGONAL_TETS
            .iter()
            .map(|&[a, b, c, d]| {
                tet_signed_volume(&corners[a], &corners[b], &corners[c], &corners[d])
            })
            .sum()
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
    fn test_unit_cube_is_ideal() {
        let c = unit_cube();
        assert_relative_eq!(Hexahedron.aspect_ratio(&c), 1.0);
        assert_relative_eq!(Hexahedron.skewness(&c), 0.0, epsilon = 1e-10);
        assert_relative_eq!(Hexahedron.jacobian_ratio(&c), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Hexahedron.measure(&c), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Hexahedron.exact_measure(&c), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_box_volume() {
        let c: Vec<Point3> = unit_cube()
            .iter()
            .map(|p| Point3::new(2.0 * p.x, 3.0 * p.y, 0.5 * p.z))
            .collect();
        assert_relative_eq!(Hexahedron.measure(&c), 3.0, epsilon = 1e-12);
        assert_relative_eq!(Hexahedron.exact_measure(&c), 3.0, epsilon = 1e-12);
        assert_relative_eq!(Hexahedron.aspect_ratio(&c), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sheared_hex_edge_product_overestimates() {
        // Top face shifted by one unit in x: volume stays 1
        let mut c = unit_cube();
        for p in &mut c[4..] {
            p.x += 1.0;
        }
        assert_relative_eq!(Hexahedron.exact_measure(&c), 1.0, epsilon = 1e-12);
        assert_relative_eq!(Hexahedron.measure(&c), 2.0_f64.sqrt(), epsilon = 1e-12);
        assert!(Hexahedron.skewness(&c) > 0.4);
        assert!(Hexahedron.jacobian_ratio(&c) > 0.0);
    }

    #[test]
    fn test_mirrored_hex_is_inverted() {
        let c: Vec<Point3> = unit_cube()
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect();
        assert!(Hexahedron.jacobian_ratio(&c) < 0.0);
        assert!(Hexahedron.exact_measure(&c) < 0.0);
        // Edge product cannot detect inversion
        assert!(Hexahedron.measure(&c) > 0.0);
    }
}
