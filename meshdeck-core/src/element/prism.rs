//! Triangular prism (wedge) cells.
//!
//! Corner ordering: bottom triangle `0-1-2` counter-clockwise seen from the
//! top triangle `3-4-5`, with node `i + 3` above node `i`.

use crate::element::{face_angle_skewness, scaled_corner_jacobian, ShapeGeometry};
use crate::types::{tet_signed_volume, Point3};

/// Scaled corner Jacobian of a right prism over an equilateral triangle: sin 60°.
const IDEAL_CORNER: f64 = 0.866_025_403_784_438_6;

const CORNER_NEIGHBOURS: [[usize; 3]; 6] = [
    [1, 2, 3],
    [2, 0, 4],
    [0, 1, 5],
    [5, 4, 0],
    [3, 5, 1],
    [4, 3, 2],
];

const TETS: [[usize; 4]; 3] = [[0, 1, 2, 5], [0, 1, 5, 4], [0, 4, 5, 3]];

/// 6-node prism geometry (15-node prisms use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Prism;

impl ShapeGeometry for Prism {
    fn n_corners(&self) -> usize {
        6
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[
            [0, 1],
            [1, 2],
            [2, 0],
            [3, 4],
            [4, 5],
            [5, 3],
            [0, 3],
            [1, 4],
            [2, 5],
        ]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[
            &[0, 2, 1],
            &[3, 4, 5],
            &[0, 1, 4, 3],
            &[1, 2, 5, 4],
            &[2, 0, 3, 5],
        ]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        face_angle_skewness(corners, self.faces())
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        CORNER_NEIGHBOURS
            .iter()
            .enumerate()
            .map(|(i, &n)| scaled_corner_jacobian(corners, i, n) / IDEAL_CORNER)
            .fold(f64::INFINITY, f64::min)
    }

    /// Sum of three signed tetrahedra.
    fn measure(&self, corners: &[Point3]) -> f64 {
        TETS.iter()
            .map(|&[a, b, c, d]| {
                tet_signed_volume(&corners[a], &corners[b], &corners[c], &corners[d])
            })
            .sum()
    }
}
