//! Pyramid cells.
//!
//! Corner ordering: square base `0-1-2-3` counter-clockwise seen from the
//! apex `4`. Only the four base corners carry a Jacobian; the apex joins
//! four edges and has no unique 3x3 edge frame.

use crate::element::{face_angle_skewness, scaled_corner_jacobian, ShapeGeometry};
use crate::types::{tet_signed_volume, Point3};
use std::f64::consts::FRAC_1_SQRT_2;

const BASE_NEIGHBOURS: [[usize; 3]; 4] = [[1, 3, 4], [2, 0, 4], [3, 1, 4], [0, 2, 4]];

/// 5-node pyramid geometry (13-node pyramids use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Pyramid;

impl ShapeGeometry for Pyramid {
    fn n_corners(&self) -> usize {
        5
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[
            [0, 1],
            [1, 2],
            [2, 3],
            [3, 0],
            [0, 4],
            [1, 4],
            [2, 4],
            [3, 4],
        ]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        face_angle_skewness(corners, self.faces())
    }

    /// Normalized so the regular pyramid (all edges equal) scores 1.
    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        BASE_NEIGHBOURS
            .iter()
            .enumerate()
            .map(|(i, &n)| scaled_corner_jacobian(corners, i, n) / FRAC_1_SQRT_2)
            .fold(f64::INFINITY, f64::min)
    }

    /// Sum of the tetrahedra (0, 1, 2, 4) and (0, 2, 3, 4).
    fn measure(&self, corners: &[Point3]) -> f64 {
        tet_signed_volume(&corners[0], &corners[1], &corners[2], &corners[4])
            + tet_signed_volume(&corners[0], &corners[2], &corners[3], &corners[4])
    }
}
