//! Line (bar/truss/anchor) cells.
//!
//! A line has no angles and no cross-section, so its shape metrics are
//! trivially ideal unless the two end nodes coincide.

use crate::element::ShapeGeometry;
use crate::types::{Point3, LENGTH_EPS};

/// 2-node line geometry (quadratic lines use the two end nodes).
#[derive(Debug, Clone, Copy, Default)]
pub struct Line;

impl ShapeGeometry for Line {
    fn n_corners(&self) -> usize {
        2
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[[0, 1]]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[&[0], &[1]]
    }

    fn skewness(&self, _corners: &[Point3]) -> f64 {
        0.0
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        if self.measure(corners) < LENGTH_EPS {
            0.0
        } else {
            1.0
        }
    }

    fn measure(&self, corners: &[Point3]) -> f64 {
        (corners[1] - corners[0]).norm()
    }
}
