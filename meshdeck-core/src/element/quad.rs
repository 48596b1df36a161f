//! Quadrilateral cells (plane elements and 3D surface conditions).
//!
//! The Jacobian ratio is the minimum scaled corner Jacobian, measured
//! against the quad's average normal oriented towards +z (the same sign
//! convention as [`triangle::signed_area`](super::triangle::signed_area)).
//!
//! Surface conditions are measured against their own Newell normal instead
//! ([`Quadrilateral::facet_jacobian_ratio`]), so a facet is positive whichever
//! way it faces and only a folded or degenerate facet drops to zero or below.

use crate::element::triangle::signed_area;
use crate::element::{angle_skewness, ShapeGeometry};
use crate::types::{newell_normal, Point3, Vec3, LENGTH_EPS};

/// 4-node quadrilateral geometry (8/9-node quads use their corners).
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadrilateral;

/// Unit reference normal: the Newell normal flipped to non-negative z.
fn reference_normal(corners: &[Point3]) -> Vec3 {
    let n = newell_normal(&corners[..4]);
    let len = n.norm();
    if len < LENGTH_EPS {
        return Vec3::z();
    }
    let n = n / len;
    if n.z < 0.0 {
        -n
    } else {
        n
    }
}

/// Minimum scaled corner Jacobian against `normal`.
fn min_corner_jacobian(corners: &[Point3], normal: &Vec3) -> f64 {
    (0..4)
        .map(|i| {
            let e1 = corners[(i + 1) % 4] - corners[i];
            let e2 = corners[(i + 3) % 4] - corners[i];
            let scale = e1.norm() * e2.norm();
            if scale < LENGTH_EPS * LENGTH_EPS {
                0.0
            } else {
                e1.cross(&e2).dot(normal) / scale
            }
        })
        .fold(f64::INFINITY, f64::min)
}

impl Quadrilateral {
    /// Area from the Newell normal, for boundary facets. Never negative.
    pub fn facet_area(&self, corners: &[Point3]) -> f64 {
        0.5 * newell_normal(&corners[..4]).norm()
    }

    /// Minimum scaled corner Jacobian against the facet's own normal.
    pub fn facet_jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        let n = newell_normal(&corners[..4]);
        let len = n.norm();
        if len < LENGTH_EPS {
            return 0.0;
        }
        min_corner_jacobian(corners, &(n / len))
    }
}

impl ShapeGeometry for Quadrilateral {
    fn n_corners(&self) -> usize {
        4
    }

    fn edges(&self) -> &'static [[usize; 2]] {
        &[[0, 1], [1, 2], [2, 3], [3, 0]]
    }

    fn faces(&self) -> &'static [&'static [usize]] {
        &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]]
    }

    fn skewness(&self, corners: &[Point3]) -> f64 {
        angle_skewness(&corners[..4], 90.0)
    }

    fn jacobian_ratio(&self, corners: &[Point3]) -> f64 {
        min_corner_jacobian(corners, &reference_normal(corners))
    }

    /// Sum of the triangles (0, 1, 2) and (0, 2, 3).
    fn measure(&self, corners: &[Point3]) -> f64 {
        signed_area(&corners[0], &corners[1], &corners[2])
            + signed_area(&corners[0], &corners[2], &corners[3])
    }
}
