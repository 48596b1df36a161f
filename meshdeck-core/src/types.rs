//! Core geometric types shared by the conversion and quality modules.
//!
//! This module defines:
//! - Geometric primitives (points, vectors)
//! - Axis-aligned bounds
//! - Small vector helpers used by the per-shape metric kernels

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = Vector3<f64>;

/// A 3D vector (edge, normal, etc.).
pub type Vec3 = Vector3<f64>;

/// Lengths below this are treated as coincident points.
pub const LENGTH_EPS: f64 = 1e-12;

/// Axis-aligned bounding box of a node set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Bounds {
    /// Compute bounds of a point cloud, `None` when empty.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = [first.x, first.y, first.z];
        let mut max = min;

        for p in iter {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some(Self { min, max })
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Arithmetic mean of a set of points.
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::zeros();
    }
    let sum = points.iter().fold(Point3::zeros(), |acc, p| acc + p);
    sum / points.len() as f64
}

/// Area-weighted normal of a (possibly non-planar) polygon via Newell's method.
///
/// The returned vector has magnitude equal to twice the polygon area and
/// follows the right-hand rule over the vertex order.
pub fn newell_normal(polygon: &[Point3]) -> Vec3 {
    let n = polygon.len();
    let mut normal = Vec3::zeros();
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Angle in degrees between two vectors, `None` if either is degenerate.
pub fn angle_deg(u: &Vec3, v: &Vec3) -> Option<f64> {
    let nu = u.norm();
    let nv = v.norm();
    if nu < LENGTH_EPS || nv < LENGTH_EPS {
        return None;
    }
    let cos = (u.dot(v) / (nu * nv)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Interior angles (degrees) of a polygon, `None` if any corner is degenerate.
pub fn polygon_angles(polygon: &[Point3]) -> Option<Vec<f64>> {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let prev = &polygon[(i + n - 1) % n];
            let next = &polygon[(i + 1) % n];
            angle_deg(&(prev - polygon[i]), &(next - polygon[i]))
        })
        .collect()
}

/// Signed volume of the tetrahedron (a, b, c, d): (b-a)·((c-a)×(d-a)) / 6.
pub fn tet_signed_volume(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds() {
        let pts = vec![
            Point3::new(-1.0, -2.0, -3.0),
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let b = Bounds::of(&pts).unwrap();
        assert_eq!(b.min, [-1.0, -2.0, -3.0]);
        assert_eq!(b.max, [1.0, 2.0, 3.0]);
        assert_eq!(b.size(), [2.0, 4.0, 6.0]);
        assert!(Bounds::of(&[]).is_none());
    }

    #[test]
    fn test_newell_normal_unit_square() {
        let sq = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = newell_normal(&sq);
        assert_relative_eq!(n.z, 2.0, epsilon = 1e-14);
        assert_relative_eq!(n.x, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_polygon_angles_square() {
        let sq = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        for a in polygon_angles(&sq).unwrap() {
            assert_relative_eq!(a, 90.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_degenerate_angle() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(angle_deg(&(p - p), &Vec3::x()).is_none());
    }

    #[test]
    fn test_tet_signed_volume_orientation() {
        let o = Point3::zeros();
        let x = Point3::x();
        let y = Point3::y();
        let z = Point3::z();
        assert_relative_eq!(tet_signed_volume(&o, &x, &y, &z), 1.0 / 6.0, epsilon = 1e-15);
        assert_relative_eq!(tet_signed_volume(&o, &y, &x, &z), -1.0 / 6.0, epsilon = 1e-15);
    }
}
