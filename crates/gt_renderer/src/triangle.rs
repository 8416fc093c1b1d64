//! Ray-triangle intersection.
//!
//! Uses the Möller-Trumbore algorithm. One epsilon serves both as the
//! parallel-ray rejection threshold and as the minimum accepted `t`, so
//! neighbouring triangles sharing an edge agree on what counts as a hit.

use gt_core::Triangle;
use gt_math::Ray;

/// Shared tolerance for the determinant test and the self-intersection guard.
pub const INTERSECT_EPSILON: f32 = 1e-6;

/// Ray parameter and barycentric coordinates of a ray-triangle hit.
///
/// The hit point is `w * v0 + u * v1 + v * v2` with `w = 1 - u - v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl TriangleHit {
    /// Weight of the first vertex.
    #[inline]
    pub fn w(&self) -> f32 {
        1.0 - self.u - self.v
    }
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Returns `None` for parallel rays, hits outside the triangle and hits at
/// or behind the ray origin.
pub fn intersect_triangle(tri: &Triangle, ray: &Ray) -> Option<TriangleHit> {
    let [v0, v1, v2] = tri.positions;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);

    // Ray is parallel to triangle
    if det.abs() < INTERSECT_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);
    if t <= INTERSECT_EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}
