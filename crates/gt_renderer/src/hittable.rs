//! Hittable trait and HitRecord for ray-scene intersection.

use gt_core::Mesh;
use gt_math::{Interval, Ray};

use crate::triangle::{intersect_triangle, TriangleHit};

/// Record of the closest ray-triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Index of the hit triangle in the mesh
    pub triangle: usize,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Barycentric coordinates (weights of vertices 1 and 2)
    pub u: f32,
    pub v: f32,
}

impl HitRecord {
    pub fn new(triangle: usize, hit: TriangleHit) -> Self {
        Self {
            triangle,
            t: hit.t,
            u: hit.u,
            v: hit.v,
        }
    }
}

/// Anything that can report the closest triangle hit along a ray.
///
/// Misses are reported as `None`; degenerate rays never produce errors.
pub trait Hittable: Send + Sync {
    /// Closest hit with `t` inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

/// Exhaustive search over every triangle of a mesh.
///
/// Reference implementation for validating accelerated structures.
pub struct TriangleList<'a> {
    mesh: &'a Mesh,
}

impl<'a> TriangleList<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self { mesh }
    }
}

impl Hittable for TriangleList<'_> {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for (index, tri) in self.mesh.triangles().iter().enumerate() {
            if let Some(hit) = intersect_triangle(tri, ray) {
                if hit.t >= ray_t.min && hit.t < closest_so_far {
                    closest_so_far = hit.t;
                    closest = Some(HitRecord::new(index, hit));
                }
            }
        }

        closest
    }
}
