//! Triangle store shared read-only by every render worker.

use std::sync::Arc;

use gt_math::{Aabb, Vec2, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::material::Material;

/// Index into [`Mesh::materials`].
pub type MaterialId = usize;

/// A fully resolved triangle: positions, vertex normals, UVs and a material.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
    pub material: MaterialId,
}

impl Triangle {
    /// Flat-shaded triangle with zero UVs.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> Self {
        let n = Self::geometric_normal_of(v0, v1, v2);
        Self {
            positions: [v0, v1, v2],
            normals: [n; 3],
            uvs: [Vec2::ZERO; 3],
            material,
        }
    }

    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    fn geometric_normal_of(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
        (v1 - v0).cross(v2 - v0).normalize_or_zero()
    }

    /// Unit face normal following the vertex winding.
    pub fn geometric_normal(&self) -> Vec3 {
        let [v0, v1, v2] = self.positions;
        Self::geometric_normal_of(v0, v1, v2)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing(self.positions)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.positions[0] + self.positions[1] + self.positions[2]) / 3.0
    }

    /// Shading normal at barycentric (u, v): the re-normalized blend of the
    /// vertex normals with weights (1-u-v, u, v).
    pub fn normal_at(&self, u: f32, v: f32) -> Vec3 {
        let w = 1.0 - u - v;
        let n = self.normals[0] * w + self.normals[1] * u + self.normals[2] * v;
        let n = n.normalize_or_zero();
        if n == Vec3::ZERO {
            self.geometric_normal()
        } else {
            n
        }
    }

    /// Texture coordinate at barycentric (u, v).
    pub fn uv_at(&self, u: f32, v: f32) -> Vec2 {
        let w = 1.0 - u - v;
        self.uvs[0] * w + self.uvs[1] * u + self.uvs[2] * v
    }
}

/// Triangles plus the materials they reference.
#[derive(Clone, Debug)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    materials: Vec<Arc<Material>>,
    bounds: Aabb,
}

impl Mesh {
    /// Assemble a mesh, checking that every material reference resolves.
    pub fn new(triangles: Vec<Triangle>, materials: Vec<Arc<Material>>) -> SceneResult<Self> {
        if let Some((index, tri)) = triangles
            .iter()
            .enumerate()
            .find(|(_, t)| t.material >= materials.len())
        {
            return Err(SceneError::UnresolvedMaterial {
                triangle: index,
                material: tri.material,
                available: materials.len(),
            });
        }

        let bounds = Aabb::enclosing(triangles.iter().flat_map(|t| t.positions));

        Ok(Self {
            triangles,
            materials,
            bounds,
        })
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    /// Material of a triangle. References were validated in [`Mesh::new`].
    #[inline]
    pub fn material_of(&self, triangle: &Triangle) -> &Material {
        &self.materials[triangle.material]
    }

    /// Bounding box over all vertices. Empty for an empty mesh.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
