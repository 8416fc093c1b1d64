//! Render-time scene: a mesh plus the grid built over it.

use gt_core::{Mesh, SceneResult};
use gt_math::{Interval, Ray};

use crate::grid::UniformGrid;
use crate::hittable::{HitRecord, Hittable};

/// Immutable mesh and its scene index, shared read-only by all workers.
pub struct Scene {
    mesh: Mesh,
    grid: UniformGrid,
}

impl Scene {
    /// Build the grid over `mesh` with `desired_cells` along the longest axis.
    pub fn new(mesh: Mesh, desired_cells: u32) -> SceneResult<Self> {
        let grid = UniformGrid::build(&mesh, desired_cells)?;
        Ok(Self { mesh, grid })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }
}

impl Hittable for Scene {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.grid.closest_hit(&self.mesh, ray, ray_t)
    }
}
