//! Incremental 3D grid traversal.
//!
//! Voxels along a ray are visited in strictly increasing ray-parameter
//! order, stepping each time along the axis whose next boundary crossing
//! is nearest. Because of this ordering, once the best hit so far lies
//! before the current voxel's exit the search can stop: no later voxel
//! can hold a nearer triangle.

use gt_core::Mesh;
use gt_math::{Interval, Ray};

use crate::grid::UniformGrid;
use crate::hittable::HitRecord;
use crate::triangle::intersect_triangle;

/// One voxel visited by a [`GridWalker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelVisit {
    pub coord: [usize; 3],
    pub index: usize,
    /// Ray parameters at which the ray enters and leaves the voxel.
    pub t: Interval,
}

/// Iterator over the voxels pierced by a ray, nearest first.
pub struct GridWalker<'g> {
    grid: &'g UniformGrid,
    coord: [usize; 3],
    step: [i64; 3],
    t_max: [f32; 3],
    t_delta: [f32; 3],
    t_enter: f32,
    t_end: f32,
    done: bool,
}

impl<'g> GridWalker<'g> {
    /// Start walking `ray` through `grid`, restricted to `ray_t`.
    ///
    /// Rays starting outside the grid are first clipped to its bounds. Axes
    /// the ray runs parallel to never step.
    pub fn new(grid: &'g UniformGrid, ray: &Ray, ray_t: Interval) -> Self {
        let span = grid.bounds().clip(ray, ray_t);

        let mut walker = Self {
            grid,
            coord: [0; 3],
            step: [0; 3],
            t_max: [f32::INFINITY; 3],
            t_delta: [f32::INFINITY; 3],
            t_enter: 0.0,
            t_end: 0.0,
            done: true,
        };

        let Some(span) = span else {
            return walker;
        };

        let coord = grid.voxel_coord(ray.at(span.min));
        let min = grid.bounds().min();
        let cell = grid.cell_size();

        for axis in 0..3 {
            let d = ray.direction[axis];
            let o = ray.origin[axis];
            if d > 0.0 {
                walker.step[axis] = 1;
                let boundary = min[axis] + (coord[axis] + 1) as f32 * cell;
                walker.t_max[axis] = (boundary - o) / d;
                walker.t_delta[axis] = cell / d;
            } else if d < 0.0 {
                walker.step[axis] = -1;
                let boundary = min[axis] + coord[axis] as f32 * cell;
                walker.t_max[axis] = (boundary - o) / d;
                walker.t_delta[axis] = -cell / d;
            }
        }

        walker.coord = coord;
        walker.t_enter = span.min;
        walker.t_end = span.max;
        walker.done = false;
        walker
    }

    fn next_axis(&self) -> usize {
        let t = &self.t_max;
        if t[0] <= t[1] && t[0] <= t[2] {
            0
        } else if t[1] <= t[2] {
            1
        } else {
            2
        }
    }
}

impl Iterator for GridWalker<'_> {
    type Item = VoxelVisit;

    fn next(&mut self) -> Option<VoxelVisit> {
        if self.done {
            return None;
        }

        let axis = self.next_axis();
        let t_exit = self.t_max[axis].min(self.t_end);
        let visit = VoxelVisit {
            coord: self.coord,
            index: self.grid.cell_index(self.coord),
            t: Interval::new(self.t_enter, t_exit.max(self.t_enter)),
        };

        // Advance; leaving the grid on any axis ends the walk.
        let dims = self.grid.dims();
        let next = self.coord[axis] as i64 + self.step[axis];
        if self.step[axis] == 0 || next < 0 || next >= dims[axis] as i64 || t_exit >= self.t_end {
            self.done = true;
        } else {
            self.coord[axis] = next as usize;
            self.t_enter = self.t_enter.max(self.t_max[axis]);
            self.t_max[axis] += self.t_delta[axis];
        }

        Some(visit)
    }
}

impl UniformGrid {
    /// Closest triangle hit along `ray` within `ray_t`.
    pub fn closest_hit(&self, mesh: &Mesh, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for visit in GridWalker::new(self, ray, ray_t) {
            if visit.t.min > closest_so_far {
                break;
            }

            for &index in self.voxel(visit.index) {
                let index = index as usize;
                if let Some(hit) = intersect_triangle(mesh.triangle(index), ray) {
                    if hit.t >= ray_t.min && hit.t < closest_so_far {
                        closest_so_far = hit.t;
                        closest = Some(HitRecord::new(index, hit));
                    }
                }
            }

            if closest.is_some() && closest_so_far <= visit.t.max {
                break;
            }
        }

        closest
    }
}
