//! Uniform grid scene index.
//!
//! The scene bounding box is cut into cubic voxels. Each voxel lists the
//! triangles whose bounding boxes overlap it. Lists are stored in one flat
//! array addressed through per-voxel offsets, built in two passes (count,
//! then fill) since voxel contents never change after construction.

use gt_core::{Mesh, SceneError, SceneResult};
use gt_math::{Aabb, Vec3};

/// Triangle boxes are grown by this fraction of a cell before assignment,
/// so triangles lying exactly on a voxel boundary land on both sides.
const ASSIGN_PADDING: f32 = 1e-4;

/// Occupancy figures gathered during the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStats {
    pub voxels: usize,
    pub empty_voxels: usize,
    pub references: usize,
    pub max_per_voxel: usize,
}

/// A uniform voxel grid over a triangle mesh.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    bounds: Aabb,
    cell_size: f32,
    dims: [usize; 3],
    /// `offsets[i]..offsets[i + 1]` is voxel i's range in `triangles`.
    offsets: Vec<usize>,
    triangles: Vec<u32>,
}

impl UniformGrid {
    /// Build the grid over every triangle of `mesh`.
    ///
    /// The cell size is the longest bounding-box extent divided by
    /// `desired_cells`; the box is then snapped outward to whole cells.
    pub fn build(mesh: &Mesh, desired_cells: u32) -> SceneResult<Self> {
        if mesh.is_empty() {
            return Err(SceneError::EmptyScene);
        }
        if desired_cells == 0 {
            return Err(SceneError::InvalidCellCount);
        }

        let scene_bounds = mesh.bounds();
        let extent = scene_bounds.extent();
        if !extent.is_finite() || !scene_bounds.min().is_finite() {
            return Err(SceneError::DegenerateBounds {
                extent: extent.to_array(),
            });
        }

        let longest = extent[scene_bounds.longest_axis()];
        let cell_size = longest / desired_cells as f32;
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(SceneError::ZeroCellSize(cell_size));
        }

        let min = (scene_bounds.min() / cell_size).floor() * cell_size;
        let max = (scene_bounds.max() / cell_size).ceil() * cell_size;
        let cells = ((max - min) / cell_size).round().max(Vec3::ONE);
        let dims = [cells.x as usize, cells.y as usize, cells.z as usize];
        // Flat axes still get one full cell.
        let max = min + cells * cell_size;

        let voxel_count = dims[0]
            .checked_mul(dims[1])
            .and_then(|n| n.checked_mul(dims[2]))
            .ok_or(SceneError::AllocationFailed {
                what: "voxel grid",
                count: usize::MAX,
            })?;

        let mut grid = Self {
            bounds: Aabb::from_points(min, max),
            cell_size,
            dims,
            offsets: Vec::new(),
            triangles: Vec::new(),
        };
        grid.assign(mesh, voxel_count)?;

        let stats = grid.stats();
        log::info!(
            "Built {}x{}x{} grid (cell size {:.4}): {} triangles, {} references, {}/{} voxels empty, max {} per voxel",
            dims[0],
            dims[1],
            dims[2],
            cell_size,
            mesh.len(),
            stats.references,
            stats.empty_voxels,
            stats.voxels,
            stats.max_per_voxel
        );

        Ok(grid)
    }

    /// Two-pass conservative assignment of triangles to voxels.
    fn assign(&mut self, mesh: &Mesh, voxel_count: usize) -> SceneResult<()> {
        let mut counts = try_alloc::<usize>(voxel_count + 1, "voxel offsets")?;
        counts.resize(voxel_count + 1, 0);

        // Pass 1: count references per voxel.
        for tri in mesh.triangles() {
            let (lo, hi) = self.voxel_range(&tri.bounds());
            self.for_each_cell(lo, hi, |cell| counts[cell] += 1);
        }

        // Exclusive prefix sum turns counts into start offsets.
        let mut total = 0usize;
        for slot in counts.iter_mut() {
            let n = *slot;
            *slot = total;
            total += n;
        }

        // Pass 2: fill the flat array through per-voxel cursors.
        let mut triangles = try_alloc::<u32>(total, "voxel triangle references")?;
        triangles.resize(total, 0);
        let mut cursor = counts[..voxel_count].to_vec();
        for (index, tri) in mesh.triangles().iter().enumerate() {
            let (lo, hi) = self.voxel_range(&tri.bounds());
            self.for_each_cell(lo, hi, |cell| {
                triangles[cursor[cell]] = index as u32;
                cursor[cell] += 1;
            });
        }

        self.offsets = counts;
        self.triangles = triangles;
        Ok(())
    }

    /// Inclusive voxel coordinate range covered by a (padded) box.
    fn voxel_range(&self, bounds: &Aabb) -> ([usize; 3], [usize; 3]) {
        let pad = Vec3::splat(self.cell_size * ASSIGN_PADDING);
        (
            self.voxel_coord(bounds.min() - pad),
            self.voxel_coord(bounds.max() + pad),
        )
    }

    fn for_each_cell(&self, lo: [usize; 3], hi: [usize; 3], mut f: impl FnMut(usize)) {
        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                for x in lo[0]..=hi[0] {
                    f(self.cell_index([x, y, z]));
                }
            }
        }
    }

    /// Voxel containing `p`: `floor((p - min) / cell_size)`, clamped to
    /// the grid so boundary points on the max faces stay addressable.
    pub fn voxel_coord(&self, p: Vec3) -> [usize; 3] {
        let rel = ((p - self.bounds.min()) / self.cell_size).floor();
        let clamp = |v: f32, dim: usize| -> usize {
            if v.is_nan() || v < 0.0 {
                0
            } else {
                (v as usize).min(dim - 1)
            }
        };
        [
            clamp(rel.x, self.dims[0]),
            clamp(rel.y, self.dims[1]),
            clamp(rel.z, self.dims[2]),
        ]
    }

    /// Row-major (x fastest) voxel index.
    #[inline]
    pub fn cell_index(&self, coord: [usize; 3]) -> usize {
        (coord[2] * self.dims[1] + coord[1]) * self.dims[0] + coord[0]
    }

    /// Triangle indices listed in voxel `index`.
    #[inline]
    pub fn voxel(&self, index: usize) -> &[u32] {
        &self.triangles[self.offsets[index]..self.offsets[index + 1]]
    }

    pub fn voxel_at(&self, coord: [usize; 3]) -> &[u32] {
        self.voxel(self.cell_index(coord))
    }

    /// Snapped grid bounds (whole cells).
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn stats(&self) -> GridStats {
        let voxels = self.voxel_count();
        let mut empty_voxels = 0;
        let mut max_per_voxel = 0;
        for i in 0..voxels {
            let n = self.offsets[i + 1] - self.offsets[i];
            if n == 0 {
                empty_voxels += 1;
            }
            max_per_voxel = max_per_voxel.max(n);
        }
        GridStats {
            voxels,
            empty_voxels,
            references: self.triangles.len(),
            max_per_voxel,
        }
    }
}

fn try_alloc<T>(count: usize, what: &'static str) -> SceneResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(count)
        .map_err(|_| SceneError::AllocationFailed { what, count })?;
    Ok(v)
}
