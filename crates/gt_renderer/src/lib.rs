//! gridtrace renderer - CPU path tracing over a uniform grid.
//!
//! A Monte Carlo path tracer whose only acceleration structure is a
//! uniform voxel grid. Rays march the grid voxel by voxel, the first
//! confirmed hit ends the march, and every pixel's radiance is added into
//! a progressive accumulator one sample round at a time.

mod accumulator;
mod camera;
mod error;
mod grid;
mod hittable;
mod integrator;
mod material;
mod renderer;
mod sampling;
mod scene;
mod tonemap;
mod traversal;
mod triangle;

pub use accumulator::{Accumulator, Snapshot};
pub use camera::{Aperture, Camera, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use grid::{GridStats, UniformGrid};
pub use hittable::{HitRecord, Hittable, TriangleList};
pub use integrator::{trace_path, PathSample, PathState, SURFACE_EPSILON};
pub use material::{fresnel_schlick, reflect, scatter, Scatter};
pub use renderer::{Checkpoint, RenderConfig, Renderer};
pub use sampling::{random_cosine_direction, stream_rng, stream_seed};
pub use scene::Scene;
pub use tonemap::{
    change_luminance, color_to_rgb8, linear_to_gamma, luminance, reinhard,
    reinhard_extended_luminance, ToneMap,
};
pub use traversal::{GridWalker, VoxelVisit};
pub use triangle::{intersect_triangle, TriangleHit, INTERSECT_EPSILON};

/// Re-export common math types from gt_math
pub use gt_math::{Aabb, Color, Interval, Ray, Vec3};
