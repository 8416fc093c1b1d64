// Re-export glam for convenience
pub use glam::*;

// gridtrace math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Linear RGB color (values typically 0-1, emissive values may exceed 1).
pub type Color = Vec3;
