//! Errors raised while assembling a renderable scene.
//!
//! Only scene construction and asset loading are allowed to fail. Numeric
//! degeneracies met during intersection or traversal are handled locally
//! and never show up here.

use thiserror::Error;

use crate::texture::TextureError;

/// Errors that can occur while loading a scene or building its index.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Triangle {triangle} references material {material}, but only {available} materials exist")]
    UnresolvedMaterial {
        triangle: usize,
        material: usize,
        available: usize,
    },

    #[error("Face {face} of '{model}' references vertex {index}, but only {available} exist")]
    UnresolvedVertex {
        model: String,
        face: usize,
        index: usize,
        available: usize,
    },

    #[error("Scene contains no triangles")]
    EmptyScene,

    #[error("Scene bounds are degenerate (extent {extent:?})")]
    DegenerateBounds { extent: [f32; 3] },

    #[error("Grid cell size is zero or not finite ({0})")]
    ZeroCellSize(f32),

    #[error("Desired cell count must be at least 1")]
    InvalidCellCount,

    #[error("Could not allocate {what} ({count} entries)")]
    AllocationFailed { what: &'static str, count: usize },

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),
}

pub type SceneResult<T> = Result<T, SceneError>;
