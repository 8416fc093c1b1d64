//! Error types for rendering.

use gt_core::SceneError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("accumulator size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("camera resolution must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("camera focal length must be positive and finite, got {0}")]
    InvalidFocalLength(f32),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write snapshot {path}: {source}")]
    Snapshot {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
