//! gridtrace core - triangle store, materials and scene loading.
//!
//! This crate provides:
//!
//! - **Mesh store**: `Triangle` (positions, vertex normals, UVs, material
//!   reference) and `Mesh`, validated once and read-only afterwards
//! - **Materials**: six `Channel`s per `Material`, each backed by a
//!   `Sampler` (constant or texture)
//! - **Loading**: OBJ/MTL scenes via `tobj`, textures via `image`
//!
//! # Example
//!
//! ```ignore
//! use gt_core::load_obj;
//!
//! let mesh = load_obj("scene.obj")?;
//! println!("Loaded {} triangles", mesh.len());
//! ```

pub mod error;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod texture;

// Re-export commonly used types
pub use error::{SceneError, SceneResult};
pub use material::{Channel, Constant, Material, Sampler, ShadingParams};
pub use mesh::{MaterialId, Mesh, Triangle};
pub use obj::load_obj;
pub use texture::{Texture, TextureCache, TextureError};
