//! Wavefront OBJ/MTL scene loading.
//!
//! Parsing is delegated to `tobj`; this module resolves its output into
//! [`Triangle`]s with explicit normals, UVs and material references.
//!
//! MTL keys understood besides the standard `Kd`/`Ks`:
//! `Ke`/`map_Ke` (emission, strength = largest component), `Pm`/`map_Pm`
//! (metallic), `Pr`/`map_Pr` (roughness) and `Ts` (specular tint).

use std::path::Path;
use std::sync::Arc;

use gt_math::{Color, Vec2, Vec3};

use crate::error::{SceneError, SceneResult};
use crate::material::{Channel, Material};
use crate::mesh::{Mesh, Triangle};
use crate::texture::TextureCache;

/// Load an OBJ file (and its MTL library, if any) into a [`Mesh`].
///
/// Textures are resolved relative to the OBJ file's directory.
pub fn load_obj(path: impl AsRef<Path>) -> SceneResult<Mesh> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let mut textures = match path.parent() {
        Some(dir) => TextureCache::with_base_dir(dir),
        None => TextureCache::new(),
    };

    let obj_materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable material library for {}: {}", path.display(), e);
        Vec::new()
    });

    let mut resolved = obj_materials
        .iter()
        .map(|m| convert_material(m, &mut textures).map(Arc::new))
        .collect::<SceneResult<Vec<_>>>()?;

    // Faces without usemtl share one fallback material appended at the end.
    let fallback = resolved.len();
    let mut needs_fallback = false;

    let mut triangles = Vec::new();
    for model in &models {
        let material = match model.mesh.material_id {
            Some(id) => id,
            None => {
                needs_fallback = true;
                fallback
            }
        };
        append_model(model, material, &mut triangles)?;
    }

    if needs_fallback {
        resolved.push(Arc::new(Material::default()));
    }
    if triangles.is_empty() {
        return Err(SceneError::EmptyScene);
    }

    log::info!(
        "Loaded {}: {} models, {} triangles, {} materials, {} textures",
        path.display(),
        models.len(),
        triangles.len(),
        resolved.len(),
        textures.len()
    );

    Mesh::new(triangles, resolved)
}

fn append_model(
    model: &tobj::Model,
    material: usize,
    triangles: &mut Vec<Triangle>,
) -> SceneResult<()> {
    let mesh = &model.mesh;
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() / 3 == vertex_count && vertex_count > 0;
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count && vertex_count > 0;

    if !has_normals {
        log::warn!("Model '{}' has no vertex normals, using face normals", model.name);
    }
    if !has_uvs {
        log::warn!("Model '{}' has no texture coordinates, using (0, 0)", model.name);
    }

    let position = |i: usize| {
        Vec3::new(
            mesh.positions[3 * i],
            mesh.positions[3 * i + 1],
            mesh.positions[3 * i + 2],
        )
    };
    let normal = |i: usize| {
        Vec3::new(
            mesh.normals[3 * i],
            mesh.normals[3 * i + 1],
            mesh.normals[3 * i + 2],
        )
    };
    let uv = |i: usize| Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]);

    for (face, corners) in mesh.indices.chunks_exact(3).enumerate() {
        let mut idx = [0usize; 3];
        for (slot, &index) in idx.iter_mut().zip(corners) {
            let index = index as usize;
            if index >= vertex_count {
                return Err(SceneError::UnresolvedVertex {
                    model: model.name.clone(),
                    face,
                    index,
                    available: vertex_count,
                });
            }
            *slot = index;
        }

        let mut tri = Triangle::new(
            position(idx[0]),
            position(idx[1]),
            position(idx[2]),
            material,
        );
        if has_normals {
            tri = tri.with_normals(idx.map(normal));
        }
        if has_uvs {
            tri = tri.with_uvs(idx.map(uv));
        }
        triangles.push(tri);
    }

    Ok(())
}

fn convert_material(m: &tobj::Material, textures: &mut TextureCache) -> SceneResult<Material> {
    let param = |key: &str| m.unknown_param.get(key).and_then(|s| parse_color(s));

    let mut material = Material::new(m.name.clone(), Color::splat(0.8));

    let emission = param("Ke").unwrap_or(Color::ZERO);
    let strength = emission.max_element();

    let diffuse = m.diffuse.map(Color::from_array).unwrap_or_else(|| {
        if strength > 0.0 {
            emission / strength
        } else {
            Color::splat(0.8)
        }
    });
    material.base_color = match texture_channel(textures, m.diffuse_texture.as_ref())? {
        Some(channel) => channel,
        None => Channel::constant(diffuse),
    };

    material.emissive = match texture_channel(textures, m.unknown_param.get("map_Ke"))? {
        Some(channel) => channel,
        None => Channel::scalar(strength),
    };

    material.specular = match texture_channel(textures, m.specular_texture.as_ref())? {
        Some(channel) => channel,
        None => {
            let level = m.specular.map(|s| Color::from_array(s).max_element());
            Channel::scalar(level.unwrap_or(0.0))
        }
    };

    if let Some(channel) = texture_channel(textures, m.unknown_param.get("map_Pm"))? {
        material.metallic = channel;
    } else if let Some(pm) = param("Pm") {
        material.metallic = Channel::scalar(pm.x);
    }

    if let Some(channel) = texture_channel(textures, m.unknown_param.get("map_Pr"))? {
        material.specular_roughness = channel;
    } else if let Some(pr) = param("Pr") {
        material.specular_roughness = Channel::scalar(pr.x);
    }

    if let Some(ts) = param("Ts") {
        material.specular_tint = Channel::constant(ts);
    }

    Ok(material)
}

fn texture_channel(
    cache: &mut TextureCache,
    file: Option<&String>,
) -> SceneResult<Option<Channel>> {
    file.map(|f| cache.load(f).map(Channel::texture))
        .transpose()
        .map_err(SceneError::from)
}

/// Parse "r g b" or a single "s" (broadcast to all channels).
fn parse_color(s: &str) -> Option<Color> {
    let values = s
        .split_whitespace()
        .map(str::parse::<f32>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match values.as_slice() {
        [s] => Some(Color::splat(*s)),
        [r, g, b] => Some(Color::new(*r, *g, *b)),
        _ => None,
    }
}
