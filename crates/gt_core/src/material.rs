//! Surface materials built from six independently sampled channels.
//!
//! Every channel is a [`Sampler`]: either a constant or a texture lookup.
//! Scalar channels (metallic, specular, roughness) read the red component
//! of whatever their sampler returns. Emission strength is the largest
//! component instead, so a colored emission map lights up on any channel.

use std::fmt;
use std::sync::Arc;

use gt_math::{Color, Vec2};

use crate::texture::Texture;

/// Capability to produce a linear color for a surface UV.
pub trait Sampler: Send + Sync {
    fn sample(&self, uv: Vec2) -> Color;

    /// Single-channel read used by scalar material parameters.
    fn sample_scalar(&self, uv: Vec2) -> f32 {
        self.sample(uv).x
    }
}

/// A sampler returning the same color everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub Color);

impl Sampler for Constant {
    #[inline]
    fn sample(&self, _uv: Vec2) -> Color {
        self.0
    }

    #[inline]
    fn sample_scalar(&self, _uv: Vec2) -> f32 {
        self.0.x
    }
}

impl Sampler for Texture {
    fn sample(&self, uv: Vec2) -> Color {
        Texture::sample(self, uv)
    }
}

/// One shading input of a material.
#[derive(Clone)]
pub struct Channel(Arc<dyn Sampler>);

impl Channel {
    pub fn constant(color: Color) -> Self {
        Self(Arc::new(Constant(color)))
    }

    pub fn scalar(value: f32) -> Self {
        Self::constant(Color::splat(value))
    }

    pub fn texture(texture: Arc<Texture>) -> Self {
        Self(texture)
    }

    pub fn from_sampler(sampler: Arc<dyn Sampler>) -> Self {
        Self(sampler)
    }

    #[inline]
    pub fn color(&self, uv: Vec2) -> Color {
        self.0.sample(uv)
    }

    #[inline]
    pub fn value(&self, uv: Vec2) -> f32 {
        self.0.sample_scalar(uv)
    }

    /// Largest color component at `uv`.
    #[inline]
    pub fn strength(&self, uv: Vec2) -> f32 {
        self.0.sample(uv).max_element()
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Channel(..)")
    }
}

/// A named surface material.
///
/// Immutable once the scene is loaded; shared between triangles by index.
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name (from the MTL file or the caller)
    pub name: String,

    /// Diffuse albedo, also the emission color for lights
    pub base_color: Channel,

    /// Probability of forcing a mirror bounce (0=dielectric, 1=metal)
    pub metallic: Channel,

    /// Emission strength; anything above zero turns the surface into a light
    pub emissive: Channel,

    /// Specular level (0=no Fresnel reflection, 1=strong)
    pub specular: Channel,

    /// Blend between mirror (0) and the sampled direction (1)
    pub specular_roughness: Channel,

    /// Tint applied to throughput on specular bounces
    pub specular_tint: Channel,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            base_color: Channel::constant(Color::splat(0.8)),
            metallic: Channel::scalar(0.0),
            emissive: Channel::scalar(0.0),
            specular: Channel::scalar(0.0),
            specular_roughness: Channel::scalar(1.0),
            specular_tint: Channel::constant(Color::ONE),
        }
    }
}

impl Material {
    /// Create a plain diffuse material.
    pub fn new(name: impl Into<String>, base_color: Color) -> Self {
        Self {
            name: name.into(),
            base_color: Channel::constant(base_color),
            ..Default::default()
        }
    }

    /// Create an emitter of the given color and strength.
    pub fn light(name: impl Into<String>, color: Color, strength: f32) -> Self {
        Self::new(name, color).with_emissive(Channel::scalar(strength))
    }

    pub fn with_base_color(mut self, channel: Channel) -> Self {
        self.base_color = channel;
        self
    }

    pub fn with_metallic(mut self, channel: Channel) -> Self {
        self.metallic = channel;
        self
    }

    pub fn with_emissive(mut self, channel: Channel) -> Self {
        self.emissive = channel;
        self
    }

    pub fn with_specular(mut self, channel: Channel) -> Self {
        self.specular = channel;
        self
    }

    pub fn with_roughness(mut self, channel: Channel) -> Self {
        self.specular_roughness = channel;
        self
    }

    pub fn with_specular_tint(mut self, channel: Channel) -> Self {
        self.specular_tint = channel;
        self
    }

    /// Resolve every channel at a surface UV.
    ///
    /// Mixing weights are clamped to [0, 1] so they can be used directly
    /// as probabilities.
    pub fn resolve(&self, uv: Vec2) -> ShadingParams {
        ShadingParams {
            base_color: self.base_color.color(uv),
            metallic: self.metallic.value(uv).clamp(0.0, 1.0),
            emissive: self.emissive.strength(uv).max(0.0),
            specular: self.specular.value(uv).clamp(0.0, 1.0),
            roughness: self.specular_roughness.value(uv).clamp(0.0, 1.0),
            specular_tint: self.specular_tint.color(uv),
        }
    }
}

/// Material channels evaluated at one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub base_color: Color,
    pub metallic: f32,
    pub emissive: f32,
    pub specular: f32,
    pub roughness: f32,
    pub specular_tint: Color,
}

impl ShadingParams {
    pub fn is_emissive(&self) -> bool {
        self.emissive > 0.0
    }
}
