//! Surface scattering.
//!
//! Direction selection combines two independent stochastic gates: a
//! Fresnel-weighted pick between a mirror bounce and a cosine-weighted
//! diffuse bounce, then a metallic gate that can force the mirror
//! direction. Roughness blends from the mirror direction toward the
//! picked one. Throughput is multiplied by the chosen tint and never
//! divided by the selection probability.

use gt_core::{Material, Triangle};
use gt_math::{Color, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_cosine_direction};

/// Outcome of evaluating a material at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scatter {
    /// Path terminates on a light; value is `base_color * emissive`.
    Emit(Color),
    /// Path continues along `direction` with throughput multiplied by `tint`.
    Bounce { direction: Vec3, tint: Color },
}

/// Mirror `v` about `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Schlick's approximation of dielectric reflectance.
///
/// `specular` in [0, 1] maps to an index of refraction of `1 + specular`;
/// zero specular reflects nothing.
pub fn fresnel_schlick(cos_theta: f32, specular: f32) -> f32 {
    if specular <= 0.0 {
        return 0.0;
    }
    let ior = 1.0 + specular;
    let r0 = ((ior - 1.0) / (ior + 1.0)).powi(2);
    let f = r0 + (1.0 - r0) * (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5);
    f.clamp(0.0, 1.0)
}

/// Evaluate `material` on `tri` at `hit` for a ray travelling along `incoming`.
pub fn scatter(
    tri: &Triangle,
    material: &Material,
    hit: &HitRecord,
    incoming: Vec3,
    rng: &mut dyn RngCore,
) -> Scatter {
    let params = material.resolve(tri.uv_at(hit.u, hit.v));
    if params.is_emissive() {
        return Scatter::Emit(params.base_color * params.emissive);
    }

    let unit_in = incoming.normalize_or_zero();
    let mut normal = tri.normal_at(hit.u, hit.v);
    if normal.dot(unit_in) > 0.0 {
        normal = -normal;
    }

    let mirror = reflect(unit_in, normal);
    let fresnel = fresnel_schlick(-unit_in.dot(normal), params.specular);

    let (mut picked, tint) = if gen_f32(rng) < fresnel {
        (mirror, params.specular_tint)
    } else {
        (random_cosine_direction(normal, rng), params.base_color)
    };

    if gen_f32(rng) < params.metallic {
        picked = mirror;
    }

    let blended = mirror.lerp(picked, params.roughness).normalize_or_zero();
    let direction = if blended == Vec3::ZERO { normal } else { blended };

    Scatter::Bounce { direction, tint }
}
