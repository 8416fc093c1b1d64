//! Multi-bounce path integrator.
//!
//! Each camera ray runs a small state machine: it stays in
//! [`PathState::Tracing`] while bouncing and leaves through exactly one of
//! the terminal states. Misses contribute nothing; there is no background
//! illumination.

use gt_core::Mesh;
use gt_math::{Color, Interval, Ray};
use rand::RngCore;

use crate::hittable::Hittable;
use crate::material::{scatter, Scatter};

/// Distance the next bounce origin is pulled back along the incoming ray.
pub const SURFACE_EPSILON: f32 = 1e-4;

/// Integrator state for one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathState {
    Tracing,
    /// Reached a light; carries the returned radiance.
    HitEmissive(Color),
    Missed,
    BudgetExhausted,
}

impl PathState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PathState::Tracing)
    }
}

/// Result of tracing one camera ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    /// Terminal state the path ended in
    pub state: PathState,
    /// Number of surfaces hit, including the light
    pub bounces: u32,
}

/// Trace `ray` through `world` for at most `max_bounces` surface hits.
pub fn trace_path(
    ray: Ray,
    world: &dyn Hittable,
    mesh: &Mesh,
    max_bounces: u32,
    rng: &mut dyn RngCore,
) -> PathSample {
    let mut ray = ray;
    let mut throughput = Color::ONE;
    let mut bounces = 0;
    let mut state = PathState::Tracing;

    while !state.is_terminal() {
        if bounces >= max_bounces {
            state = PathState::BudgetExhausted;
            break;
        }

        let Some(hit) = world.hit(&ray, Interval::new(0.0, f32::INFINITY)) else {
            state = PathState::Missed;
            break;
        };
        bounces += 1;

        let tri = mesh.triangle(hit.triangle);
        let material = mesh.material_of(tri);

        match scatter(tri, material, &hit, ray.direction, rng) {
            Scatter::Emit(emission) => {
                state = PathState::HitEmissive(throughput * emission);
            }
            Scatter::Bounce { direction, tint } => {
                throughput *= tint;
                let unit = ray.direction.normalize_or_zero();
                let origin = ray.at(hit.t) - unit * SURFACE_EPSILON;
                ray = Ray::new(origin, direction);
            }
        }
    }

    let radiance = match state {
        PathState::HitEmissive(radiance) => radiance,
        _ => Color::ZERO,
    };

    PathSample {
        radiance,
        state,
        bounces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::TriangleList;
    use gt_core::{Channel, Material, Triangle};
    use gt_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn quad(z: f32, material: usize) -> [Triangle; 2] {
        let a = Vec3::new(-1.0, -1.0, z);
        let b = Vec3::new(1.0, -1.0, z);
        let c = Vec3::new(1.0, 1.0, z);
        let d = Vec3::new(-1.0, 1.0, z);
        [Triangle::new(a, b, c, material), Triangle::new(a, c, d, material)]
    }

    #[test]
    fn test_miss_returns_zero() {
        let mesh = Mesh::new(quad(0.0, 0).to_vec(), vec![Arc::new(Material::default())]).unwrap();
        let world = TriangleList::new(&mesh);
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        let sample = trace_path(ray, &world, &mesh, 8, &mut rng);
        assert_eq!(sample.state, PathState::Missed);
        assert_eq!(sample.radiance, Color::ZERO);
        assert_eq!(sample.bounces, 0);
    }

    #[test]
    fn test_direct_light() {
        let lamp = Material::light("lamp", Color::new(1.0, 0.8, 0.6), 5.0);
        let mesh = Mesh::new(quad(0.0, 0).to_vec(), vec![Arc::new(lamp)]).unwrap();
        let world = TriangleList::new(&mesh);
        let mut rng = StdRng::seed_from_u64(2);

        let ray = Ray::new(Vec3::new(0.2, 0.1, 5.0), Vec3::NEG_Z);
        let sample = trace_path(ray, &world, &mesh, 8, &mut rng);
        let expected = Color::new(5.0, 4.0, 3.0);

        assert_eq!(sample.state, PathState::HitEmissive(sample.radiance));
        assert!((sample.radiance - expected).length() < 1e-5);
        assert_eq!(sample.bounces, 1);
    }

    #[test]
    fn test_zero_budget_is_exhausted_immediately() {
        let lamp = Material::light("lamp", Color::ONE, 1.0);
        let mesh = Mesh::new(quad(0.0, 0).to_vec(), vec![Arc::new(lamp)]).unwrap();
        let world = TriangleList::new(&mesh);
        let mut rng = StdRng::seed_from_u64(3);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let sample = trace_path(ray, &world, &mesh, 0, &mut rng);
        assert_eq!(sample.state, PathState::BudgetExhausted);
        assert_eq!(sample.radiance, Color::ZERO);
    }

    #[test]
    fn test_mirror_bounce_reaches_light() {
        // Mirror at z=0 facing +Z, lamp behind the camera at z=10 facing -Z
        let mirror = Material::new("mirror", Color::splat(0.5))
            .with_metallic(Channel::scalar(1.0))
            .with_roughness(Channel::scalar(0.0));
        let lamp = Material::light("lamp", Color::ONE, 2.0);

        let mut tris = quad(0.0, 0).to_vec();
        let [a, b] = quad(10.0, 1);
        tris.push(Triangle::new(a.positions[0], a.positions[2], a.positions[1], 1));
        tris.push(Triangle::new(b.positions[0], b.positions[2], b.positions[1], 1));
        let mesh = Mesh::new(tris, vec![Arc::new(mirror), Arc::new(lamp)]).unwrap();
        let world = TriangleList::new(&mesh);
        let mut rng = StdRng::seed_from_u64(4);

        let ray = Ray::new(Vec3::new(0.1, 0.1, 5.0), Vec3::NEG_Z);
        let sample = trace_path(ray, &world, &mesh, 4, &mut rng);

        assert!(matches!(sample.state, PathState::HitEmissive(_)));
        assert_eq!(sample.bounces, 2);
        assert!((sample.radiance - Color::splat(1.0)).length() < 1e-5);
    }

    #[test]
    fn test_closed_box_without_light_exhausts_budget() {
        let grey = Material::new("grey", Color::splat(0.5));
        let mut tris = quad(-1.0, 0).to_vec();
        tris.extend(quad(1.0, 0));
        let mesh = Mesh::new(tris, vec![Arc::new(grey)]).unwrap();
        let world = TriangleList::new(&mesh);
        let mut rng = StdRng::seed_from_u64(5);

        // Roughness 1 diffuse between two facing planes: sideways escapes are possible,
        // so only check that every path terminates within budget.
        for _ in 0..100 {
            let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
            let sample = trace_path(ray, &world, &mesh, 3, &mut rng);
            assert!(sample.bounces <= 3);
            assert_eq!(sample.radiance, Color::ZERO);
            assert!(matches!(sample.state, PathState::Missed | PathState::BudgetExhausted));
        }
    }
}
