//! Random sampling helpers.
//!
//! All randomness flows through an explicitly passed `RngCore`; nothing here
//! touches a global or thread-local generator.

use gt_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere (rejection sampling).
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Cosine-weighted direction about `normal` (unit sphere offset by the normal).
pub fn random_cosine_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let dir = normal + random_unit_vector(rng);

    // Catch degenerate scatter direction
    if dir.length_squared() < 1e-8 {
        normal
    } else {
        dir.normalize()
    }
}

/// Random point in the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// SplitMix64 finalizer.
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for the private stream of one (round, row) work item.
pub fn stream_seed(seed: u64, round: u32, row: u32) -> u64 {
    mix64(mix64(mix64(seed) ^ round as u64) ^ row as u64)
}

/// Private generator for one (round, row) work item.
pub fn stream_rng(seed: u64, round: u32, row: u32) -> StdRng {
    StdRng::seed_from_u64(stream_seed(seed, round, row))
}
