//! Progressive parallel renderer.
//!
//! Runs sample rounds over the whole image on a rayon pool. Between rounds
//! the accumulator is owned by a single caller, which is where checkpoints
//! (normalization, tone mapping, snapshot I/O) happen.

use std::ops::ControlFlow;
use std::time::Instant;

use gt_math::Color;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::accumulator::{Accumulator, Snapshot};
use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::integrator::trace_path;
use crate::sampling::stream_rng;
use crate::scene::Scene;
use crate::tonemap::ToneMap;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of sample rounds (samples per pixel)
    pub samples: u32,
    /// Maximum surface hits per path
    pub max_bounces: u32,
    /// Grid cells along the longest scene axis
    pub desired_cells: u32,
    /// Base seed for every per-row random stream
    pub seed: u64,
    /// Jitter samples within each pixel
    pub antialias: bool,
    /// Worker threads; `None` uses rayon's global pool
    pub threads: Option<usize>,
    /// Rounds between checkpoints; 0 only checkpoints at the end
    pub checkpoint_every: u32,
    pub tone_map: ToneMap,
    pub gamma: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: 64,
            max_bounces: 8,
            desired_cells: 64,
            seed: 0,
            antialias: true,
            threads: None,
            checkpoint_every: 8,
            tone_map: ToneMap::default(),
            gamma: 2.2,
        }
    }
}

/// State handed to the checkpoint callback after a round.
pub struct Checkpoint<'a> {
    pub rounds: u32,
    pub total_rounds: u32,
    pub accumulator: &'a Accumulator,
    tone_map: ToneMap,
    gamma: f32,
}

impl Checkpoint<'_> {
    /// Tone-mapped image of the samples so far.
    pub fn snapshot(&self) -> Snapshot {
        self.accumulator.snapshot(self.tone_map, self.gamma)
    }

    pub fn is_final(&self) -> bool {
        self.rounds >= self.total_rounds
    }
}

pub struct Renderer {
    scene: Scene,
    camera: Camera,
    config: RenderConfig,
    pool: Option<ThreadPool>,
}

impl Renderer {
    pub fn new(scene: Scene, camera: Camera, config: RenderConfig) -> RenderResult<Self> {
        if camera.width() == 0 || camera.height() == 0 {
            return Err(RenderError::EmptyImage {
                width: camera.width(),
                height: camera.height(),
            });
        }
        let focal_length = camera.focal_length();
        if !(focal_length > 0.0 && focal_length.is_finite()) {
            return Err(RenderError::InvalidFocalLength(focal_length));
        }

        let pool = match config.threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };

        Ok(Self {
            scene,
            camera,
            config,
            pool,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Fresh accumulator matching the camera resolution.
    pub fn accumulator(&self) -> Accumulator {
        Accumulator::new(self.camera.width(), self.camera.height())
    }

    /// Radiance estimate for one pixel sample.
    fn sample_pixel(&self, x: u32, y: u32, rng: &mut dyn rand::RngCore) -> Color {
        let ray = self.camera.get_ray(x, y, self.config.antialias, rng);
        let mesh = self.scene.mesh();
        trace_path(ray, &self.scene, mesh, self.config.max_bounces, rng).radiance
    }

    /// Add sample round `round` into `acc`.
    ///
    /// The round's random streams depend only on the seed, the round index
    /// and the row, so rounds can be rendered into separate accumulators
    /// and merged later with the same result.
    pub fn render_round(&self, acc: &mut Accumulator, round: u32) {
        let seed = self.config.seed;
        let work = |acc: &mut Accumulator| {
            acc.add_round(|y| {
                let mut rng = stream_rng(seed, round, y);
                move |x| self.sample_pixel(x, y, &mut rng)
            })
        };

        match &self.pool {
            Some(pool) => pool.install(|| work(acc)),
            None => work(acc),
        }
    }

    /// Run every round, calling `on_checkpoint` every `checkpoint_every`
    /// rounds and after the last one. Returning `ControlFlow::Break` stops
    /// the render early.
    pub fn render<F>(&self, mut on_checkpoint: F) -> RenderResult<Accumulator>
    where
        F: FnMut(&Checkpoint) -> ControlFlow<()>,
    {
        let mut acc = self.accumulator();
        let total = self.config.samples;
        let started = Instant::now();

        log::info!(
            "Rendering {}x{} at {} samples, {} bounces",
            self.camera.width(),
            self.camera.height(),
            total,
            self.config.max_bounces
        );

        for round in 0..total {
            let round_start = Instant::now();
            self.render_round(&mut acc, round);
            log::debug!("Round {} took {:.2?}", round + 1, round_start.elapsed());

            let done = round + 1;
            let due = self.config.checkpoint_every > 0 && done % self.config.checkpoint_every == 0;
            if due || done == total {
                log::info!("Checkpoint {}/{} ({:.1?} elapsed)", done, total, started.elapsed());
                let checkpoint = Checkpoint {
                    rounds: done,
                    total_rounds: total,
                    accumulator: &acc,
                    tone_map: self.config.tone_map,
                    gamma: self.config.gamma,
                };
                if on_checkpoint(&checkpoint).is_break() {
                    log::info!("Render stopped after {} rounds", done);
                    break;
                }
            }
        }

        Ok(acc)
    }
}
