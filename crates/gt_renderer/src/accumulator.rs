//! Progressive per-pixel radiance accumulation.
//!
//! Each sample round adds exactly one radiance value into every pixel.
//! Rows are handed to rayon workers as disjoint mutable chunks, so no two
//! workers ever touch the same pixel within a round.

use std::path::Path;

use gt_math::Color;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::tonemap::{color_to_rgb8, ToneMap};

/// Running radiance sums plus the number of completed rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    width: u32,
    height: u32,
    sum: Vec<Color>,
    rounds: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sum: vec![Color::ZERO; width as usize * height as usize],
            rounds: 0,
        }
    }

    /// Add one sample round.
    ///
    /// `make_sampler(row)` is called once per row on a worker thread and
    /// returns a closure producing the radiance for each column of that row.
    pub fn add_round<F, S>(&mut self, make_sampler: F)
    where
        F: Fn(u32) -> S + Sync,
        S: FnMut(u32) -> Color,
    {
        let row_len = (self.width as usize).max(1);
        self.sum
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let mut sample = make_sampler(y as u32);
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel += sample(x as u32);
                }
            });
        self.rounds += 1;
    }

    /// Fold another accumulator of the same size into this one.
    pub fn merge(&mut self, other: &Accumulator) -> RenderResult<()> {
        if (self.width, self.height) != (other.width, other.height) {
            return Err(RenderError::SizeMismatch {
                expected: (self.width, self.height),
                actual: (other.width, other.height),
            });
        }
        for (a, b) in self.sum.iter_mut().zip(&other.sum) {
            *a += *b;
        }
        self.rounds += other.rounds;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Raw radiance sum at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.sum[(y * self.width + x) as usize]
    }

    pub fn sums(&self) -> &[Color] {
        &self.sum
    }

    /// Mean radiance per pixel; all black before the first round.
    pub fn resolve(&self) -> Vec<Color> {
        if self.rounds == 0 {
            return vec![Color::ZERO; self.sum.len()];
        }
        let scale = 1.0 / self.rounds as f32;
        self.sum.iter().map(|c| *c * scale).collect()
    }

    /// Normalize, tone map and quantize into an 8-bit image.
    pub fn snapshot(&self, tone_map: ToneMap, gamma: f32) -> Snapshot {
        let pixels = self
            .resolve()
            .into_iter()
            .map(|c| color_to_rgb8(c, tone_map, gamma))
            .collect();
        Snapshot {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// 8-bit RGB raster derived from an [`Accumulator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl Snapshot {
    /// Tightly packed RGB bytes, row-major from the top-left pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Encode to a file; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )
        .map_err(|source| RenderError::Snapshot {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Wrote snapshot {}", path.display());
        Ok(())
    }
}
