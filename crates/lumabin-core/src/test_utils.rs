//! Synthetic rasters for tests and benchmarks.

use crate::image::{PixelFormat, Raster};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Opaque RGBA raster from grey levels, one per pixel, row-major.
///
/// # Panics
/// Panics if `levels.len() != width * height`.
#[must_use]
pub fn gray_raster(width: usize, height: usize, levels: &[u8]) -> Raster {
    assert_eq!(levels.len(), width * height, "one level per pixel");
    let mut data = Vec::with_capacity(levels.len() * 4);
    for &g in levels {
        data.extend_from_slice(&[g, g, g, 255]);
    }
    Raster {
        data,
        width,
        height,
        format: PixelFormat::Rgba8,
    }
}

/// Raster where every pixel has the same RGBA colour.
#[must_use]
pub fn solid_raster(width: usize, height: usize, rgba: [u8; 4]) -> Raster {
    Raster {
        data: rgba.repeat(width * height),
        width,
        height,
        format: PixelFormat::Rgba8,
    }
}

/// Opaque checkerboard with square cells of `cell` pixels.
///
/// The top-left cell is `dark`.
#[must_use]
pub fn checkerboard(width: usize, height: usize, cell: usize, dark: u8, light: u8) -> Raster {
    let cell = cell.max(1);
    let mut levels = vec![light; width * height];
    for y in 0..height {
        for x in 0..width {
            if (x / cell + y / cell).is_multiple_of(2) {
                levels[y * width + x] = dark;
            }
        }
    }
    gray_raster(width, height, &levels)
}

/// Parameters for [`generate_document`].
#[derive(Clone, Copy, Debug)]
pub struct DocumentParams {
    /// Canvas width.
    pub width: usize,
    /// Canvas height.
    pub height: usize,
    /// Grey level of the paper at the brightest edge.
    pub paper_level: u8,
    /// Grey level of the ink at the brightest edge.
    pub ink_level: u8,
    /// Fraction of brightness lost from the left edge to the right edge (0.0 - 1.0).
    pub shading: f32,
    /// Standard deviation of additive Gaussian noise.
    pub noise_sigma: f32,
    /// RNG seed, so fixtures are reproducible.
    pub seed: u64,
}

impl Default for DocumentParams {
    fn default() -> Self {
        Self {
            width: 240,
            height: 160,
            paper_level: 220,
            ink_level: 40,
            shading: 0.5,
            noise_sigma: 0.0,
            seed: 42,
        }
    }
}

/// Generate a page of "text": lines of 2px vertical strokes under a horizontal light
/// falloff, with optional noise.
///
/// Returns the raster and the ground-truth ink mask (`true` where a stroke was drawn).
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn generate_document(params: &DocumentParams) -> (Raster, Vec<bool>) {
    let DocumentParams {
        width,
        height,
        paper_level,
        ink_level,
        shading,
        noise_sigma,
        seed,
    } = *params;

    let mut ink = vec![false; width * height];
    let line_pitch = 16;
    let line_height = 9;
    let margin = 8;
    for y in margin..height.saturating_sub(margin) {
        if (y - margin) % line_pitch >= line_height {
            continue;
        }
        for x in margin..width.saturating_sub(margin) {
            if (x - margin) % 6 < 2 {
                ink[y * width + x] = true;
            }
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0f32, noise_sigma.max(0.0)).ok();
    let mut levels = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let falloff = 1.0 - shading * (x as f32 / width.max(1) as f32);
            let base = if ink[y * width + x] {
                ink_level
            } else {
                paper_level
            };
            let mut v = f32::from(base) * falloff;
            if let Some(n) = &noise {
                v += n.sample(&mut rng);
            }
            levels[y * width + x] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    (gray_raster(width, height, &levels), ink)
}
