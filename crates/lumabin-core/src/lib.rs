//! Local-statistics binarization for raster images.
//!
//! lumabin turns an RGB(A) raster into a black-and-white one by comparing every pixel
//! with a threshold derived from its neighbourhood. Neighbourhood statistics come from
//! summed-area tables, so the cost per pixel does not depend on the window size.
//!
//! # Architecture Overview
//!
//! 1. **Luminance**: BT.601 weights reduce each pixel to one intensity, stored as an
//!    exact integer in thousandths ([`luminance`]).
//! 2. **Integral images**: two padded prefix-sum tables over intensity and squared
//!    intensity ([`integral`]).
//! 3. **Region statistics**: O(1) count / sum / mean / variance for any clamped
//!    rectangle, from exact integer moments ([`stats`]).
//! 4. **Thresholding**: a [`threshold::ThresholdPolicy`] picks a threshold per window;
//!    local mean and Sauvola-style policies are provided ([`threshold`]).
//!
//! All intermediate buffers are rebuilt for every call. The [`Binarizer`] keeps them in
//! a bump arena so repeated calls do not hit the allocator.
//!
//! # Example
//!
//! ```
//! use lumabin_core::{Binarizer, BinarizerConfig, RasterView};
//!
//! let config = BinarizerConfig::builder().adaptive(7, 0.2).build();
//! let mut binarizer = Binarizer::with_config(config);
//!
//! # let pixels = vec![200u8; 16 * 16 * 4];
//! let raster = RasterView::new(&pixels, 16, 16).unwrap();
//! let output = binarizer.binarize(&raster);
//! assert_eq!(output.data.len(), pixels.len());
//! ```

/// Tone adjustments (invert, contrast stretch).
pub mod adjust;
/// Configuration types for the pipeline.
pub mod config;
/// Error types.
pub mod error;
/// Raster buffer abstractions.
pub mod image;
/// Summed-area table construction.
pub mod integral;
/// Luminance extraction.
pub mod luminance;
/// Constant-time rectangle statistics.
pub mod stats;
/// Utilities for testing and synthetic data generation.
pub mod test_utils;
/// Thresholding policies.
pub mod threshold;

pub use crate::config::{AlphaMode, BinarizerConfig, ThresholdMethod};
pub use crate::error::RasterError;
pub use crate::image::{PixelFormat, Raster, RasterView};
pub use crate::threshold::{LocalMean, Sauvola, ThresholdPolicy};

use crate::image::mask_to_raster;
use crate::luminance::extract_intensity;
use crate::stats::RegionOracle;
use crate::threshold::{INK, apply_threshold, method_to_policy};
use bumpalo::Bump;

/// Timing and outcome of a single binarization call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinarizeStats {
    /// Time spent extracting luminance in milliseconds.
    pub luminance_ms: f64,
    /// Time spent building both integral images in milliseconds.
    pub integral_ms: f64,
    /// Time spent classifying pixels in milliseconds.
    pub threshold_ms: f64,
    /// Total pipeline time in milliseconds.
    pub total_ms: f64,
    /// Number of pixels classified as ink (0).
    pub ink_pixels: usize,
    /// Number of pixels processed.
    pub pixel_count: usize,
}

/// Reusable binarization pipeline.
///
/// Holds a scratch arena and the [`BinarizerConfig`]. Each call resets the arena, so
/// no intermediate state is carried from one image to the next.
pub struct Binarizer {
    arena: Bump,
    config: BinarizerConfig,
}

impl Binarizer {
    /// Create a binarizer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BinarizerConfig::default())
    }

    /// Create a binarizer with a custom configuration.
    #[must_use]
    pub fn with_config(config: BinarizerConfig) -> Self {
        Self {
            arena: Bump::new(),
            config,
        }
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> BinarizerConfig {
        self.config
    }

    /// Replace the thresholding method for subsequent calls.
    pub fn set_method(&mut self, method: ThresholdMethod) {
        self.config.method = method;
    }

    /// Binarize `raster` with the configured method.
    pub fn binarize(&mut self, raster: &RasterView) -> Raster {
        self.binarize_with_stats(raster).0
    }

    /// Binarize and report per-stage timings.
    pub fn binarize_with_stats(&mut self, raster: &RasterView) -> (Raster, BinarizeStats) {
        let policy = method_to_policy(self.config.method);
        let alpha = self.config.alpha_mode;
        let (mask, stats) = self.run(raster, policy.as_ref());
        (mask_to_raster(raster, &mask, alpha), stats)
    }

    /// Binarize with an explicit policy instead of the configured method.
    pub fn binarize_with_policy<P: ThresholdPolicy + ?Sized>(
        &mut self,
        raster: &RasterView,
        policy: &P,
    ) -> Raster {
        let alpha = self.config.alpha_mode;
        let (mask, _) = self.run(raster, policy);
        mask_to_raster(raster, &mask, alpha)
    }

    /// Single-channel result: one byte per pixel, `0` for ink and `255` otherwise.
    pub fn binarize_mask(&mut self, raster: &RasterView) -> Vec<u8> {
        let policy = method_to_policy(self.config.method);
        self.run(raster, policy.as_ref()).0
    }

    fn run<P: ThresholdPolicy + ?Sized>(
        &mut self,
        raster: &RasterView,
        policy: &P,
    ) -> (Vec<u8>, BinarizeStats) {
        let mut stats = BinarizeStats {
            pixel_count: raster.pixel_count(),
            ..BinarizeStats::default()
        };
        let start_total = std::time::Instant::now();
        let mut mask = vec![0u8; raster.pixel_count()];
        if raster.is_empty() {
            return (mask, stats);
        }

        self.arena.reset();
        tracing::debug!(
            policy = policy.name(),
            radius = policy.window_radius(),
            width = raster.width,
            height = raster.height,
            "binarizing"
        );

        // 1. Luminance
        let start = std::time::Instant::now();
        let field = {
            let _span = tracing::info_span!("luminance").entered();
            let buf = self.arena.alloc_slice_fill_copy(raster.pixel_count(), 0u32);
            extract_intensity(raster, buf)
        };
        stats.luminance_ms = start.elapsed().as_secs_f64() * 1000.0;

        // 2. Integral images
        let start = std::time::Instant::now();
        let oracle = {
            let _span = tracing::info_span!("integral_image").entered();
            let len = (raster.width + 1) * (raster.height + 1);
            let integral = self.arena.alloc_slice_fill_copy(len, 0u64);
            let integral_sq = self.arena.alloc_slice_fill_copy(len, 0u64);
            RegionOracle::build(field, integral, integral_sq)
        };
        stats.integral_ms = start.elapsed().as_secs_f64() * 1000.0;

        // 3. Classification
        let start = std::time::Instant::now();
        {
            let _span = tracing::info_span!("threshold", policy = policy.name()).entered();
            apply_threshold(&oracle, policy, &mut mask, self.config.parallel);
        }
        stats.threshold_ms = start.elapsed().as_secs_f64() * 1000.0;

        stats.ink_pixels = mask.iter().filter(|&&v| v == INK).count();
        stats.total_ms = start_total.elapsed().as_secs_f64() * 1000.0;
        (mask, stats)
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot binarization without a reusable arena.
///
/// Classification runs on the rayon pool; the result is the same as the serial path.
#[must_use]
pub fn binarize<P: ThresholdPolicy + ?Sized>(
    raster: &RasterView,
    policy: &P,
    alpha: AlphaMode,
) -> Raster {
    let mut mask = vec![0u8; raster.pixel_count()];
    if !raster.is_empty() {
        let mut intensity = vec![0u32; raster.pixel_count()];
        let field = extract_intensity(raster, &mut intensity);
        let len = (raster.width + 1) * (raster.height + 1);
        let mut integral = vec![0u64; len];
        let mut integral_sq = vec![0u64; len];
        let oracle = RegionOracle::build(field, &mut integral, &mut integral_sq);
        apply_threshold(&oracle, policy, &mut mask, true);
    }
    mask_to_raster(raster, &mask, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{checkerboard, gray_raster};

    #[test]
    fn test_arena_reuse_gives_identical_output() {
        let img = checkerboard(32, 24, 4, 30, 220);
        let config = BinarizerConfig::builder().adaptive(5, 0.3).build();
        let mut binarizer = Binarizer::with_config(config);
        let first = binarizer.binarize(&img.view());
        // A different image in between must not leak into the next result.
        let other = gray_raster(7, 3, &[9; 21]);
        let _ = binarizer.binarize(&other.view());
        let second = binarizer.binarize(&img.view());
        assert_eq!(first, second);
    }

    #[test]
    fn test_free_function_matches_binarizer() {
        let img = checkerboard(20, 20, 3, 10, 240);
        let config = BinarizerConfig::builder().local_mean(2).build();
        let mut binarizer = Binarizer::with_config(config);
        let a = binarizer.binarize(&img.view());
        let b = binarize(&img.view(), &LocalMean { radius: 2 }, AlphaMode::Preserve);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stats_count_ink() {
        // Single dark pixel in a bright 3x3 image, radius 1: only it is ink.
        let mut levels = [200u8; 9];
        levels[4] = 20;
        let img = gray_raster(3, 3, &levels);
        let config = BinarizerConfig::builder().local_mean(1).build();
        let mut binarizer = Binarizer::with_config(config);
        let (out, stats) = binarizer.binarize_with_stats(&img.view());
        assert_eq!(stats.ink_pixels, 1);
        assert_eq!(stats.pixel_count, 9);
        assert!(stats.total_ms >= 0.0);
        assert_eq!(out.get_pixel(1, 1), &[0, 0, 0, 255]);
        assert_eq!(out.get_pixel(0, 0), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_zero_sized_input() {
        let view = RasterView::new(&[], 0, 4).unwrap();
        let mut binarizer = Binarizer::new();
        let (out, stats) = binarizer.binarize_with_stats(&view);
        assert_eq!(out.width, 0);
        assert_eq!(out.height, 4);
        assert!(out.data.is_empty());
        assert_eq!(stats.ink_pixels, 0);
        assert!(binarizer.binarize_mask(&view).is_empty());
    }

    #[test]
    fn test_set_method() {
        let mut binarizer = Binarizer::new();
        binarizer.set_method(ThresholdMethod::LocalMean { radius: 0 });
        let img = checkerboard(8, 8, 1, 0, 255);
        let mask = binarizer.binarize_mask(&img.view());
        assert!(mask.iter().all(|&v| v == 255));
    }
}
