//! Local thresholding policies and the per-pixel classification driver.
//!
//! A policy decides, for one pixel and its window, whether the pixel is strictly
//! darker than the window's threshold. The driver walks the image and writes `0` (ink)
//! for those pixels and `255` (background) for every other one, ties included.

use crate::config::ThresholdMethod;
use crate::luminance::{IntensityField, MILLI};
use crate::stats::{Rect, RegionOracle, RegionStats};
use rayon::prelude::*;

/// Output value for pixels darker than their threshold.
pub const INK: u8 = 0;
/// Output value for every other pixel.
pub const BACKGROUND: u8 = 255;

/// Dynamic range of the standard deviation in the Sauvola formula.
pub const SAUVOLA_DYNAMIC_RANGE: f64 = 128.0;

/// A local thresholding rule.
///
/// Implementors see the image only through the [`RegionOracle`], which keeps every
/// policy O(1) per pixel.
pub trait ThresholdPolicy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Half-size of the square window centred on each pixel.
    fn window_radius(&self) -> usize;

    /// Threshold on the 0-255 luminance scale for the pixel whose clamped window is
    /// `window`.
    fn threshold(&self, oracle: &RegionOracle<'_>, window: Rect) -> f64;

    /// True when a pixel of stored intensity `milli` (thousandths) is strictly below
    /// the threshold of `window`.
    ///
    /// The default compares against [`ThresholdPolicy::threshold`]. Implementations
    /// override it to decide from the exact window moments, so that a pixel equal to
    /// its window mean is never pushed across by rounding.
    #[inline]
    fn is_ink(&self, oracle: &RegionOracle<'_>, window: Rect, milli: u32) -> bool {
        f64::from(milli) / f64::from(MILLI) < self.threshold(oracle, window)
    }
}

/// Compare each pixel with the mean of its window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalMean {
    /// Window half-size. `0` compares a pixel with itself.
    pub radius: usize,
}

impl ThresholdPolicy for LocalMean {
    fn name(&self) -> &'static str {
        "local_mean"
    }

    fn window_radius(&self) -> usize {
        self.radius
    }

    #[inline(always)]
    fn threshold(&self, oracle: &RegionOracle<'_>, window: Rect) -> f64 {
        oracle.mean(window)
    }

    /// `v < sum / count`, evaluated as `v * count < sum` in integers.
    #[inline(always)]
    fn is_ink(&self, oracle: &RegionOracle<'_>, window: Rect, milli: u32) -> bool {
        u128::from(milli) * (window.count() as u128) < u128::from(oracle.sum(window))
    }
}

/// Sauvola-style threshold `T = mean * (1 + k * (std / 128 - 1))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sauvola {
    /// Window half-size.
    pub half_size: usize,
    /// Sensitivity. Usually in `[0, 1]` but not range-checked.
    pub k: f64,
}

impl Sauvola {
    /// Create a policy with an explicit sensitivity.
    #[must_use]
    pub fn new(half_size: usize, k: f64) -> Self {
        Self { half_size, k }
    }

    /// Create a policy from an integer percentage, `k = percent / 100`.
    #[must_use]
    pub fn from_percent(half_size: usize, percent: u32) -> Self {
        Self::new(half_size, f64::from(percent) / 100.0)
    }

    /// `T / mean` for a window: `1 + k * (std / 128 - 1)`.
    #[inline(always)]
    fn factor(&self, stats: &RegionStats) -> f64 {
        1.0 + self.k * (stats.std_dev() / SAUVOLA_DYNAMIC_RANGE - 1.0)
    }
}

/// The Sauvola threshold for a window with the given mean and standard deviation.
#[inline(always)]
#[must_use]
pub fn sauvola_threshold(mean: f64, std_dev: f64, k: f64) -> f64 {
    mean * (1.0 + k * (std_dev / SAUVOLA_DYNAMIC_RANGE - 1.0))
}

impl ThresholdPolicy for Sauvola {
    fn name(&self) -> &'static str {
        "sauvola"
    }

    fn window_radius(&self) -> usize {
        self.half_size
    }

    #[inline(always)]
    fn threshold(&self, oracle: &RegionOracle<'_>, window: Rect) -> f64 {
        let stats = oracle.stats(window);
        sauvola_threshold(stats.mean(), stats.std_dev(), self.k)
    }

    /// `v * count < sum * factor`. Both products are exact integers in `f64` for any
    /// realistic window, so a factor of exactly 1 reduces to the local-mean test.
    #[inline(always)]
    #[allow(clippy::cast_precision_loss)]
    fn is_ink(&self, oracle: &RegionOracle<'_>, window: Rect, milli: u32) -> bool {
        let stats = oracle.stats(window);
        f64::from(milli) * (stats.count as f64) < stats.sum as f64 * self.factor(&stats)
    }
}

/// Instantiate the policy selected by a configuration value.
#[must_use]
pub fn method_to_policy(method: ThresholdMethod) -> Box<dyn ThresholdPolicy> {
    match method {
        ThresholdMethod::LocalMean { radius } => Box::new(LocalMean { radius }),
        ThresholdMethod::Adaptive { window, k } => Box::new(Sauvola::new(window, k)),
    }
}

/// Classify every pixel of `oracle.field()` into `mask` (one byte per pixel).
///
/// The summed-area tables inside `oracle` are complete before this is called, so rows
/// are independent and `parallel` only changes scheduling, never the result.
///
/// # Panics
/// Panics if `mask` does not hold one byte per pixel.
pub fn apply_threshold<P: ThresholdPolicy + ?Sized>(
    oracle: &RegionOracle<'_>,
    policy: &P,
    mask: &mut [u8],
    parallel: bool,
) {
    let field = oracle.field();
    assert_eq!(
        mask.len(),
        field.width * field.height,
        "mask must hold one byte per pixel"
    );
    if field.is_empty() {
        return;
    }

    let width = field.width;
    if parallel {
        mask.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, dst_row)| threshold_row(&field, oracle, policy, y, dst_row));
    } else {
        for (y, dst_row) in mask.chunks_exact_mut(width).enumerate() {
            threshold_row(&field, oracle, policy, y, dst_row);
        }
    }
}

/// Classify row `y`.
#[inline]
fn threshold_row<P: ThresholdPolicy + ?Sized>(
    field: &IntensityField<'_>,
    oracle: &RegionOracle<'_>,
    policy: &P,
    y: usize,
    dst_row: &mut [u8],
) {
    let (w, h) = (field.width, field.height);
    let radius = policy.window_radius();
    for (x, (&v, d)) in field.get_row(y).iter().zip(dst_row.iter_mut()).enumerate() {
        let ink = policy.is_ink(oracle, Rect::window(x, y, radius, w, h), v);
        // Branchless: 0xFF for background (including ties), 0x00 for ink.
        *d = u8::from(!ink).wrapping_neg();
    }
}
