//! Constant-time rectangle statistics backed by the summed-area tables.

use crate::error::{RasterError, Result};
use crate::integral::{IntegralTable, compute_integral_images};
use crate::luminance::{IntensityField, MILLI};

/// Inclusive pixel rectangle `[x1, x2] x [y1, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column (inclusive).
    pub x1: usize,
    /// Top row (inclusive).
    pub y1: usize,
    /// Right column (inclusive).
    pub x2: usize,
    /// Bottom row (inclusive).
    pub y2: usize,
}

impl Rect {
    /// Build a rectangle from inclusive corners.
    #[must_use]
    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2, "empty rectangle");
        Self { x1, y1, x2, y2 }
    }

    /// Square window of half-size `radius` around `(x, y)`, clamped to the image.
    ///
    /// Near the border the window is cut off rather than mirrored or wrapped, so it
    /// shrinks and becomes asymmetric. `width` and `height` must be non-zero and
    /// `(x, y)` inside the image.
    #[inline(always)]
    #[must_use]
    pub fn window(x: usize, y: usize, radius: usize, width: usize, height: usize) -> Self {
        debug_assert!(x < width && y < height);
        Self {
            x1: x.saturating_sub(radius),
            y1: y.saturating_sub(radius),
            x2: x.saturating_add(radius).min(width - 1),
            y2: y.saturating_add(radius).min(height - 1),
        }
    }

    /// Number of pixels covered. Always at least one.
    #[inline(always)]
    #[must_use]
    pub fn count(&self) -> usize {
        (self.x2 - self.x1 + 1) * (self.y2 - self.y1 + 1)
    }
}

/// Raw moments of a rectangle, in stored intensity units (thousandths).
///
/// The moments are exact integers; the derived statistics are reported on the usual
/// 0-255 luminance scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionStats {
    /// Number of pixels.
    pub count: usize,
    /// Sum of stored intensities.
    pub sum: u64,
    /// Sum of squared stored intensities.
    pub sum_sq: u64,
}

impl RegionStats {
    /// Arithmetic mean.
    #[inline(always)]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64 / f64::from(MILLI)
    }

    /// `count * sum_sq - sum²`, clamped at zero.
    ///
    /// Equals `count²` times the variance in stored units. It is computed in integers,
    /// so a flat region gives exactly zero.
    #[inline(always)]
    #[must_use]
    pub fn scaled_variance(&self) -> u128 {
        let n = self.count as u128;
        let s = u128::from(self.sum);
        (n * u128::from(self.sum_sq)).saturating_sub(s * s)
    }

    /// Population variance, never negative.
    #[inline(always)]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        let n = self.count as f64 * f64::from(MILLI);
        self.scaled_variance() as f64 / (n * n)
    }

    /// Population standard deviation.
    #[inline(always)]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Answers count / sum / mean / variance queries for any clamped rectangle in O(1).
///
/// Sums are exact while a window's squared-intensity total fits in a `u64`, which
/// holds for windows up to roughly 2.8 * 10^8 pixels.
#[derive(Clone, Copy, Debug)]
pub struct RegionOracle<'a> {
    field: IntensityField<'a>,
    sum: IntegralTable<'a>,
    sum_sq: IntegralTable<'a>,
}

impl<'a> RegionOracle<'a> {
    /// Combine a field with tables that were built from it.
    pub fn new(
        field: IntensityField<'a>,
        sum: IntegralTable<'a>,
        sum_sq: IntegralTable<'a>,
    ) -> Result<Self> {
        for table in [&sum, &sum_sq] {
            if table.width() != field.width || table.height() != field.height {
                return Err(RasterError::TableSize {
                    what: "oracle",
                    expected: (field.width + 1) * (field.height + 1),
                    actual: table.as_slice().len(),
                });
            }
        }
        Ok(Self { field, sum, sum_sq })
    }

    /// Build both tables for `field` into the supplied buffers and wrap them.
    ///
    /// # Panics
    /// Panics if the buffers are not `(W + 1) * (H + 1)` long.
    pub fn build(
        field: IntensityField<'a>,
        integral: &'a mut [u64],
        integral_sq: &'a mut [u64],
    ) -> Self {
        let (sum, sum_sq) = compute_integral_images(&field, integral, integral_sq);
        Self { field, sum, sum_sq }
    }

    /// The field the tables describe.
    #[must_use]
    pub fn field(&self) -> IntensityField<'a> {
        self.field
    }

    /// Pixel count of `rect`.
    #[inline(always)]
    #[must_use]
    pub fn count(&self, rect: Rect) -> usize {
        rect.count()
    }

    /// Sum of stored intensities over `rect`.
    #[inline(always)]
    #[must_use]
    pub fn sum(&self, rect: Rect) -> u64 {
        self.sum.rect_sum(rect)
    }

    /// Sum of squared stored intensities over `rect`.
    #[inline(always)]
    #[must_use]
    pub fn sum_sq(&self, rect: Rect) -> u64 {
        self.sum_sq.rect_sum(rect)
    }

    /// Mean luminance over `rect`. Touches only the raw-intensity table.
    #[inline(always)]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self, rect: Rect) -> f64 {
        self.sum(rect) as f64 / rect.count() as f64 / f64::from(MILLI)
    }

    /// All raw moments of `rect`.
    #[inline(always)]
    #[must_use]
    pub fn stats(&self, rect: Rect) -> RegionStats {
        RegionStats {
            count: rect.count(),
            sum: self.sum(rect),
            sum_sq: self.sum_sq(rect),
        }
    }
}
