//! Luminance extraction: RGB(A) raster to a single-channel intensity field.
//!
//! The weights are the BT.601 luma coefficients. They are fixed; there is no
//! gamma handling or colour-space conversion.
//!
//! Intensities are stored in thousandths (`299 R + 587 G + 114 B`, at most 255 000), so
//! every value, and every sum of values, is an exact integer.

use crate::error::{RasterError, Result};
use crate::image::RasterView;
use multiversion::multiversion;

/// Red weight.
pub const LUMA_R: f64 = 0.299;
/// Green weight.
pub const LUMA_G: f64 = 0.587;
/// Blue weight.
pub const LUMA_B: f64 = 0.114;

/// Stored intensity units per unit of luminance.
pub const MILLI: u32 = 1000;

/// Largest stored intensity (white).
pub const MAX_MILLI: u32 = 255 * MILLI;

/// Luminance of one pixel. Alpha is ignored by every caller.
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * f64::from(r) + LUMA_G * f64::from(g) + LUMA_B * f64::from(b)
}

/// Luminance of one pixel in thousandths, exact.
#[inline(always)]
#[must_use]
pub fn luminance_milli(r: u8, g: u8, b: u8) -> u32 {
    299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)
}

/// A borrowed W x H field of intensities in thousandths, row-major.
#[derive(Clone, Copy, Debug)]
pub struct IntensityField<'a> {
    /// Intensities, `width * height` long.
    pub data: &'a [u32],
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl<'a> IntensityField<'a> {
    /// Wrap a precomputed intensity array.
    pub fn new(data: &'a [u32], width: usize, height: usize) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or(RasterError::DimensionOverflow {
                width,
                height,
                channels: 1,
            })?;
        if data.len() != expected {
            return Err(RasterError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// True when either dimension is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Stored intensities of row `y`.
    #[inline(always)]
    pub fn get_row(&self, y: usize) -> &'a [u32] {
        assert!(y < self.height, "Row index {y} out of bounds");
        let data: &'a [u32] = self.data;
        let start = y * self.width;
        &data[start..start + self.width]
    }

    /// Stored intensity at `(x, y)`, in thousandths.
    #[inline(always)]
    pub fn get_milli(&self, x: usize, y: usize) -> u32 {
        assert!(x < self.width, "Column index {x} out of bounds");
        self.data[y * self.width + x]
    }

    /// Luminance at `(x, y)` on the usual 0-255 scale.
    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        f64::from(self.get_milli(x, y)) / f64::from(MILLI)
    }
}

/// Fill `out` with the luminance of every pixel in `raster` and return a view over it.
///
/// # Panics
/// Panics if `out.len()` differs from the raster's pixel count.
pub fn extract_intensity<'b>(raster: &RasterView, out: &'b mut [u32]) -> IntensityField<'b> {
    assert_eq!(
        out.len(),
        raster.pixel_count(),
        "intensity buffer must hold one value per pixel"
    );
    let channels = raster.format.channels();
    if !raster.is_empty() {
        for (y, dst_row) in out.chunks_exact_mut(raster.width).enumerate() {
            luminance_row(raster.get_row(y), channels, dst_row);
        }
    }
    IntensityField {
        data: out,
        width: raster.width,
        height: raster.height,
    }
}

/// Owned variant of [`extract_intensity`].
#[must_use]
pub fn intensity_vec(raster: &RasterView) -> Vec<u32> {
    let mut out = vec![0; raster.pixel_count()];
    extract_intensity(raster, &mut out);
    out
}

#[multiversion(targets(
    "x86_64+avx2+fma",
    "x86_64+avx512f+avx512bw+avx512dq+avx512vl",
    "aarch64+neon"
))]
fn luminance_row(src: &[u8], channels: usize, dst: &mut [u32]) {
    for (px, out) in src.chunks_exact(channels).zip(dst.iter_mut()) {
        *out = luminance_milli(px[0], px[1], px[2]);
    }
}
