//! Raster buffers exchanged with the I/O shell.
//!
//! Input is borrowed through [`RasterView`] so callers can hand over decoded image
//! memory without a copy. Output is an owned [`Raster`] of the same shape.

use crate::config::AlphaMode;
use crate::error::{RasterError, Result};

/// Channel layout of an 8-bit raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// Red, green, blue, alpha.
    Rgba8,
    /// Red, green, blue. No alpha channel.
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }

    /// Whether the layout carries an alpha channel.
    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }
}

/// Number of bytes required for a `width` x `height` raster in `format`.
fn required_len(width: usize, height: usize, format: PixelFormat) -> Result<usize> {
    let channels = format.channels();
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(RasterError::DimensionOverflow {
            width,
            height,
            channels,
        })
}

/// A borrowed, row-major, top-to-bottom 8-bit raster.
#[derive(Clone, Copy, Debug)]
pub struct RasterView<'a> {
    /// Packed pixel bytes, `width * height * format.channels()` long.
    pub data: &'a [u8],
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Channel layout of `data`.
    pub format: PixelFormat,
}

impl<'a> RasterView<'a> {
    /// Wrap an RGBA buffer after checking that its length is exactly `width * height * 4`.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::with_format(data, width, height, PixelFormat::Rgba8)
    }

    /// Wrap a buffer with an explicit channel layout.
    pub fn with_format(
        data: &'a [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let expected = required_len(width, height, format)?;
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
            format,
        })
    }

    /// Number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True when either dimension is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes of row `y`.
    #[inline(always)]
    pub fn get_row(&self, y: usize) -> &'a [u8] {
        assert!(y < self.height, "Row index {y} out of bounds");
        let data: &'a [u8] = self.data;
        let row_len = self.width * self.format.channels();
        let start = y * row_len;
        &data[start..start + row_len]
    }

    /// Channel bytes of pixel `(x, y)`.
    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> &'a [u8] {
        assert!(x < self.width, "Column index {x} out of bounds");
        let c = self.format.channels();
        let row: &'a [u8] = self.get_row(y);
        &row[x * c..(x + 1) * c]
    }

    /// Copy into an owned raster.
    #[must_use]
    pub fn to_raster(&self) -> Raster {
        Raster {
            data: self.data.to_vec(),
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }
}

/// An owned 8-bit raster, the shape produced by every operation in this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    /// Packed pixel bytes.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Channel layout of `data`.
    pub format: PixelFormat,
}

impl Raster {
    /// Take ownership of a buffer after validating its length.
    pub fn from_vec(
        data: Vec<u8>,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        RasterView::with_format(&data, width, height, format)?;
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Borrow as a view.
    #[must_use]
    pub fn view(&self) -> RasterView<'_> {
        RasterView {
            data: &self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Channel bytes of pixel `(x, y)`.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.format.channels();
        let idx = (y * self.width + x) * c;
        &self.data[idx..idx + c]
    }
}

/// Expand a one-byte-per-pixel mask into a raster shaped like `source`.
///
/// Every pixel gets `R = G = B = mask`. Alpha, when present, is copied from `source`
/// or forced to 255 depending on `alpha`.
///
/// # Panics
/// Panics if `mask` does not hold one byte per pixel of `source`.
#[must_use]
pub fn mask_to_raster(source: &RasterView, mask: &[u8], alpha: AlphaMode) -> Raster {
    assert_eq!(
        mask.len(),
        source.pixel_count(),
        "mask must hold one byte per pixel"
    );
    let channels = source.format.channels();
    let mut data = vec![0u8; source.data.len()];
    for ((dst, src), &m) in data
        .chunks_exact_mut(channels)
        .zip(source.data.chunks_exact(channels))
        .zip(mask)
    {
        dst[..3].fill(m);
        if source.format.has_alpha() {
            dst[3] = match alpha {
                AlphaMode::Preserve => src[3],
                AlphaMode::Opaque => u8::MAX,
            };
        }
    }
    Raster {
        data,
        width: source.width,
        height: source.height,
        format: source.format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_view_rows() {
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, // row 0
            7, 8, 9, 255, 10, 11, 12, 255, // row 1
        ];
        let view = RasterView::new(&data, 2, 2).unwrap();
        assert_eq!(view.get_row(1), &[7, 8, 9, 255, 10, 11, 12, 255]);
        assert_eq!(view.get_pixel(1, 0), &[4, 5, 6, 255]);
        assert_eq!(view.pixel_count(), 4);
    }

    #[test]
    fn test_rgb_layout() {
        let data = vec![10, 20, 30, 40, 50, 60];
        let view = RasterView::with_format(&data, 2, 1, PixelFormat::Rgb8).unwrap();
        assert_eq!(view.get_pixel(1, 0), &[40, 50, 60]);
        assert!(!view.format.has_alpha());
    }

    #[test]
    fn test_invalid_buffer_size() {
        let data = vec![0u8; 15];
        let err = RasterView::new(&data, 2, 2).unwrap_err();
        assert_eq!(
            err,
            RasterError::BufferSize {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_zero_sized_raster_is_valid() {
        let view = RasterView::new(&[], 0, 7).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.pixel_count(), 0);
    }

    #[test]
    fn test_dimension_overflow() {
        let err = RasterView::new(&[], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, RasterError::DimensionOverflow { .. }));
    }

    #[test]
    fn test_mask_to_raster_alpha_modes() {
        let data = [9, 9, 9, 10, 9, 9, 9, 200];
        let view = RasterView::new(&data, 2, 1).unwrap();
        let kept = mask_to_raster(&view, &[0, 255], AlphaMode::Preserve);
        assert_eq!(kept.data, vec![0, 0, 0, 10, 255, 255, 255, 200]);
        let opaque = mask_to_raster(&view, &[0, 255], AlphaMode::Opaque);
        assert_eq!(opaque.data, vec![0, 0, 0, 255, 255, 255, 255, 255]);
    }

    #[test]
    fn test_mask_to_raster_rgb() {
        let data = [1, 2, 3, 4, 5, 6];
        let view = RasterView::with_format(&data, 1, 2, PixelFormat::Rgb8).unwrap();
        let out = mask_to_raster(&view, &[255, 0], AlphaMode::Opaque);
        assert_eq!(out.data, vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(out.format, PixelFormat::Rgb8);
    }
}
