//! Tone adjustments that run before or after binarization.

use crate::image::{Raster, RasterView};
use crate::luminance::{MAX_MILLI, MILLI, intensity_vec};

/// Invert the colour channels, `c -> 255 - c`. Alpha is copied unchanged.
#[must_use]
pub fn invert(raster: &RasterView) -> Raster {
    let channels = raster.format.channels();
    let mut out = raster.to_raster();
    for px in out.data.chunks_exact_mut(channels) {
        for c in &mut px[..3] {
            *c = u8::MAX - *c;
        }
    }
    out
}

/// Stretch luminance linearly so the darkest pixel maps to 0 and the brightest to 255.
///
/// The result is grey (`R = G = B`); alpha is copied unchanged. A flat image has no
/// range to stretch and maps entirely to 0. Values are rounded half-to-even.
#[must_use]
pub fn linear_stretch(raster: &RasterView) -> Raster {
    let channels = raster.format.channels();
    let intensity = intensity_vec(raster);
    let (min, max) = intensity
        .iter()
        .fold((MAX_MILLI, 0), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    // A flat image stretches by one luminance unit, which maps it to 0.
    let range = if max > min { max - min } else { MILLI };
    tracing::debug!(min, max, "linear stretch range");

    let mut out = raster.to_raster();
    for (px, &v) in out.data.chunks_exact_mut(channels).zip(&intensity) {
        let g = stretch_value(v, min, range);
        px[..3].fill(g);
    }
    out
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stretch_value(v: u32, min: u32, range: u32) -> u8 {
    (f64::from(v - min) * 255.0 / f64::from(range))
        .clamp(0.0, 255.0)
        .round_ties_even() as u8
}
