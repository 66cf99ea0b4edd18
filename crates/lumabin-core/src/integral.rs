//! Summed-area tables over intensity and squared intensity.
//!
//! Tables are padded: a W x H field produces `(W + 1) x (H + 1)` cells where row 0 and
//! column 0 are zero and cell `(x, y)` holds the sum over columns `< x` and rows `< y`.
//! This removes every boundary branch from rectangle queries.
//!
//! Cells are `u64` and accumulate with wrapping arithmetic. Inclusion-exclusion is
//! exact modulo 2^64, so a rectangle sum is exact whenever the true sum fits in a
//! `u64`, however large the table entries themselves grow.

use crate::luminance::IntensityField;
use crate::stats::Rect;
use multiversion::multiversion;

/// A borrowed, fully built summed-area table.
#[derive(Clone, Copy, Debug)]
pub struct IntegralTable<'a> {
    data: &'a [u64],
    width: usize,
    height: usize,
}

impl<'a> IntegralTable<'a> {
    /// Image width this table was built for.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height this table was built for.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw padded cells.
    #[must_use]
    pub fn as_slice(&self) -> &'a [u64] {
        self.data
    }

    /// Cell `(x, y)` of the padded table, `x <= width`, `y <= height`.
    #[inline(always)]
    pub fn at(&self, x: usize, y: usize) -> u64 {
        self.data[y * (self.width + 1) + x]
    }

    /// Sum over the inclusive rectangle by inclusion-exclusion.
    ///
    /// The rectangle must already be clamped to the image.
    #[inline(always)]
    pub fn rect_sum(&self, rect: Rect) -> u64 {
        debug_assert!(rect.x2 < self.width && rect.y2 < self.height);
        let stride = self.width + 1;
        let top = rect.y1 * stride;
        let bottom = (rect.y2 + 1) * stride;
        let a = self.data[top + rect.x1];
        let b = self.data[top + rect.x2 + 1];
        let c = self.data[bottom + rect.x1];
        let d = self.data[bottom + rect.x2 + 1];
        d.wrapping_sub(b).wrapping_sub(c).wrapping_add(a)
    }
}

/// Build both summed-area tables in one pass using running row sums.
///
/// ```text
/// I[y][x] = I[y-1][x] + rowSum(y-1, 0..x)
/// ```
///
/// Returns views over the two buffers once they are complete.
///
/// # Panics
/// Panics if either buffer does not hold exactly `(W + 1) * (H + 1)` cells.
pub fn compute_integral_images<'b>(
    field: &IntensityField,
    integral: &'b mut [u64],
    integral_sq: &'b mut [u64],
) -> (IntegralTable<'b>, IntegralTable<'b>) {
    let w = field.width;
    let h = field.height;
    let stride = w + 1;
    let len = stride * (h + 1);
    assert_eq!(integral.len(), len, "integral buffer size mismatch");
    assert_eq!(integral_sq.len(), len, "integral_sq buffer size mismatch");

    integral[..stride].fill(0);
    integral_sq[..stride].fill(0);

    for y in 1..=h {
        let src = field.get_row(y - 1);
        let (prev, cur) = integral[(y - 1) * stride..(y + 1) * stride].split_at_mut(stride);
        let (prev_sq, cur_sq) =
            integral_sq[(y - 1) * stride..(y + 1) * stride].split_at_mut(stride);
        cur[0] = 0;
        cur_sq[0] = 0;
        accumulate_row(
            src,
            &prev[1..],
            &mut cur[1..],
            &prev_sq[1..],
            &mut cur_sq[1..],
        );
    }

    (
        IntegralTable {
            data: integral,
            width: w,
            height: h,
        },
        IntegralTable {
            data: integral_sq,
            width: w,
            height: h,
        },
    )
}

/// Owned pair of summed-area tables for callers without a scratch arena.
#[derive(Clone, Debug)]
pub struct IntegralImages {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImages {
    /// Allocate and build both tables for `field`.
    #[must_use]
    pub fn compute(field: &IntensityField) -> Self {
        let len = (field.width + 1) * (field.height + 1);
        let mut sum = vec![0; len];
        let mut sum_sq = vec![0; len];
        compute_integral_images(field, &mut sum, &mut sum_sq);
        Self {
            width: field.width,
            height: field.height,
            sum,
            sum_sq,
        }
    }

    /// Table over raw intensity.
    #[must_use]
    pub fn sum(&self) -> IntegralTable<'_> {
        IntegralTable {
            data: &self.sum,
            width: self.width,
            height: self.height,
        }
    }

    /// Table over squared intensity.
    #[must_use]
    pub fn sum_sq(&self) -> IntegralTable<'_> {
        IntegralTable {
            data: &self.sum_sq,
            width: self.width,
            height: self.height,
        }
    }
}

#[multiversion(targets(
    "x86_64+avx2+fma",
    "x86_64+avx512f+avx512bw+avx512dq+avx512vl",
    "aarch64+neon"
))]
fn accumulate_row(
    src: &[u32],
    prev: &[u64],
    cur: &mut [u64],
    prev_sq: &[u64],
    cur_sq: &mut [u64],
) {
    let mut row_sum = 0u64;
    let mut row_sum_sq = 0u64;
    for x in 0..src.len() {
        let v = u64::from(src[x]);
        row_sum = row_sum.wrapping_add(v);
        row_sum_sq = row_sum_sq.wrapping_add(v * v);
        cur[x] = prev[x].wrapping_add(row_sum);
        cur_sq[x] = prev_sq[x].wrapping_add(row_sum_sq);
    }
}
