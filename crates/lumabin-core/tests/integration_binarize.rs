#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use lumabin_core::config::{AlphaMode, BinarizerConfig};
use lumabin_core::integral::IntegralImages;
use lumabin_core::luminance::{IntensityField, intensity_vec};
use lumabin_core::stats::{Rect, RegionOracle};
use lumabin_core::test_utils::{checkerboard, gray_raster, solid_raster};
use lumabin_core::{Binarizer, LocalMean, PixelFormat, RasterView, Sauvola, binarize};

fn mask_of(raster: &lumabin_core::Raster) -> Vec<u8> {
    raster
        .data
        .chunks_exact(raster.format.channels())
        .map(|px| px[0])
        .collect()
}

#[test]
fn test_checkerboard_4x4_radius_1() {
    // Cells alternate 0 / 255 starting with 0 at the top-left.
    //
    // Every window of radius 1 on a 4x4 board contains both levels, so its mean lies
    // strictly between 0 and 255: dark pixels fall below it and bright pixels sit above
    // it. E.g. (0,0): window {0,255,255,0} mean 127.5; (1,1): eight neighbours
    // {0,255,0,255,255,0,255,0} + centre 0 -> 1020/9 = 113.3; (2,1) bright centre with
    // five 255s -> 1275/9 = 141.7. The output therefore reproduces the input.
    let img = checkerboard(4, 4, 1, 0, 255);
    let config = BinarizerConfig::builder().local_mean(1).build();
    let mut binarizer = Binarizer::with_config(config);
    let out = binarizer.binarize(&img.view());

    #[rustfmt::skip]
    let expected: [u8; 16] = [
          0, 255,   0, 255,
        255,   0, 255,   0,
          0, 255,   0, 255,
        255,   0, 255,   0,
    ];
    assert_eq!(mask_of(&out), expected);
}

#[test]
fn test_radius_zero_is_all_background() {
    let levels: Vec<u8> = (0..(13 * 7)).map(|i| ((i * 37 + 11) % 256) as u8).collect();
    let img = gray_raster(13, 7, &levels);
    let out = binarize(&img.view(), &LocalMean { radius: 0 }, AlphaMode::Preserve);
    assert!(mask_of(&out).iter().all(|&v| v == 255));
}

#[test]
fn test_uniform_image_any_radius_is_background() {
    let img = gray_raster(9, 6, &[200; 54]);
    for radius in [0, 1, 2, 5, 9, 100] {
        let out = binarize(&img.view(), &LocalMean { radius }, AlphaMode::Preserve);
        assert!(
            mask_of(&out).iter().all(|&v| v == 255),
            "radius {radius} produced ink on a flat image"
        );
    }
}

#[test]
fn test_flat_colour_image_is_background() {
    // Luminance 132.384: not an integer, so window means are not trivially exact.
    let img = solid_raster(64, 64, [119, 161, 29, 255]);
    let local = binarize(&img.view(), &LocalMean { radius: 5 }, AlphaMode::Preserve);
    assert!(mask_of(&local).iter().all(|&v| v == 255));
    let adaptive = binarize(&img.view(), &Sauvola::new(5, 0.0), AlphaMode::Preserve);
    assert!(mask_of(&adaptive).iter().all(|&v| v == 255));
}

#[test]
fn test_flat_colour_sweep_is_background() {
    let mut binarizer = Binarizer::with_config(BinarizerConfig::builder().local_mean(5).build());
    let mut offenders = Vec::new();
    for r in (0..=255u8).step_by(17) {
        for g in (0..=255u8).step_by(23) {
            for b in (0..=255u8).step_by(29) {
                let img = solid_raster(24, 24, [r, g, b, 255]);
                let mask = binarizer.binarize_mask(&img.view());
                if mask.iter().any(|&v| v == 0) {
                    offenders.push([r, g, b]);
                }
            }
        }
    }
    assert!(offenders.is_empty(), "ink on flat colours: {offenders:?}");
}

#[test]
fn test_adaptive_uniform_matches_sign_of_intensity_minus_threshold() {
    let img = gray_raster(6, 5, &[100; 30]);
    for k in [-0.4, 0.0, 0.3, 1.0, 1.5] {
        let out = binarize(&img.view(), &Sauvola::new(2, k), AlphaMode::Preserve);
        let t = 100.0 * (1.0 - k);
        let expected = if 100.0 < t { 0 } else { 255 };
        assert!(mask_of(&out).iter().all(|&v| v == expected), "k = {k}");
    }
}

#[test]
fn test_local_mean_is_idempotent_on_its_output() {
    // Black block with a few isolated specks on white.
    let (w, h) = (16, 12);
    let mut levels = vec![255u8; w * h];
    for y in 3..8 {
        for x in 4..11 {
            levels[y * w + x] = 0;
        }
    }
    for &(x, y) in &[(1, 1), (14, 2), (2, 10), (13, 10)] {
        levels[y * w + x] = 0;
    }
    let img = gray_raster(w, h, &levels);

    let config = BinarizerConfig::builder().local_mean(2).build();
    let mut binarizer = Binarizer::with_config(config);
    let once = binarizer.binarize(&img.view());
    let twice = binarizer.binarize(&once.view());
    assert_eq!(once, twice);
    // The interior of the block has no white within reach and turns background.
    assert_eq!(mask_of(&once)[5 * w + 7], 255);
    // Its outline stays ink.
    assert_eq!(mask_of(&once)[3 * w + 4], 0);
}

#[test]
fn test_region_sums_match_brute_force_on_raster() {
    let levels: Vec<u8> = (0..25).map(|i| (i * 10) as u8).collect();
    let img = gray_raster(5, 5, &levels);
    let values = intensity_vec(&img.view());
    let field = IntensityField::new(&values, 5, 5).unwrap();
    let tables = IntegralImages::compute(&field);
    let oracle = RegionOracle::new(field, tables.sum(), tables.sum_sq()).unwrap();

    let rect = Rect::new(1, 1, 3, 4);
    let mut expected = 0u64;
    for y in 1..=4 {
        for x in 1..=3 {
            expected += u64::from(values[y * 5 + x]);
        }
    }
    assert_eq!(oracle.sum(rect), expected);
    assert_eq!(oracle.count(rect), 12);
}

#[test]
fn test_alpha_preserved_and_forced() {
    let mut data = Vec::new();
    for i in 0..16u8 {
        let g = if i % 3 == 0 { 10 } else { 240 };
        data.extend_from_slice(&[g, g, g, i * 10]);
    }
    let view = RasterView::new(&data, 4, 4).unwrap();

    let kept = binarize(&view, &LocalMean { radius: 1 }, AlphaMode::Preserve);
    for (px, src) in kept.data.chunks_exact(4).zip(data.chunks_exact(4)) {
        assert_eq!(px[3], src[3]);
        assert!(px[0] == 0 || px[0] == 255);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    let opaque = binarize(&view, &LocalMean { radius: 1 }, AlphaMode::Opaque);
    assert!(opaque.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn test_rgb_input_keeps_rgb_layout() {
    let data: Vec<u8> = (0..(5 * 5 * 3)).map(|i| ((i * 53) % 256) as u8).collect();
    let view = RasterView::with_format(&data, 5, 5, PixelFormat::Rgb8).unwrap();
    let out = binarize(&view, &Sauvola::new(1, 0.2), AlphaMode::Opaque);
    assert_eq!(out.format, PixelFormat::Rgb8);
    assert_eq!(out.data.len(), data.len());
}

#[test]
fn test_rerun_is_bit_identical() {
    let img = checkerboard(33, 17, 5, 60, 190);
    let a = binarize(&img.view(), &Sauvola::new(4, 0.35), AlphaMode::Preserve);
    let b = binarize(&img.view(), &Sauvola::new(4, 0.35), AlphaMode::Preserve);
    assert_eq!(a, b);
}
