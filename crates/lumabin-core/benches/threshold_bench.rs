#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use divan::bench;
use lumabin_core::Binarizer;
use lumabin_core::config::BinarizerConfig;
use lumabin_core::test_utils::{DocumentParams, generate_document};

fn main() {
    divan::main();
}

fn document_1080p() -> lumabin_core::Raster {
    let params = DocumentParams {
        width: 1920,
        height: 1080,
        noise_sigma: 5.0,
        ..Default::default()
    };
    generate_document(&params).0
}

#[bench(args = [1, 7, 25])]
fn bench_local_mean_1080p(bencher: divan::Bencher, radius: usize) {
    let img = document_1080p();
    let mut binarizer =
        Binarizer::with_config(BinarizerConfig::builder().local_mean(radius).build());

    bencher.bench_local(move || binarizer.binarize_mask(&img.view()));
}

#[bench(args = [1, 7, 25])]
fn bench_sauvola_1080p(bencher: divan::Bencher, window: usize) {
    let img = document_1080p();
    let mut binarizer =
        Binarizer::with_config(BinarizerConfig::builder().adaptive(window, 0.34).build());

    bencher.bench_local(move || binarizer.binarize_mask(&img.view()));
}

#[bench]
fn bench_sauvola_1080p_serial(bencher: divan::Bencher) {
    let img = document_1080p();
    let mut binarizer = Binarizer::with_config(
        BinarizerConfig::builder()
            .adaptive(7, 0.34)
            .parallel(false)
            .build(),
    );

    bencher.bench_local(move || binarizer.binarize_mask(&img.view()));
}
