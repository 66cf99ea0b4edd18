//! lumabin CLI: load an image, binarize or adjust it, write a PNG.

use clap::{Args, Parser, Subcommand};
use lumabin_core::adjust::{invert, linear_stretch};
use lumabin_core::config::{AlphaMode, BinarizerConfig, ThresholdMethod};
use lumabin_core::{Binarizer, Raster, RasterView};
use std::path::PathBuf;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "lumabin")]
#[command(about = "Binarize images with local-mean or Sauvola-style thresholds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Threshold each pixel against the mean of its window.
    Local {
        #[command(flatten)]
        io: IoArgs,

        /// Window half-size in pixels.
        #[arg(long, default_value_t = 15)]
        radius: usize,

        /// Write alpha 255 instead of copying it from the input.
        #[arg(long)]
        opaque: bool,
    },

    /// Sauvola-style threshold from window mean and deviation.
    Adaptive {
        #[command(flatten)]
        io: IoArgs,

        /// Window half-size in pixels.
        #[arg(long, default_value_t = 15)]
        window: usize,

        /// Sensitivity k.
        #[arg(long, conflicts_with = "k_percent")]
        k: Option<f64>,

        /// Sensitivity as a percentage (0-100), k = percent / 100.
        #[arg(long)]
        k_percent: Option<u32>,

        /// Write alpha 255 instead of copying it from the input.
        #[arg(long)]
        opaque: bool,
    },

    /// Invert colour channels.
    Invert {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Stretch luminance to the full 0-255 range (grey output).
    Stretch {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Debug, Clone, Args)]
struct IoArgs {
    /// Path to the input image.
    #[arg(long)]
    input: PathBuf,

    /// Path to write the result (PNG).
    #[arg(long)]
    output: PathBuf,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Local { io, radius, opaque } => {
            run_threshold(&io, ThresholdMethod::LocalMean { radius }, opaque)
        }
        Commands::Adaptive {
            io,
            window,
            k,
            k_percent,
            opaque,
        } => {
            let method = match (k, k_percent) {
                (Some(k), _) => ThresholdMethod::Adaptive { window, k },
                (None, Some(p)) => ThresholdMethod::adaptive_percent(window, p),
                (None, None) => ThresholdMethod::Adaptive {
                    window,
                    k: lumabin_core::config::DEFAULT_ADAPTIVE_K,
                },
            };
            run_threshold(&io, method, opaque)
        }
        Commands::Invert { io } => run_adjust(&io, invert),
        Commands::Stretch { io } => run_adjust(&io, linear_stretch),
    }
}

fn run_threshold(io: &IoArgs, method: ThresholdMethod, opaque: bool) -> CliResult<()> {
    let rgba = load_rgba(io)?;
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let view = RasterView::new(rgba.as_raw(), width, height)?;

    let alpha_mode = if opaque {
        AlphaMode::Opaque
    } else {
        AlphaMode::Preserve
    };
    let config = BinarizerConfig::builder()
        .method(method)
        .alpha_mode(alpha_mode)
        .build();
    let mut binarizer = Binarizer::with_config(config);
    let (out, stats) = binarizer.binarize_with_stats(&view);

    tracing::info!(
        "Binarized {}x{} in {:.2} ms (luminance {:.2}, integral {:.2}, threshold {:.2})",
        width,
        height,
        stats.total_ms,
        stats.luminance_ms,
        stats.integral_ms,
        stats.threshold_ms
    );
    tracing::info!(
        "{} of {} pixels classified as ink",
        stats.ink_pixels,
        stats.pixel_count
    );

    save_png(io, out)
}

fn run_adjust(io: &IoArgs, op: fn(&RasterView) -> Raster) -> CliResult<()> {
    let rgba = load_rgba(io)?;
    let view = RasterView::new(rgba.as_raw(), rgba.width() as usize, rgba.height() as usize)?;
    save_png(io, op(&view))
}

fn load_rgba(io: &IoArgs) -> CliResult<image::RgbaImage> {
    tracing::info!("Loading image: {}", io.input.display());
    let img = image::open(&io.input).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", io.input.display(), e).into()
    })?;
    let rgba = img.to_rgba8();
    tracing::info!("Image size: {}x{}", rgba.width(), rgba.height());
    Ok(rgba)
}

fn save_png(io: &IoArgs, raster: Raster) -> CliResult<()> {
    let width = u32::try_from(raster.width)?;
    let height = u32::try_from(raster.height)?;
    let out = image::RgbaImage::from_raw(width, height, raster.data)
        .ok_or("output buffer does not match image dimensions")?;
    out.save_with_format(&io.output, image::ImageFormat::Png)
        .map_err(|e| -> CliError {
            format!("Failed to write {}: {}", io.output.display(), e).into()
        })?;
    tracing::info!("Result written to {}", io.output.display());
    Ok(())
}
