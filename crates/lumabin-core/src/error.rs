//! Error types for raster and table construction.

/// Failure to build a view over a caller-supplied buffer.
///
/// The numeric stages themselves never fail; only the shape checks performed when
/// wrapping raw slices can.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Width times height times channels does not fit in `usize`.
    DimensionOverflow {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
        /// Channels per pixel.
        channels: usize,
    },
    /// The pixel buffer length does not match the declared dimensions.
    BufferSize {
        /// Declared width in pixels.
        width: usize,
        /// Declared height in pixels.
        height: usize,
        /// Required buffer length.
        expected: usize,
        /// Supplied buffer length.
        actual: usize,
    },
    /// A scratch or table buffer has the wrong number of cells.
    TableSize {
        /// Which buffer was rejected.
        what: &'static str,
        /// Required cell count.
        expected: usize,
        /// Supplied cell count.
        actual: usize,
    },
}

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionOverflow {
                width,
                height,
                channels,
            } => write!(
                f,
                "dimensions {width}x{height} with {channels} channels overflow the address space"
            ),
            Self::BufferSize {
                width,
                height,
                expected,
                actual,
            } => write!(
                f,
                "buffer length {actual} does not match {width}x{height} image (expected {expected})"
            ),
            Self::TableSize {
                what,
                expected,
                actual,
            } => write!(f, "{what} buffer holds {actual} cells, expected {expected}"),
        }
    }
}

impl std::error::Error for RasterError {}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, RasterError>;
