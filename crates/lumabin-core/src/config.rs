//! Configuration types for the binarization pipeline.
//!
//! [`BinarizerConfig`] selects the thresholding method and how the output raster is
//! written. It is plain data (`Copy`) and is built with [`BinarizerConfigBuilder`].

/// Default window half-size for the local-mean method.
pub const DEFAULT_LOCAL_RADIUS: usize = 15;
/// Default window half-size for the adaptive method.
pub const DEFAULT_ADAPTIVE_WINDOW: usize = 15;
/// Default sensitivity for the adaptive method.
pub const DEFAULT_ADAPTIVE_K: f64 = 0.5;

/// Which thresholding rule to apply.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ThresholdMethod {
    /// Pixel is ink when darker than the mean of its `(2r+1)²` window.
    LocalMean {
        /// Window half-size.
        radius: usize,
    },
    /// Sauvola-style mean and deviation threshold.
    Adaptive {
        /// Window half-size.
        window: usize,
        /// Sensitivity.
        k: f64,
    },
}

impl ThresholdMethod {
    /// Adaptive method with `k` given as an integer percentage (a 0-100 slider).
    #[must_use]
    pub fn adaptive_percent(window: usize, percent: u32) -> Self {
        ThresholdMethod::Adaptive {
            window,
            k: f64::from(percent) / 100.0,
        }
    }
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        ThresholdMethod::LocalMean {
            radius: DEFAULT_LOCAL_RADIUS,
        }
    }
}

/// What to write into the alpha channel of RGBA output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphaMode {
    /// Copy alpha from the input pixel.
    #[default]
    Preserve,
    /// Force every pixel opaque.
    Opaque,
}

/// Pipeline configuration for a [`crate::Binarizer`].
///
/// # Example
/// ```
/// use lumabin_core::config::{AlphaMode, BinarizerConfig, ThresholdMethod};
///
/// let config = BinarizerConfig::builder()
///     .adaptive(10, 0.34)
///     .alpha_mode(AlphaMode::Opaque)
///     .build();
/// assert_eq!(config.method, ThresholdMethod::Adaptive { window: 10, k: 0.34 });
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinarizerConfig {
    /// Thresholding rule (default: local mean, radius 15).
    pub method: ThresholdMethod,
    /// Alpha handling for RGBA output (default: preserve).
    pub alpha_mode: AlphaMode,
    /// Classify rows on the rayon thread pool (default: true).
    /// Output is identical either way.
    pub parallel: bool,
}

impl Default for BinarizerConfig {
    fn default() -> Self {
        Self {
            method: ThresholdMethod::default(),
            alpha_mode: AlphaMode::Preserve,
            parallel: true,
        }
    }
}

impl BinarizerConfig {
    /// Create a new builder for `BinarizerConfig`.
    #[must_use]
    pub fn builder() -> BinarizerConfigBuilder {
        BinarizerConfigBuilder::default()
    }
}

/// Builder for [`BinarizerConfig`].
#[derive(Default)]
pub struct BinarizerConfigBuilder {
    method: Option<ThresholdMethod>,
    alpha_mode: Option<AlphaMode>,
    parallel: Option<bool>,
}

impl BinarizerConfigBuilder {
    /// Set the thresholding method.
    #[must_use]
    pub fn method(mut self, method: ThresholdMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Use the local-mean method with the given radius.
    #[must_use]
    pub fn local_mean(self, radius: usize) -> Self {
        self.method(ThresholdMethod::LocalMean { radius })
    }

    /// Use the adaptive method.
    #[must_use]
    pub fn adaptive(self, window: usize, k: f64) -> Self {
        self.method(ThresholdMethod::Adaptive { window, k })
    }

    /// Use the adaptive method with `k` as a percentage.
    #[must_use]
    pub fn adaptive_percent(self, window: usize, percent: u32) -> Self {
        self.method(ThresholdMethod::adaptive_percent(window, percent))
    }

    /// Set alpha handling.
    #[must_use]
    pub fn alpha_mode(mut self, mode: AlphaMode) -> Self {
        self.alpha_mode = Some(mode);
        self
    }

    /// Enable or disable row-parallel classification.
    #[must_use]
    pub fn parallel(mut self, enable: bool) -> Self {
        self.parallel = Some(enable);
        self
    }

    /// Build the configuration, using defaults for unset fields.
    #[must_use]
    pub fn build(self) -> BinarizerConfig {
        let d = BinarizerConfig::default();
        BinarizerConfig {
            method: self.method.unwrap_or(d.method),
            alpha_mode: self.alpha_mode.unwrap_or(d.alpha_mode),
            parallel: self.parallel.unwrap_or(d.parallel),
        }
    }
}
