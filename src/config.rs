//! Configuration for question extraction.
//!
//! All pixel thresholds are tuned for pages rendered at 2x scale (roughly
//! 144 DPI for a letter-sized PDF). Use [`ExtractorConfig::scaled`] when the
//! raster source renders at a different resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::filters::MAX_KERNEL;

/// Flat options record for the divider detector, block detector, merger
/// and page segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum vertical gap between blocks of one question.
    pub v_gap: u32,
    /// Maximum horizontal gap between blocks of one question.
    pub h_gap: u32,
    /// Margin added around each merged block before cropping.
    pub padding: u32,
    /// Merged blocks shorter than this are dropped as noise.
    pub min_height: u32,
    /// Merged blocks narrower than this are dropped as noise.
    pub min_width: u32,

    /// Left edge of the divider search strip, as a fraction of page width.
    pub divider_strip_start: f32,
    /// Width of the divider search strip, as a fraction of page width.
    pub divider_strip_width: f32,
    /// Gray level above which a strip pixel counts as paper.
    pub divider_binary_threshold: u8,
    /// Canny low hysteresis threshold.
    pub canny_low: f32,
    /// Canny high hysteresis threshold.
    pub canny_high: f32,
    /// Largest gap bridged when tracing a line segment.
    pub hough_max_gap: u32,
    /// Segments with `|dx/dy|` at or above this are rejected.
    pub max_divider_slope: f32,
    /// Divider intercept is clamped to `[f * width, (1 - f) * width]`.
    pub divider_clamp: f32,
    /// Thickness of the band painted over the divider before block detection.
    pub mask_thickness: u32,

    /// Dilation kernel width for the gradient strategy.
    pub gradient_kernel_width: u32,
    /// Dilation kernel height for the gradient strategy.
    pub gradient_kernel_height: u32,
    /// Number of dilation passes for the gradient strategy.
    pub gradient_iterations: u32,
    /// Gradient components must be larger than this in both dimensions.
    pub gradient_min_size: u32,

    /// Window size of the adaptive mean threshold (odd).
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean.
    pub adaptive_c: f32,
    /// Side of the square dilation kernel for the adaptive strategy.
    pub adaptive_kernel: u32,
    /// Adaptive components must be larger than this in both dimensions.
    pub adaptive_min_size: u32,

    /// Components at least this fraction of the page dimension are rejected.
    pub max_block_fraction: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorConfig {
    /// Create a configuration with the default thresholds.
    pub fn new() -> Self {
        Self {
            v_gap: 45,
            h_gap: 150,
            padding: 10,
            min_height: 50,
            min_width: 100,
            divider_strip_start: 0.4,
            divider_strip_width: 0.2,
            divider_binary_threshold: 200,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_max_gap: 40,
            max_divider_slope: 0.2,
            divider_clamp: 0.3,
            mask_thickness: 20,
            gradient_kernel_width: 15,
            gradient_kernel_height: 3,
            gradient_iterations: 2,
            gradient_min_size: 10,
            adaptive_block_size: 11,
            adaptive_c: 2.0,
            adaptive_kernel: 5,
            adaptive_min_size: 15,
            max_block_fraction: 0.95,
        }
    }

    /// Set the merge gaps.
    pub fn with_gaps(mut self, h_gap: u32, v_gap: u32) -> Self {
        self.h_gap = h_gap;
        self.v_gap = v_gap;
        self
    }

    /// Set the crop padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Set the minimum question size.
    pub fn with_min_size(mut self, min_width: u32, min_height: u32) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    /// Scale the absolute pixel thresholds for a raster rendered at `factor`
    /// times the 2x reference scale.
    ///
    /// Kernel sizes, the adaptive window and ratios are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::ExtractorConfig;
    ///
    /// let half = ExtractorConfig::default().scaled(0.5);
    /// assert_eq!(half.h_gap, 75);
    /// assert_eq!(half.min_width, 50);
    /// ```
    pub fn scaled(mut self, factor: f32) -> Self {
        let scale = |v: u32| ((v as f32) * factor).round().max(0.0) as u32;
        self.v_gap = scale(self.v_gap);
        self.h_gap = scale(self.h_gap);
        self.padding = scale(self.padding);
        self.min_height = scale(self.min_height);
        self.min_width = scale(self.min_width);
        self.hough_max_gap = scale(self.hough_max_gap);
        self.mask_thickness = scale(self.mask_thickness).max(1);
        self
    }

    /// Check the configuration for values the detectors cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.divider_strip_start)
            || self.divider_strip_width <= 0.0
            || self.divider_strip_start + self.divider_strip_width > 1.0
        {
            return Err(Error::Config(format!(
                "divider strip [{}, +{}] must lie within the page",
                self.divider_strip_start, self.divider_strip_width
            )));
        }
        if !(0.0..0.5).contains(&self.divider_clamp) {
            return Err(Error::Config(format!(
                "divider_clamp must be in [0, 0.5), got {}",
                self.divider_clamp
            )));
        }
        if self.gradient_kernel_width == 0
            || self.gradient_kernel_height == 0
            || self.adaptive_kernel == 0
        {
            return Err(Error::Config("dilation kernels must be non-empty".to_string()));
        }
        let largest = self
            .gradient_kernel_width
            .max(self.gradient_kernel_height)
            .max(self.adaptive_kernel);
        if largest > MAX_KERNEL {
            return Err(Error::Config(format!(
                "dilation kernels are limited to {} pixels, got {}",
                MAX_KERNEL, largest
            )));
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(Error::Config(format!(
                "adaptive_block_size must be odd and at least 3, got {}",
                self.adaptive_block_size
            )));
        }
        if self.mask_thickness == 0 {
            return Err(Error::Config("mask_thickness must be positive".to_string()));
        }
        if self.max_block_fraction <= 0.0 || self.max_block_fraction > 1.0 {
            return Err(Error::Config(format!(
                "max_block_fraction must be in (0, 1], got {}",
                self.max_block_fraction
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
