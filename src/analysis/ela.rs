//! Error level analysis.
//!
//! A region pasted or retouched into a JPEG usually has a different
//! compression history from its surroundings, so re-saving the whole image
//! at a known quality changes that region by a different amount. The
//! analyzer re-encodes the normalized image, measures per-pixel error, and
//! scores how unevenly that error is spread across an `ela.grid` square
//! grid.
//!
//! Busy content always recompresses with more error than smooth content,
//! whatever its history. Each region's mean error is therefore divided by
//! its own texture (mean Sobel magnitude plus `texture_offset`) before
//! regions are compared.
//!
//! ## Scoring
//!
//! ```text
//! normalized = region_error / (region_texture + texture_offset)
//! localized  = clamp((max_normalized − median_normalized) / max(median_normalized, region_floor) / ratio_ceiling)
//! global     = mean(min(255, error × amplification)) / 255
//! anomaly    = global_weight × global + (1 − global_weight) × localized
//! ```
//!
//! Confidence is the product of four factors, floored at
//! `ela.min_confidence`:
//!
//! | Factor | Value |
//! |---|---|
//! | signal | `clamp(mean_error / full_signal_error)`: near-zero error everywhere says nothing |
//! | texture | `clamp(mean_gradient / full_texture_gradient)`: flat content hides edits |
//! | source | `non_jpeg_confidence` for PNG, × `downscaled_confidence` if resampled |
//! | capture | `ela.quality_discount` for blurred or badly exposed frames |

use super::Analyzer;
use crate::config::ElaConfig;
use crate::exif::ExifRecord;
use crate::imaging::{
    ImageBuffer, JpegQuality, JpegRecompressor, LumaPlane, RecompressError, Recompressor,
    SourceFormat, median, percentile_from_histogram, region_bounds,
};
use crate::types::{SignalKind, SignalResult, unit};
use tracing::{debug, warn};

pub struct ElaAnalyzer<R = JpegRecompressor> {
    config: ElaConfig,
    recompressor: R,
}

impl<R: Recompressor> ElaAnalyzer<R> {
    pub fn new(config: ElaConfig, recompressor: R) -> Self {
        Self {
            config,
            recompressor,
        }
    }
}

/// Per-pixel error statistics of one recompression.
#[derive(Debug, Clone, PartialEq)]
struct ErrorStats {
    mean_error: f64,
    mean_amplified: f64,
    max_amplified: f64,
    p99_error: u8,
    region_means: Vec<f64>,
    /// Mean Sobel magnitude of each region, same order as `region_means`.
    region_textures: Vec<f64>,
}

impl<R: Recompressor> Analyzer for ElaAnalyzer<R> {
    fn kind(&self) -> SignalKind {
        SignalKind::Ela
    }

    fn analyze(&self, image: &ImageBuffer, _exif: Option<&ExifRecord>) -> SignalResult {
        let quality = JpegQuality::new(self.config.quality);
        let recompressed = self
            .recompressor
            .recompress(image.pixels(), quality)
            .and_then(|r| {
                if r.dimensions() == image.pixels().dimensions() {
                    Ok(r)
                } else {
                    Err(RecompressError::DimensionMismatch {
                        expected: image.pixels().dimensions(),
                        got: r.dimensions(),
                    })
                }
            });
        let recompressed = match recompressed {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "recompression failed, ELA signal unavailable");
                return SignalResult::new(SignalKind::Ela, 0.0, 0.0)
                    .with("recompression_failed", true)
                    .with("error", e.to_string());
            }
        };

        let luma = image.luma_plane();
        let stats = error_stats(image, &recompressed, &luma, &self.config);
        let normalized: Vec<f64> = stats
            .region_means
            .iter()
            .zip(&stats.region_textures)
            .map(|(error, texture)| error / (texture + self.config.texture_offset))
            .collect();
        let max_region = normalized.iter().copied().fold(0.0, f64::max);
        let median_region = median(&normalized);
        let localized_ratio =
            (max_region - median_region) / median_region.max(self.config.region_floor);
        let localized = unit(localized_ratio / self.config.localized_ratio_ceiling);
        let global = unit(stats.mean_amplified / 255.0);
        let gw = self.config.global_weight;
        let anomaly = gw * global + (1.0 - gw) * localized;

        let texture = luma.mean_gradient_magnitude();
        let signal_factor = unit(stats.mean_error / self.config.full_signal_error);
        let texture_factor = unit(texture / self.config.full_texture_gradient);
        let mut source_factor = 1.0;
        if image.source_format() != SourceFormat::Jpeg {
            source_factor *= self.config.non_jpeg_confidence;
        }
        if image.downscaled() {
            source_factor *= self.config.downscaled_confidence;
        }
        let capture = image.quality().verdict(&self.config.quality_discount);
        let confidence = (signal_factor * texture_factor * source_factor * capture.factor)
            .max(self.config.min_confidence);

        debug!(
            anomaly,
            confidence,
            mean_error = stats.mean_error,
            max_region,
            median_region,
            blurred = capture.blurred,
            poorly_exposed = capture.poorly_exposed,
            "ELA complete"
        );

        SignalResult::new(SignalKind::Ela, anomaly, confidence)
            .with("quality", quality.value() as f64)
            .with("mean_error", stats.mean_error)
            .with("p99_error", stats.p99_error as f64)
            .with("max_amplified_error", stats.max_amplified)
            .with("max_normalized_region_error", max_region)
            .with("median_normalized_region_error", median_region)
            .with("localized_ratio", localized_ratio)
            .with("texture", texture)
            .with("blurred", capture.blurred)
            .with("poorly_exposed", capture.poorly_exposed)
    }
}

fn error_stats(
    image: &ImageBuffer,
    recompressed: &image::RgbImage,
    luma: &LumaPlane,
    config: &ElaConfig,
) -> ErrorStats {
    let original = image.pixels();
    let (width, height) = original.dimensions();
    let grid_x = config.grid.min(width).max(1);
    let grid_y = config.grid.min(height).max(1);

    let mut histogram = [0u64; 256];
    let mut error_sum = 0u64;
    let mut amplified_sum = 0.0f64;
    let mut max_error = 0u8;
    let mut region_means = Vec::with_capacity((grid_x * grid_y) as usize);
    let mut region_textures = Vec::with_capacity((grid_x * grid_y) as usize);

    for gy in 0..grid_y {
        let (y0, y1) = region_bounds(height, grid_y, gy);
        for gx in 0..grid_x {
            let (x0, x1) = region_bounds(width, grid_x, gx);
            let mut region_sum = 0u64;
            let mut region_count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let a = original.get_pixel(x, y).0;
                    let b = recompressed.get_pixel(x, y).0;
                    let error = (0..3).map(|c| a[c].abs_diff(b[c])).max().unwrap_or(0);
                    histogram[error as usize] += 1;
                    region_sum += error as u64;
                    region_count += 1;
                    max_error = max_error.max(error);
                    amplified_sum += (error as f64 * config.amplification).min(255.0);
                }
            }
            error_sum += region_sum;
            if region_count > 0 {
                region_means.push(region_sum as f64 / region_count as f64);
                region_textures.push(luma.region_gradient_magnitude((x0, x1), (y0, y1)));
            }
        }
    }

    let pixels = (width as u64 * height as u64).max(1) as f64;
    ErrorStats {
        mean_error: error_sum as f64 / pixels,
        mean_amplified: amplified_sum / pixels,
        max_amplified: (max_error as f64 * config.amplification).min(255.0),
        p99_error: percentile_from_histogram(&histogram, 0.99),
        region_means,
        region_textures,
    }
}
