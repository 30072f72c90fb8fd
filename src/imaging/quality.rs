//! Capture quality measurements shared by the pixel analyzers.
//!
//! | Metric | Measure | Reads as |
//! |---|---|---|
//! | `laplacian_variance` | variance of the 4-neighbour Laplacian over interior pixels | low: blurred |
//! | `luma_std_dev` | standard deviation of luminance | high: noisy or harsh contrast |
//! | `mean_brightness` | mean luminance | far from mid-gray: badly exposed |
//!
//! Blur and extreme exposure wash out the traces ELA and shadow analysis
//! read. Each of those analyzers turns the metrics into a confidence factor
//! through its own [`QualityDiscount`].

use super::LumaPlane;
use crate::config::QualityDiscount;
use serde::{Deserialize, Serialize};

/// Quality metrics of one analysis buffer, on 8-bit luminance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub laplacian_variance: f64,
    pub luma_std_dev: f64,
    pub mean_brightness: f64,
}

/// What a [`QualityDiscount`] made of a set of metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityVerdict {
    pub blurred: bool,
    pub poorly_exposed: bool,
    /// Product of the applicable factors; 1.0 for a clean capture.
    pub factor: f64,
}

impl QualityMetrics {
    /// Measure a luminance plane. Planes too small for a Laplacian stencil
    /// report a variance of 0.
    pub fn measure(luma: &LumaPlane) -> Self {
        let values = luma.values();
        let n = values.len().max(1) as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            laplacian_variance: laplacian_variance(luma),
            luma_std_dev: variance.sqrt(),
            mean_brightness: mean,
        }
    }

    pub fn verdict(&self, rules: &QualityDiscount) -> QualityVerdict {
        let blurred = self.laplacian_variance < rules.blur_variance_floor;
        let poorly_exposed =
            self.mean_brightness < rules.dark_level || self.mean_brightness > rules.bright_level;
        let mut factor = 1.0;
        if blurred {
            factor *= rules.blurred_factor;
        }
        if poorly_exposed {
            factor *= rules.exposure_factor;
        }
        QualityVerdict {
            blurred,
            poorly_exposed,
            factor,
        }
    }
}

fn laplacian_variance(luma: &LumaPlane) -> f64 {
    let (width, height) = (luma.width(), luma.height());
    if width < 3 || height < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let l = luma.get(x - 1, y) + luma.get(x + 1, y) + luma.get(x, y - 1)
                + luma.get(x, y + 1)
                - 4.0 * luma.get(x, y);
            let l = l as f64;
            sum += l;
            sum_sq += l * l;
        }
    }
    let n = (width - 2) as f64 * (height - 2) as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}
