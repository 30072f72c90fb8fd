//! Shadow and illumination consistency.
//!
//! In a single photograph every surface is lit by the same sources, so the
//! dominant luminance gradient of each textured region points roughly the
//! same way. Composited content often brings its own lighting with it.
//!
//! The frame is split into a `grid_rows × grid_cols` grid. For each region,
//! over pixels whose 3×3 Sobel stencil lies fully inside the region:
//!
//! - **energy**: mean gradient magnitude
//! - **direction**: angle of the mean gradient vector (toward the brighter side)
//! - **coherence**: |mean vector| / energy, 1 when every gradient agrees
//!
//! Usable regions vote for a consensus direction (circular mean weighted by
//! mean-vector length); regions deviating by more than
//! `deviation_threshold_deg` are flagged. Angles are in image coordinates:
//! 0° points right, 90° points down.
//!
//! Images without enough structure to judge (low gradient energy, low
//! dynamic range, too few usable regions) are gated: anomaly 0 at
//! near-zero confidence. Otherwise confidence is
//! `usable_fraction × contrast × (0.5 + 0.5 × consensus_strength)`, times
//! the `shadow.quality_discount` factors for a blurred or badly exposed
//! frame.

use super::Analyzer;
use crate::config::ShadowConfig;
use crate::exif::ExifRecord;
use crate::imaging::{
    ImageBuffer, LumaPlane, angular_distance_deg, percentile_from_histogram, region_bounds,
};
use crate::types::{SignalKind, SignalResult, unit};
use tracing::debug;

pub struct ShadowAnalyzer {
    config: ShadowConfig,
}

impl ShadowAnalyzer {
    pub fn new(config: ShadowConfig) -> Self {
        Self { config }
    }
}

/// Gradient statistics of one grid region.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RegionStats {
    energy: f64,
    /// Mean gradient vector.
    vx: f64,
    vy: f64,
    coherence: f64,
    intensity: f64,
}

impl RegionStats {
    fn strength(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    fn direction_deg(&self) -> f64 {
        self.vy.atan2(self.vx).to_degrees()
    }
}

fn region_stats(luma: &LumaPlane, x_range: (u32, u32), y_range: (u32, u32)) -> RegionStats {
    let (x0, x1) = x_range;
    let (y0, y1) = y_range;
    let mut sum_mag = 0.0f64;
    let mut sum_gx = 0.0f64;
    let mut sum_gy = 0.0f64;
    let mut sum_luma = 0.0f64;
    let mut count = 0u64;

    for y in (y0 + 1)..y1.saturating_sub(1) {
        for x in (x0 + 1)..x1.saturating_sub(1) {
            let (gx, gy) = luma.sobel(x, y);
            let (gx, gy) = (gx as f64, gy as f64);
            sum_mag += gx.hypot(gy);
            sum_gx += gx;
            sum_gy += gy;
            sum_luma += luma.get(x, y) as f64;
            count += 1;
        }
    }

    if count == 0 {
        return RegionStats {
            energy: 0.0,
            vx: 0.0,
            vy: 0.0,
            coherence: 0.0,
            intensity: 0.0,
        };
    }
    let n = count as f64;
    let energy = sum_mag / n;
    let (vx, vy) = (sum_gx / n, sum_gy / n);
    let coherence = if energy > 0.0 {
        vx.hypot(vy) / energy
    } else {
        0.0
    };
    RegionStats {
        energy,
        vx,
        vy,
        coherence,
        intensity: sum_luma / n,
    }
}

impl Analyzer for ShadowAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::Shadow
    }

    fn analyze(&self, image: &ImageBuffer, _exif: Option<&ExifRecord>) -> SignalResult {
        let cfg = &self.config;
        let luma = image.luma_plane();
        let frame_energy = luma.mean_gradient_magnitude();
        let histogram = luma.histogram();
        let dynamic_range = percentile_from_histogram(&histogram, 0.95) as f64
            - percentile_from_histogram(&histogram, 0.05) as f64;

        let total_regions = (cfg.grid_rows * cfg.grid_cols) as usize;
        let mut regions = Vec::with_capacity(total_regions);
        for row in 0..cfg.grid_rows {
            let y_range = region_bounds(luma.height(), cfg.grid_rows, row);
            for col in 0..cfg.grid_cols {
                let x_range = region_bounds(luma.width(), cfg.grid_cols, col);
                regions.push(region_stats(&luma, x_range, y_range));
            }
        }
        let usable: Vec<RegionStats> = regions
            .iter()
            .copied()
            .filter(|r| r.energy >= cfg.region_min_energy && r.coherence >= cfg.min_coherence)
            .collect();

        let gate_reason = if frame_energy < cfg.min_gradient_energy {
            Some("low_gradient_energy")
        } else if dynamic_range < cfg.min_dynamic_range {
            Some("low_dynamic_range")
        } else if usable.len() < cfg.min_usable_regions {
            Some("too_few_usable_regions")
        } else {
            None
        };
        if let Some(reason) = gate_reason {
            debug!(reason, frame_energy, dynamic_range, "shadow analysis gated");
            return SignalResult::new(SignalKind::Shadow, 0.0, cfg.gated_confidence)
                .with("gated", true)
                .with("gate_reason", reason)
                .with("frame_energy", frame_energy)
                .with("dynamic_range", dynamic_range)
                .with("usable_regions", usable.len())
                .with("total_regions", total_regions);
        }

        // Summing the mean vectors weights each unit direction by its length
        let (sum_x, sum_y) = usable
            .iter()
            .fold((0.0, 0.0), |(sx, sy), r| (sx + r.vx, sy + r.vy));
        let total_weight: f64 = usable.iter().map(RegionStats::strength).sum();
        let resultant = sum_x.hypot(sum_y);
        let consensus_strength = if total_weight > 0.0 {
            resultant / total_weight
        } else {
            0.0
        };
        let consensus_deg = sum_y.atan2(sum_x).to_degrees();

        let deviations: Vec<f64> = usable
            .iter()
            .map(|r| angular_distance_deg(r.direction_deg(), consensus_deg))
            .collect();
        let flagged = deviations
            .iter()
            .filter(|&&d| d > cfg.deviation_threshold_deg)
            .count();
        let max_deviation = deviations.iter().copied().fold(0.0, f64::max);

        let fraction = flagged as f64 / usable.len() as f64;
        let excess = unit(
            (max_deviation - cfg.deviation_threshold_deg) / (180.0 - cfg.deviation_threshold_deg),
        );
        let anomaly = cfg.fraction_weight * fraction + (1.0 - cfg.fraction_weight) * excess;

        let usable_fraction = usable.len() as f64 / total_regions as f64;
        let contrast = unit(dynamic_range / cfg.full_contrast);
        let capture = image.quality().verdict(&cfg.quality_discount);
        let confidence =
            (usable_fraction * contrast * (0.5 + 0.5 * consensus_strength) * capture.factor)
                .max(cfg.gated_confidence);

        let (darkest, brightest) = usable.iter().fold((f64::MAX, f64::MIN), |(lo, hi), r| {
            (lo.min(r.intensity), hi.max(r.intensity))
        });

        debug!(
            anomaly,
            confidence,
            flagged,
            usable = usable.len(),
            consensus_deg,
            "shadow analysis complete"
        );

        SignalResult::new(SignalKind::Shadow, anomaly, confidence)
            .with("gated", false)
            .with("usable_regions", usable.len())
            .with("flagged_regions", flagged)
            .with("total_regions", total_regions)
            .with("consensus_direction_deg", consensus_deg)
            .with("consensus_strength", consensus_strength)
            .with("max_deviation_deg", max_deviation)
            .with("dynamic_range", dynamic_range)
            .with("frame_energy", frame_energy)
            .with("region_luma_spread", brightest - darkest)
            .with("blurred", capture.blurred)
            .with("poorly_exposed", capture.poorly_exposed)
    }
}
