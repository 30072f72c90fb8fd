//! Forensics configuration.
//!
//! Every constant the analyzers, fusion and severity stages depend on is a
//! named, documented value here so it can be calibrated without code changes.
//! Stock defaults are overridden by an optional user `civic-eye.toml`:
//!
//! ```toml
//! # All options are optional - defaults shown in `civic-eye gen-config`
//!
//! [limits]
//! max_input_bytes = 26214400  # Reject larger uploads before parsing
//! analysis_max_edge = 2048    # Downscale so the longer edge fits
//!
//! [ela]
//! quality = 90                # Recompression JPEG quality
//!
//! [fusion]
//! ela_weight = 0.38
//! shadow_weight = 0.33
//! metadata_weight = 0.29
//!
//! [severity]
//! floors = [80, 60, 40, 20, 0]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: the user file is merged key-by-key onto the
//! stock defaults ([`merge_toml`]) before deserializing, so overriding one
//! weight leaves the rest untouched. Arrays are replaced wholesale.
//!
//! Unknown keys are rejected to catch typos early.

use crate::severity::SeverityTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete forensics configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForensicsConfig {
    /// Input size ceilings and analysis resolution.
    pub limits: LimitsConfig,
    /// Error level analysis tunables.
    pub ela: ElaConfig,
    /// Metadata analyzer tunables.
    pub metadata: MetadataConfig,
    /// Shadow consistency tunables.
    pub shadow: ShadowConfig,
    /// Signal weights and the neutral fallback.
    pub fusion: FusionConfig,
    /// Severity lookup table.
    pub severity: SeverityTable,
    /// Parallelism.
    pub processing: ProcessingConfig,
}

impl ForensicsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.ela.validate()?;
        self.metadata.validate()?;
        self.shadow.validate()?;
        self.fusion.validate()?;
        self.severity.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be within 0.0-1.0")))
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be positive")))
    }
}

/// Resource ceilings. Exceeding any of the `max_*` values fails the
/// invocation before analysis; `analysis_max_edge` only downscales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest accepted encoded input, in bytes.
    pub max_input_bytes: u64,
    /// Largest accepted width or height of the source image.
    pub max_source_edge: u32,
    /// Largest accepted source pixel count (decompression bomb guard).
    pub max_source_pixels: u64,
    /// Longer edge of the buffer the analyzers see.
    pub analysis_max_edge: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 25 * 1024 * 1024,
            max_source_edge: 12_000,
            max_source_pixels: 50_000_000,
            analysis_max_edge: 2048,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 || self.max_source_edge == 0 || self.max_source_pixels == 0
        {
            return Err(ConfigError::Validation(
                "limits.max_* values must be non-zero".into(),
            ));
        }
        if self.analysis_max_edge < 16 {
            return Err(ConfigError::Validation(
                "limits.analysis_max_edge must be at least 16".into(),
            ));
        }
        Ok(())
    }
}

/// Error level analysis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElaConfig {
    /// JPEG quality used for the recompressed copy (1-100).
    pub quality: u8,
    /// Multiplier applied to raw differences for the amplified error map.
    pub amplification: f64,
    /// Regions per side for localized error statistics.
    pub grid: u32,
    /// Added to each region's mean gradient (levels/pixel) before dividing
    /// its error by it, so smooth regions are not divided by zero.
    pub texture_offset: f64,
    /// Lower bound on the median texture-normalized region error when
    /// computing the localized ratio.
    pub region_floor: f64,
    /// Localized ratio that maps to anomaly 1.0.
    pub localized_ratio_ceiling: f64,
    /// Share of the anomaly score taken from the frame-wide error level.
    pub global_weight: f64,
    /// Mean error (levels) at which the recompression signal counts as full.
    pub full_signal_error: f64,
    /// Mean luminance gradient (levels/pixel) at which texture counts as full.
    pub full_texture_gradient: f64,
    /// Confidence factor for sources that were never JPEG compressed.
    pub non_jpeg_confidence: f64,
    /// Confidence factor when the buffer was downscaled before analysis.
    pub downscaled_confidence: f64,
    /// Confidence floor.
    pub min_confidence: f64,
    /// Discounts for blurred or badly exposed captures.
    pub quality_discount: QualityDiscount,
}

impl Default for ElaConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            amplification: 10.0,
            grid: 8,
            texture_offset: 1.0,
            region_floor: 0.25,
            localized_ratio_ceiling: 3.0,
            global_weight: 0.3,
            full_signal_error: 1.5,
            full_texture_gradient: 2.0,
            non_jpeg_confidence: 0.5,
            downscaled_confidence: 0.6,
            min_confidence: 0.02,
            quality_discount: QualityDiscount::default(),
        }
    }
}

impl ElaConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("ela.quality must be 1-100".into()));
        }
        if !(1..=64).contains(&self.grid) {
            return Err(ConfigError::Validation("ela.grid must be 1-64".into()));
        }
        check_positive("ela.amplification", self.amplification)?;
        check_positive("ela.texture_offset", self.texture_offset)?;
        check_positive("ela.region_floor", self.region_floor)?;
        check_positive("ela.localized_ratio_ceiling", self.localized_ratio_ceiling)?;
        check_positive("ela.full_signal_error", self.full_signal_error)?;
        check_positive("ela.full_texture_gradient", self.full_texture_gradient)?;
        check_unit("ela.global_weight", self.global_weight)?;
        check_unit("ela.non_jpeg_confidence", self.non_jpeg_confidence)?;
        check_unit("ela.downscaled_confidence", self.downscaled_confidence)?;
        check_unit("ela.min_confidence", self.min_confidence)?;
        self.quality_discount.validate("ela.quality_discount")?;
        Ok(())
    }
}

/// Metadata analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Case-insensitive substrings identifying image editing tools.
    pub editor_signatures: Vec<String>,
    /// Anomaly added when a software field matches an editor signature.
    pub editor_increment: f64,
    /// Anomaly added when software is recorded but camera make/model are not.
    pub missing_camera_increment: f64,
    /// Anomaly added for a future, implausibly old or unreadable capture time.
    pub implausible_timestamp_increment: f64,
    /// Anomaly added when the file was modified well after capture.
    pub modified_after_capture_increment: f64,
    /// Anomaly reported when no metadata is present at all.
    pub missing_anomaly: f64,
    /// Confidence when no metadata is present at all.
    pub missing_confidence: f64,
    /// Confidence for a well-populated metadata block.
    pub present_confidence: f64,
    /// Confidence for a metadata block with only a few tags.
    pub sparse_confidence: f64,
    /// Tag count at which a block counts as well-populated.
    pub min_tags_for_full_confidence: usize,
    /// Allowed clock skew for capture times after the reference time.
    pub future_tolerance_secs: i64,
    /// Capture years before this are implausible.
    pub earliest_plausible_year: i32,
    /// Gap between capture and modification time that counts as an edit.
    pub modify_gap_secs: i64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            editor_signatures: [
                "photoshop",
                "gimp",
                "paint.net",
                "paint shop",
                "mspaint",
                "pixelmator",
                "affinity photo",
                "photopea",
                "snapseed",
                "picsart",
                "facetune",
                "meitu",
                "fotor",
                "canva",
                "lightroom",
                "krita",
                "photoscape",
                "corel",
                "editor",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            editor_increment: 0.9,
            missing_camera_increment: 0.3,
            implausible_timestamp_increment: 0.25,
            modified_after_capture_increment: 0.1,
            missing_anomaly: 0.25,
            missing_confidence: 0.1,
            present_confidence: 0.9,
            sparse_confidence: 0.5,
            min_tags_for_full_confidence: 3,
            future_tolerance_secs: 86_400,
            earliest_plausible_year: 1990,
            modify_gap_secs: 60,
        }
    }
}

impl MetadataConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.editor_signatures.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "metadata.editor_signatures must not contain empty entries".into(),
            ));
        }
        check_unit("metadata.editor_increment", self.editor_increment)?;
        check_unit("metadata.missing_camera_increment", self.missing_camera_increment)?;
        check_unit(
            "metadata.implausible_timestamp_increment",
            self.implausible_timestamp_increment,
        )?;
        check_unit(
            "metadata.modified_after_capture_increment",
            self.modified_after_capture_increment,
        )?;
        check_unit("metadata.missing_anomaly", self.missing_anomaly)?;
        check_unit("metadata.missing_confidence", self.missing_confidence)?;
        check_unit("metadata.present_confidence", self.present_confidence)?;
        check_unit("metadata.sparse_confidence", self.sparse_confidence)?;
        if self.future_tolerance_secs < 0 || self.modify_gap_secs < 0 {
            return Err(ConfigError::Validation(
                "metadata time tolerances must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Shadow consistency settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadowConfig {
    pub grid_rows: u32,
    pub grid_cols: u32,
    /// Frame-wide mean gradient magnitude (levels/pixel) required to analyze.
    pub min_gradient_energy: f64,
    /// Per-region mean gradient magnitude required for a usable region.
    pub region_min_energy: f64,
    /// Per-region gradient coherence (0-1) required for a usable region.
    pub min_coherence: f64,
    /// Luminance p95-p5 spread (levels) required to analyze.
    pub min_dynamic_range: f64,
    /// Usable regions required to analyze.
    pub min_usable_regions: usize,
    /// Dynamic range (levels) at which contrast counts as full.
    pub full_contrast: f64,
    /// Deviation from consensus (degrees) beyond which a region is flagged.
    pub deviation_threshold_deg: f64,
    /// Share of the anomaly score taken from the flagged-region fraction.
    pub fraction_weight: f64,
    /// Confidence reported when the gradient gate is not met.
    pub gated_confidence: f64,
    /// Discounts for blurred or badly exposed captures.
    pub quality_discount: QualityDiscount,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            grid_rows: 4,
            grid_cols: 4,
            min_gradient_energy: 0.5,
            region_min_energy: 0.5,
            min_coherence: 0.2,
            min_dynamic_range: 16.0,
            min_usable_regions: 3,
            full_contrast: 64.0,
            deviation_threshold_deg: 60.0,
            fraction_weight: 0.6,
            gated_confidence: 0.02,
            quality_discount: QualityDiscount {
                blurred_factor: 0.8,
                exposure_factor: 0.6,
                ..QualityDiscount::default()
            },
        }
    }
}

impl ShadowConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=32).contains(&self.grid_rows) || !(1..=32).contains(&self.grid_cols) {
            return Err(ConfigError::Validation(
                "shadow.grid_rows and shadow.grid_cols must be 1-32".into(),
            ));
        }
        if self.min_usable_regions == 0
            || self.min_usable_regions > (self.grid_rows * self.grid_cols) as usize
        {
            return Err(ConfigError::Validation(
                "shadow.min_usable_regions must be between 1 and the region count".into(),
            ));
        }
        if !(0.0..180.0).contains(&self.deviation_threshold_deg) {
            return Err(ConfigError::Validation(
                "shadow.deviation_threshold_deg must be within 0-180".into(),
            ));
        }
        check_positive("shadow.full_contrast", self.full_contrast)?;
        check_unit("shadow.min_coherence", self.min_coherence)?;
        check_unit("shadow.fraction_weight", self.fraction_weight)?;
        check_unit("shadow.gated_confidence", self.gated_confidence)?;
        self.quality_discount.validate("shadow.quality_discount")?;
        if self.min_gradient_energy < 0.0
            || self.region_min_energy < 0.0
            || self.min_dynamic_range < 0.0
        {
            return Err(ConfigError::Validation(
                "shadow gate thresholds must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Confidence discounts applied by a pixel analyzer when the capture itself
/// hides the evidence: a blurred frame or a badly under- or overexposed one.
///
/// The metrics are those of [`crate::imaging::QualityMetrics`]. Both
/// factors multiply when both conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityDiscount {
    /// Laplacian variance below which the frame counts as blurred.
    pub blur_variance_floor: f64,
    /// Confidence factor for a blurred frame.
    pub blurred_factor: f64,
    /// Mean luminance (levels) below which the frame counts as underexposed.
    pub dark_level: f64,
    /// Mean luminance (levels) above which the frame counts as overexposed.
    pub bright_level: f64,
    /// Confidence factor for an under- or overexposed frame.
    pub exposure_factor: f64,
}

impl Default for QualityDiscount {
    fn default() -> Self {
        Self {
            blur_variance_floor: 50.0,
            blurred_factor: 0.6,
            dark_level: 30.0,
            bright_level: 220.0,
            exposure_factor: 0.7,
        }
    }
}

impl QualityDiscount {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if !self.blur_variance_floor.is_finite() || self.blur_variance_floor < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{section}.blur_variance_floor must not be negative"
            )));
        }
        if !(0.0..=255.0).contains(&self.dark_level)
            || !(0.0..=255.0).contains(&self.bright_level)
            || self.dark_level >= self.bright_level
        {
            return Err(ConfigError::Validation(format!(
                "{section}: dark_level must be below bright_level, both within 0-255"
            )));
        }
        check_unit(&format!("{section}.blurred_factor"), self.blurred_factor)?;
        check_unit(&format!("{section}.exposure_factor"), self.exposure_factor)?;
        Ok(())
    }
}

/// Trust fusion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FusionConfig {
    pub ela_weight: f64,
    pub shadow_weight: f64,
    pub metadata_weight: f64,
    /// Score reported when no signal has any confidence.
    pub neutral_score: u8,
    /// Weighted mean confidence below which the score is pulled toward
    /// `neutral_score` in proportion to the missing evidence.
    pub min_evidence: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            ela_weight: 0.38,
            shadow_weight: 0.33,
            metadata_weight: 0.29,
            neutral_score: 50,
            min_evidence: 0.35,
        }
    }
}

impl FusionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("fusion.ela_weight", self.ela_weight)?;
        check_positive("fusion.shadow_weight", self.shadow_weight)?;
        check_positive("fusion.metadata_weight", self.metadata_weight)?;
        if !(self.ela_weight > self.shadow_weight && self.shadow_weight > self.metadata_weight) {
            return Err(ConfigError::Validation(
                "fusion weights must be ordered ela > shadow > metadata".into(),
            ));
        }
        if self.neutral_score > 100 {
            return Err(ConfigError::Validation(
                "fusion.neutral_score must be 0-100".into(),
            ));
        }
        check_unit("fusion.min_evidence", self.min_evidence)?;
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Run the three analyzers of one invocation concurrently.
    pub parallel_analyzers: bool,
    /// Maximum worker threads for batch scoring.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_analyzers: true,
            max_threads: None,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ForensicsConfig::default()).map_err(|e| {
        ConfigError::Validation(format!("default config failed to serialize: {e}"))
    })
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ForensicsConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ForensicsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, merging it over the stock defaults.
///
/// A missing file is an error: the caller asked for it explicitly.
pub fn load_config(path: &Path) -> Result<ForensicsConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(overlay))
}

/// Load `path` when given, otherwise the stock defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ForensicsConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => resolve_config(None),
    }
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# civic-eye configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Input limits
# ---------------------------------------------------------------------------
[limits]
# Largest accepted upload in bytes (25 MiB).
max_input_bytes = 26214400
# Largest accepted width or height of the source image.
max_source_edge = 12000
# Largest accepted source pixel count.
max_source_pixels = 50000000
# Images are downscaled so their longer edge fits this bound before analysis.
analysis_max_edge = 2048

# ---------------------------------------------------------------------------
# Error level analysis
# ---------------------------------------------------------------------------
[ela]
# JPEG quality of the recompressed copy.
quality = 90
# Multiplier applied to differences for the amplified error map.
amplification = 10.0
# Regions per side for localized statistics.
grid = 8
# Each region's mean error is divided by (its mean gradient + texture_offset)
# so busy regions are not mistaken for differently compressed ones.
texture_offset = 1.0
# Floor on the median texture-normalized region error in the localized ratio.
region_floor = 0.25
# Localized ratio that maps to anomaly 1.0.
localized_ratio_ceiling = 3.0
# Share of the anomaly taken from the frame-wide error level.
global_weight = 0.3
# Mean error (levels) at which the signal counts as full strength.
full_signal_error = 1.5
# Mean luminance gradient (levels/pixel) at which texture counts as full.
full_texture_gradient = 2.0
# Confidence factor for PNG sources.
non_jpeg_confidence = 0.5
# Confidence factor when the image was downscaled for analysis.
downscaled_confidence = 0.6
# Confidence floor.
min_confidence = 0.02

# Blurred (low Laplacian variance) and badly exposed (mean luminance outside
# dark_level..bright_level) frames hide recompression traces.
[ela.quality_discount]
blur_variance_floor = 50.0
blurred_factor = 0.6
dark_level = 30.0
bright_level = 220.0
exposure_factor = 0.7

# ---------------------------------------------------------------------------
# Metadata
# ---------------------------------------------------------------------------
[metadata]
# Case-insensitive substrings of Software / ProcessingSoftware /
# XMP CreatorTool values that identify editing tools.
editor_signatures = [
    "photoshop",
    "gimp",
    "paint.net",
    "paint shop",
    "mspaint",
    "pixelmator",
    "affinity photo",
    "photopea",
    "snapseed",
    "picsart",
    "facetune",
    "meitu",
    "fotor",
    "canva",
    "lightroom",
    "krita",
    "photoscape",
    "corel",
    "editor",
]
editor_increment = 0.9
missing_camera_increment = 0.3
implausible_timestamp_increment = 0.25
modified_after_capture_increment = 0.1
# Images without any metadata: weak anomaly, low confidence.
missing_anomaly = 0.25
missing_confidence = 0.1
present_confidence = 0.9
sparse_confidence = 0.5
min_tags_for_full_confidence = 3
# Capture times up to a day ahead of the clock are tolerated.
future_tolerance_secs = 86400
earliest_plausible_year = 1990
modify_gap_secs = 60

# ---------------------------------------------------------------------------
# Shadow / illumination consistency
# ---------------------------------------------------------------------------
[shadow]
grid_rows = 4
grid_cols = 4
# Gate: below these the analyzer makes no claim.
min_gradient_energy = 0.5
min_dynamic_range = 16.0
min_usable_regions = 3
# Per-region usability.
region_min_energy = 0.5
min_coherence = 0.2
full_contrast = 64.0
deviation_threshold_deg = 60.0
fraction_weight = 0.6
gated_confidence = 0.02

# Blur keeps the direction of smooth shading; clipped exposure loses it.
[shadow.quality_discount]
blur_variance_floor = 50.0
blurred_factor = 0.8
dark_level = 30.0
bright_level = 220.0
exposure_factor = 0.6

# ---------------------------------------------------------------------------
# Trust fusion (weights must be ordered ela > shadow > metadata)
# ---------------------------------------------------------------------------
[fusion]
ela_weight = 0.38
shadow_weight = 0.33
metadata_weight = 0.29
neutral_score = 50
min_evidence = 0.35

# ---------------------------------------------------------------------------
# Severity table: a score falls in the first bucket whose floor it meets.
# Each row needs one level per floor: low, medium, high or critical.
# ---------------------------------------------------------------------------
[severity]
floors = [80, 60, 40, 20, 0]

[severity.levels]
safety = ["medium", "high", "high", "critical", "critical"]
infrastructure = ["low", "medium", "high", "high", "critical"]
sanitation = ["low", "low", "medium", "high", "critical"]
other = ["low", "low", "low", "medium", "critical"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
parallel_analyzers = true
# Maximum worker threads for batch scoring.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
