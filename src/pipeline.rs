//! One assessment, end to end.
//!
//! ```text
//! bytes ──decode_image──▶ ImageBuffer ─┬─▶ ElaAnalyzer      ─┐
//!       ──ExifRecord────▶ Option<Exif> ├─▶ MetadataAnalyzer ─┼─▶ fuse ─▶ classify ─▶ Assessment
//!                                      └─▶ ShadowAnalyzer   ─┘
//! ```
//!
//! Input errors end the invocation before any analyzer runs. Once the image
//! is decoded nothing can fail: degraded evidence shows up as low signal
//! confidence.
//!
//! ## Parallelism
//!
//! With `processing.parallel_analyzers` the three analyzers run on the
//! rayon pool via `par_iter`. Analyzers borrow the buffer immutably and
//! collect preserves order, so parallel and sequential runs produce
//! identical assessments.
//!
//! ## Reference time
//!
//! Timestamp plausibility is judged against a reference time captured once
//! per invocation. [`assess`] uses the wall clock; [`assess_at`] takes it
//! explicitly so results are reproducible.

use crate::analysis::{Analyzer, standard_analyzers};
use crate::config::ForensicsConfig;
use crate::exif::ExifRecord;
use crate::fusion::fuse;
use crate::imaging::{ImageBuffer, InputError, decode_image};
use crate::severity::{IssueType, classify};
use crate::types::{Assessment, ImageSummary, SignalResult};
use chrono::Utc;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, info, info_span};

/// Assess submitted image bytes against the current time.
pub fn assess(
    bytes: &[u8],
    declared_mime: Option<&str>,
    issue_type: IssueType,
    config: &ForensicsConfig,
) -> Result<Assessment, InputError> {
    assess_at(bytes, declared_mime, issue_type, config, Utc::now().timestamp())
}

/// Assess submitted image bytes with an explicit reference time
/// (Unix seconds).
pub fn assess_at(
    bytes: &[u8],
    declared_mime: Option<&str>,
    issue_type: IssueType,
    config: &ForensicsConfig,
    reference_time: i64,
) -> Result<Assessment, InputError> {
    let span = info_span!("assess", bytes = bytes.len(), issue = %issue_type);
    let _guard = span.enter();

    let image = decode_image(bytes, declared_mime, &config.limits)?;
    let exif = ExifRecord::from_container(bytes);
    debug!(
        exif_tags = exif.as_ref().map_or(0, ExifRecord::len),
        "metadata extracted"
    );

    let mut assessment = assess_decoded(&image, exif.as_ref(), issue_type, config, reference_time);
    assessment.image.sha256 = format!("{:x}", Sha256::digest(bytes));

    info!(
        trust_score = assessment.trust_score,
        severity = %assessment.severity.level,
        format = %image.source_format(),
        "assessment complete"
    );
    Ok(assessment)
}

/// Assess an already-decoded image.
///
/// The returned [`ImageSummary`] carries no digest since the source bytes
/// are not known here.
pub fn assess_decoded(
    image: &ImageBuffer,
    exif: Option<&ExifRecord>,
    issue_type: IssueType,
    config: &ForensicsConfig,
    reference_time: i64,
) -> Assessment {
    let quality = image.quality();
    debug!(
        laplacian_variance = quality.laplacian_variance,
        luma_std_dev = quality.luma_std_dev,
        mean_brightness = quality.mean_brightness,
        "capture quality"
    );

    let analyzers = standard_analyzers(config, reference_time);
    let signals = run_analyzers(&analyzers, image, exif, config.processing.parallel_analyzers);
    for signal in &signals {
        debug!(
            kind = %signal.kind,
            anomaly = signal.anomaly_score,
            confidence = signal.confidence,
            "signal"
        );
    }

    let trust = fuse(&signals, &config.fusion);
    let severity = classify(&config.severity, issue_type, trust.trust_score);
    let (original_width, original_height) = image.original_dimensions();

    Assessment {
        trust_score: trust.trust_score,
        signals: trust.signals,
        severity,
        image: ImageSummary {
            format: image.source_format().label().to_string(),
            width: image.width(),
            height: image.height(),
            original_width,
            original_height,
            downscaled: image.downscaled(),
            quality,
            sha256: String::new(),
        },
    }
}

/// Run every analyzer over the same image, preserving analyzer order.
pub fn run_analyzers(
    analyzers: &[Box<dyn Analyzer>],
    image: &ImageBuffer,
    exif: Option<&ExifRecord>,
    parallel: bool,
) -> Vec<SignalResult> {
    if parallel {
        analyzers
            .par_iter()
            .map(|a| a.analyze(image, exif))
            .collect()
    } else {
        analyzers.iter().map(|a| a.analyze(image, exif)).collect()
    }
}
