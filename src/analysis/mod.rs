//! Forensic signal extractors.
//!
//! Each analyzer looks at one kind of evidence and reports a
//! [`SignalResult`]: an anomaly score plus how much usable evidence it had.
//! Analyzers are independent, share nothing mutable, and never fail; a
//! degraded input (no EXIF, featureless content, codec trouble) shows up as
//! low confidence rather than an error.
//!
//! | Analyzer | Evidence |
//! |---|---|
//! | [`ElaAnalyzer`] | JPEG recompression error levels |
//! | [`MetadataAnalyzer`] | EXIF/XMP software signatures, tag patterns, timestamps |
//! | [`ShadowAnalyzer`] | Per-region light direction agreement |

pub mod ela;
pub mod metadata;
pub mod shadow;

pub use ela::ElaAnalyzer;
pub use metadata::MetadataAnalyzer;
pub use shadow::ShadowAnalyzer;

use crate::config::ForensicsConfig;
use crate::exif::ExifRecord;
use crate::imaging::{ImageBuffer, JpegRecompressor};
use crate::types::{SignalKind, SignalResult};

/// One independent signal extractor.
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> SignalKind;

    fn analyze(&self, image: &ImageBuffer, exif: Option<&ExifRecord>) -> SignalResult;
}

/// The production analyzers, in [`SignalKind::ALL`] order.
///
/// `reference_time` (Unix seconds) is the "now" timestamps are judged
/// against; it is captured once per invocation.
pub fn standard_analyzers(config: &ForensicsConfig, reference_time: i64) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(ElaAnalyzer::new(config.ela.clone(), JpegRecompressor)),
        Box::new(MetadataAnalyzer::new(config.metadata.clone(), reference_time)),
        Box::new(ShadowAnalyzer::new(config.shadow.clone())),
    ]
}
