//! Metadata inspection: software signatures, tag patterns, timestamps.
//!
//! Hits are additive and the total is capped at 1.0:
//!
//! | Hit | Increment (default) |
//! |---|---|
//! | Software / ProcessingSoftware / XMP tool names an editor | 0.9 |
//! | Software recorded, camera Make and Model both absent | 0.3 |
//! | Capture time in the future, before 1990, or unreadable | 0.25 |
//! | File modified more than a minute after capture | 0.1 |
//!
//! An image with no metadata at all is weakly suspicious (stripping is a
//! common laundering step) but mostly uninformative: it scores
//! `missing_anomaly` at `missing_confidence`.

use super::Analyzer;
use crate::config::MetadataConfig;
use crate::exif::{ExifRecord, XMP_CREATOR_TOOL, XMP_HISTORY_AGENT};
use crate::imaging::ImageBuffer;
use crate::types::{SignalKind, SignalResult, unit};
use chrono::NaiveDate;
use tracing::debug;

/// Fields that name the software which wrote the file.
const SOFTWARE_FIELDS: [&str; 4] = [
    "Software",
    "ProcessingSoftware",
    XMP_CREATOR_TOOL,
    XMP_HISTORY_AGENT,
];

/// Capture time candidates, most specific first.
const CAPTURE_TIME_FIELDS: [&str; 3] = ["DateTimeOriginal", "DateTimeDigitized", "DateTime"];

pub struct MetadataAnalyzer {
    config: MetadataConfig,
    reference_time: i64,
    signatures: Vec<String>,
}

impl MetadataAnalyzer {
    pub fn new(config: MetadataConfig, reference_time: i64) -> Self {
        let signatures = config
            .editor_signatures
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        Self {
            config,
            reference_time,
            signatures,
        }
    }

    /// First configured editor signature contained in `value`.
    fn editor_signature(&self, value: &str) -> Option<&str> {
        let value = value.to_lowercase();
        self.signatures
            .iter()
            .find(|sig| value.contains(sig.as_str()))
            .map(String::as_str)
    }

    fn timestamp_issue(&self, raw: &str) -> Option<&'static str> {
        let Some(taken) = parse_exif_datetime(raw) else {
            return Some("unparseable");
        };
        if taken > self.reference_time + self.config.future_tolerance_secs {
            return Some("future");
        }
        let earliest = start_of_year(self.config.earliest_plausible_year).unwrap_or(i64::MIN);
        if taken < earliest {
            return Some("too_old");
        }
        None
    }
}

impl Analyzer for MetadataAnalyzer {
    fn kind(&self) -> SignalKind {
        SignalKind::Metadata
    }

    fn analyze(&self, _image: &ImageBuffer, exif: Option<&ExifRecord>) -> SignalResult {
        let Some(record) = exif else {
            return SignalResult::new(
                SignalKind::Metadata,
                self.config.missing_anomaly,
                self.config.missing_confidence,
            )
            .with("exif_present", false);
        };

        let confidence = if record.len() >= self.config.min_tags_for_full_confidence {
            self.config.present_confidence
        } else {
            self.config.sparse_confidence
        };
        let mut anomaly = 0.0;
        let mut result = SignalResult::new(SignalKind::Metadata, 0.0, 0.0)
            .with("exif_present", true)
            .with("tag_count", record.len());

        // Editor signatures
        let editor = SOFTWARE_FIELDS.iter().find_map(|&field| {
            let value = record.text(field)?;
            self.editor_signature(value).map(|sig| (field, value, sig))
        });
        result = result.with("editor_detected", editor.is_some());
        if let Some((field, value, signature)) = editor {
            anomaly += self.config.editor_increment;
            result = result
                .with("editor_field", field)
                .with("editor_software", value)
                .with("editor_signature", signature);
        } else if let Some(software) = record.text("Software") {
            result = result.with("software", software);
        }

        // Software without a camera
        let has_software = SOFTWARE_FIELDS.iter().any(|f| record.text(f).is_some());
        let make = record.text("Make");
        let model = record.text("Model");
        if let Some(make) = make {
            result = result.with("camera_make", make);
        }
        if let Some(model) = model {
            result = result.with("camera_model", model);
        }
        if has_software && make.is_none() && model.is_none() {
            anomaly += self.config.missing_camera_increment;
            result = result.with("camera_missing", true);
        }

        // Capture timestamp plausibility
        let capture = CAPTURE_TIME_FIELDS
            .iter()
            .find_map(|&field| record.text(field).map(|v| (field, v)));
        match capture {
            Some((field, raw)) => {
                result = result.with("timestamp_field", field);
                if let Some(issue) = self.timestamp_issue(raw) {
                    anomaly += self.config.implausible_timestamp_increment;
                    result = result.with("timestamp_issue", issue);
                }
            }
            None => result = result.with("timestamp_present", false),
        }

        // Modified after capture
        let original = record.text("DateTimeOriginal").and_then(parse_exif_datetime);
        let modified = record.text("DateTime").and_then(parse_exif_datetime);
        if let (Some(original), Some(modified)) = (original, modified) {
            let gap = modified - original;
            if gap > self.config.modify_gap_secs {
                anomaly += self.config.modified_after_capture_increment;
                result = result.with("modified_after_capture_secs", gap as f64);
            }
        }

        debug!(anomaly, confidence, tags = record.len(), "metadata analysis complete");
        SignalResult {
            anomaly_score: unit(anomaly),
            confidence: unit(confidence),
            ..result
        }
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp into Unix seconds.
///
/// EXIF timestamps carry no zone; they are read as UTC. Anything after the
/// first 19 characters (sub-seconds, offsets) is ignored. Blank and
/// out-of-range dates such as `0000:00:00 00:00:00` yield `None`.
pub fn parse_exif_datetime(raw: &str) -> Option<i64> {
    let parsed = ::exif::DateTime::from_ascii(raw.trim().as_bytes()).ok()?;
    let date = NaiveDate::from_ymd_opt(
        i32::from(parsed.year),
        u32::from(parsed.month),
        u32::from(parsed.day),
    )?;
    let time = date.and_hms_opt(
        u32::from(parsed.hour),
        u32::from(parsed.minute),
        u32::from(parsed.second),
    )?;
    Some(time.and_utc().timestamp())
}

/// Unix seconds of January 1st, 00:00 UTC of `year`.
fn start_of_year(year: i32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, 1, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc().timestamp())
}
