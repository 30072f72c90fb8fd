//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Assessment
//!
//! ```text
//! street.jpg
//!     Trust: 87/100
//!     Severity: low (infrastructure)
//!     Image: jpeg 2048x1536 (downscaled from 4032x3024)
//!     Quality: sharpness 412.3  noise 38.1  brightness 121.7
//!     SHA-256: 3f1c…
//!     ela       anomaly 0.08  confidence 0.74
//!         localized_ratio: 0.412
//!         mean_error: 0.936
//!     metadata  anomaly 0.00  confidence 0.90
//!         camera_make: Canon
//!     shadow    anomaly 0.12  confidence 0.66
//!         flagged_regions: 1
//! ```
//!
//! ## Severity table
//!
//! ```text
//!                   ≥80       60-79     40-59     20-39     <20
//! safety            medium    high      high      critical  critical
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::severity::{IssueType, SeverityTable};
use crate::types::{Assessment, SignalResult};
use std::fmt;

const DETAIL_WIDTH: usize = 60;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate a detail value for display, appending "..." when cut.
fn truncate_value(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn signal_header(signal: &SignalResult) -> String {
    format!(
        "{:<9} anomaly {:.2}  confidence {:.2}",
        signal.kind.label(),
        signal.anomaly_score,
        signal.confidence
    )
}

// ============================================================================
// Assessment output
// ============================================================================

/// Format one assessment as display lines, headed by `source`.
///
/// Signal details are listed under each signal in name order.
pub fn format_assessment(source: &str, assessment: &Assessment) -> Vec<String> {
    let mut lines = vec![source.to_string()];
    let image = &assessment.image;

    lines.push(format!("{}Trust: {}/100", indent(1), assessment.trust_score));
    lines.push(format!(
        "{}Severity: {} ({})",
        indent(1),
        assessment.severity.level,
        assessment.severity.issue_type
    ));
    if image.downscaled {
        lines.push(format!(
            "{}Image: {} {}x{} (downscaled from {}x{})",
            indent(1),
            image.format,
            image.width,
            image.height,
            image.original_width,
            image.original_height
        ));
    } else {
        lines.push(format!(
            "{}Image: {} {}x{}",
            indent(1),
            image.format,
            image.width,
            image.height
        ));
    }
    lines.push(format!(
        "{}Quality: sharpness {:.1}  noise {:.1}  brightness {:.1}",
        indent(1),
        image.quality.laplacian_variance,
        image.quality.luma_std_dev,
        image.quality.mean_brightness
    ));
    if !image.sha256.is_empty() {
        lines.push(format!("{}SHA-256: {}", indent(1), image.sha256));
    }

    for signal in &assessment.signals {
        lines.push(format!("{}{}", indent(1), signal_header(signal)));
        for (name, value) in &signal.details {
            lines.push(format!(
                "{}{}: {}",
                indent(2),
                name,
                truncate_value(&value.to_string(), DETAIL_WIDTH)
            ));
        }
    }
    lines
}

/// Print assessment output to stdout.
pub fn print_assessment(source: &str, assessment: &Assessment) {
    for line in format_assessment(source, assessment) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// One summary line per scored file.
pub fn format_batch_line(source: &str, assessment: &Assessment) -> String {
    format!(
        "{:>3}  {:<8}  {}",
        assessment.trust_score,
        assessment.severity.level.label(),
        source
    )
}

/// One line per file that could not be read or scored.
pub fn format_batch_error(source: &str, error: &dyn fmt::Display) -> String {
    format!("  -  {:<8}  {} ({})", "error", source, error)
}

/// Closing tally of a batch run.
pub fn format_batch_summary(scored: usize, failed: usize) -> String {
    let noun = if scored == 1 { "image" } else { "images" };
    if failed == 0 {
        format!("Scored {} {}", scored, noun)
    } else {
        format!("Scored {} {}, {} failed", scored, noun, failed)
    }
}

// ============================================================================
// Severity table output
// ============================================================================

fn bucket_label(floors: &[u8], index: usize) -> String {
    let floor = floors[index];
    if index == 0 {
        format!("\u{2265}{}", floor)
    } else if floor == 0 && index + 1 == floors.len() {
        format!("<{}", floors[index - 1])
    } else {
        format!("{}-{}", floor, floors[index - 1].saturating_sub(1))
    }
}

/// Format the severity table: one header row of score buckets, one row per
/// issue type.
pub fn format_severity_table(table: &SeverityTable) -> Vec<String> {
    let mut header = format!("{:<16}", "");
    for index in 0..table.floors.len() {
        header.push_str(&format!("  {:<8}", bucket_label(&table.floors, index)));
    }
    let mut lines = vec![header.trim_end().to_string()];

    for issue in IssueType::ALL {
        let mut row = format!("{:<16}", issue.label());
        for level in table.row(issue) {
            row.push_str(&format!("  {:<8}", level.label()));
        }
        lines.push(row.trim_end().to_string());
    }
    lines
}

/// Print the severity table to stdout.
pub fn print_severity_table(table: &SeverityTable) {
    for line in format_severity_table(table) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{InputError, QualityMetrics};
    use crate::types::{ImageSummary, SeverityLevel, SeverityResult, SignalKind};

    fn sample_assessment() -> Assessment {
        Assessment {
            trust_score: 87,
            signals: vec![
                SignalResult::new(SignalKind::Ela, 0.08, 0.74).with("mean_error", 0.936),
                SignalResult::new(SignalKind::Metadata, 0.0, 0.9)
                    .with("camera_make", "Canon")
                    .with("exif_present", true),
                SignalResult::new(SignalKind::Shadow, 0.12, 0.66).with("flagged_regions", 1usize),
            ],
            severity: SeverityResult {
                level: SeverityLevel::Low,
                issue_type: IssueType::Infrastructure,
                trust_score: 87,
            },
            image: ImageSummary {
                format: "jpeg".into(),
                width: 2048,
                height: 1536,
                original_width: 4032,
                original_height: 3024,
                downscaled: true,
                quality: QualityMetrics {
                    laplacian_variance: 412.25,
                    luma_std_dev: 38.08,
                    mean_brightness: 121.7,
                },
                sha256: "ab12".into(),
            },
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_value_short() {
        assert_eq!(truncate_value("Canon", 10), "Canon");
    }

    #[test]
    fn truncate_value_long() {
        let text = "a".repeat(70);
        assert_eq!(truncate_value(&text, 60), format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn truncate_value_multibyte() {
        assert_eq!(truncate_value("ééééé", 3), "ééé...");
    }

    #[test]
    fn bucket_labels() {
        let floors = [80, 60, 40, 20, 0];
        assert_eq!(bucket_label(&floors, 0), "\u{2265}80");
        assert_eq!(bucket_label(&floors, 1), "60-79");
        assert_eq!(bucket_label(&floors, 3), "20-39");
        assert_eq!(bucket_label(&floors, 4), "<20");
    }

    // =========================================================================
    // Assessment output tests
    // =========================================================================

    #[test]
    fn assessment_header_lines() {
        let lines = format_assessment("street.jpg", &sample_assessment());
        assert_eq!(lines[0], "street.jpg");
        assert_eq!(lines[1], "    Trust: 87/100");
        assert_eq!(lines[2], "    Severity: low (infrastructure)");
        assert_eq!(lines[3], "    Image: jpeg 2048x1536 (downscaled from 4032x3024)");
        assert_eq!(
            lines[4],
            "    Quality: sharpness 412.3  noise 38.1  brightness 121.7"
        );
        assert_eq!(lines[5], "    SHA-256: ab12");
    }

    #[test]
    fn assessment_lists_signals_with_details() {
        let lines = format_assessment("street.jpg", &sample_assessment());
        assert!(lines.contains(&"    ela       anomaly 0.08  confidence 0.74".to_string()));
        assert!(lines.contains(&"        mean_error: 0.936".to_string()));
        assert!(lines.contains(&"        camera_make: Canon".to_string()));
        assert!(lines.contains(&"        exif_present: true".to_string()));
        assert!(lines.contains(&"    shadow    anomaly 0.12  confidence 0.66".to_string()));
        assert!(lines.contains(&"        flagged_regions: 1".to_string()));
    }

    #[test]
    fn assessment_without_digest_or_downscale() {
        let mut assessment = sample_assessment();
        assessment.image.sha256.clear();
        assessment.image.downscaled = false;
        assessment.image.original_width = 2048;
        assessment.image.original_height = 1536;
        let lines = format_assessment("x.png", &assessment);
        assert_eq!(lines[3], "    Image: jpeg 2048x1536");
        assert!(lines[4].starts_with("    Quality:"));
        assert!(!lines.iter().any(|l| l.contains("SHA-256")));
    }

    #[test]
    fn details_follow_signal_header() {
        let lines = format_assessment("street.jpg", &sample_assessment());
        let meta = lines
            .iter()
            .position(|l| l.trim_start().starts_with("metadata"))
            .unwrap();
        assert_eq!(lines[meta + 1], "        camera_make: Canon");
    }

    // =========================================================================
    // Batch output tests
    // =========================================================================

    #[test]
    fn batch_line_layout() {
        assert_eq!(
            format_batch_line("a/b.jpg", &sample_assessment()),
            " 87  low       a/b.jpg"
        );
    }

    #[test]
    fn batch_error_names_file_and_cause() {
        let line = format_batch_error("x.gif", &InputError::UnsupportedFormat("gif".into()));
        assert!(line.contains("x.gif"));
        assert!(line.contains("error"));
        assert!(line.contains("gif"));
    }

    #[test]
    fn batch_summary_pluralizes() {
        assert_eq!(format_batch_summary(1, 0), "Scored 1 image");
        assert_eq!(format_batch_summary(3, 2), "Scored 3 images, 2 failed");
    }

    // =========================================================================
    // Severity table tests
    // =========================================================================

    #[test]
    fn severity_table_rows() {
        let lines = format_severity_table(&SeverityTable::default());
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("\u{2265}80"));
        assert!(lines[0].ends_with("<20"));
        assert!(lines[1].starts_with("safety"));
        assert!(lines[1].ends_with("critical"));
        assert!(lines[4].starts_with("other"));
        let other: Vec<&str> = lines[4].split_whitespace().collect();
        assert_eq!(other, vec!["other", "low", "low", "low", "medium", "critical"]);
    }
}
