//! Shared types passed between pipeline stages and across the library
//! boundary.
//!
//! Everything here is serialized into the assessment record handed back to
//! the transport layer, so field names are part of the external contract
//! (camelCase in JSON).

use crate::imaging::QualityMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which analyzer produced a [`SignalResult`].
///
/// The declaration order is the fixed order of signals in a [`TrustResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Ela,
    Metadata,
    Shadow,
}

impl SignalKind {
    /// All kinds in fusion order.
    pub const ALL: [SignalKind; 3] = [SignalKind::Ela, SignalKind::Metadata, SignalKind::Shadow];

    pub fn label(self) -> &'static str {
        match self {
            SignalKind::Ela => "ela",
            SignalKind::Metadata => "metadata",
            SignalKind::Shadow => "shadow",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single named finding reported by an analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for FindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingValue::Flag(b) => write!(f, "{b}"),
            FindingValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            FindingValue::Number(n) => write!(f, "{n:.3}"),
            FindingValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for FindingValue {
    fn from(value: bool) -> Self {
        FindingValue::Flag(value)
    }
}

impl From<f64> for FindingValue {
    fn from(value: f64) -> Self {
        FindingValue::Number(value)
    }
}

impl From<usize> for FindingValue {
    fn from(value: usize) -> Self {
        FindingValue::Number(value as f64)
    }
}

impl From<&str> for FindingValue {
    fn from(value: &str) -> Self {
        FindingValue::Text(value.to_string())
    }
}

impl From<String> for FindingValue {
    fn from(value: String) -> Self {
        FindingValue::Text(value)
    }
}

/// Output of one analyzer.
///
/// `anomaly_score` 0 means nothing suspicious was found, 1 is maximal
/// anomaly. `confidence` is how much usable evidence the analyzer had,
/// independent of what that evidence said. Both are clamped to `[0, 1]` on
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub kind: SignalKind,
    pub anomaly_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub details: BTreeMap<String, FindingValue>,
}

impl SignalResult {
    pub fn new(kind: SignalKind, anomaly_score: f64, confidence: f64) -> Self {
        Self {
            kind,
            anomaly_score: unit(anomaly_score),
            confidence: unit(confidence),
            details: BTreeMap::new(),
        }
    }

    /// Builder-style finding insertion.
    pub fn with(mut self, name: &str, value: impl Into<FindingValue>) -> Self {
        self.details.insert(name.to_string(), value.into());
        self
    }

    pub fn finding(&self, name: &str) -> Option<&FindingValue> {
        self.details.get(name)
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Fused trust score plus the signals it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustResult {
    pub trust_score: u8,
    /// One entry per analyzer, always in [`SignalKind::ALL`] order.
    pub signals: Vec<SignalResult>,
}

impl TrustResult {
    pub fn signal(&self, kind: SignalKind) -> Option<&SignalResult> {
        self.signals.iter().find(|s| s.kind == kind)
    }
}

/// Review priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn label(self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Medium => "medium",
            SeverityLevel::High => "high",
            SeverityLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity decision for a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityResult {
    pub level: SeverityLevel,
    pub issue_type: crate::severity::IssueType,
    pub trust_score: u8,
}

/// Facts about the image that was scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub downscaled: bool,
    /// Capture quality of the analysis buffer.
    pub quality: QualityMetrics,
    /// SHA-256 of the submitted bytes, hex encoded. Empty when the caller
    /// supplied an already-decoded buffer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sha256: String,
}

/// The record returned across the library boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub trust_score: u8,
    pub signals: Vec<SignalResult>,
    pub severity: SeverityResult,
    pub image: ImageSummary,
}

impl Assessment {
    pub fn signal(&self, kind: SignalKind) -> Option<&SignalResult> {
        self.signals.iter().find(|s| s.kind == kind)
    }
}
