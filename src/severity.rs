//! Review severity classification.
//!
//! Severity is a pure table lookup on `(issue type, trust score)`. The table
//! is configuration data (`[severity]` in the config file) rather than
//! branching logic, so it can be recalibrated without touching code and
//! tested exhaustively over its finite domain.
//!
//! ```text
//!                   ≥80      60–79    40–59    20–39    <20
//! safety          medium   high     high     critical critical
//! infrastructure  low      medium   high     high     critical
//! sanitation      low      low      medium   high     critical
//! other           low      low      low      medium   critical
//! ```
//!
//! Falling trust raises severity: a low-trust photo of a dangerous situation
//! is exactly what a human reviewer needs to see first. Higher-risk issue
//! types escalate sooner.

use crate::types::{SeverityLevel, SeverityResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Report category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Safety,
    Infrastructure,
    Sanitation,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::Safety,
        IssueType::Infrastructure,
        IssueType::Sanitation,
        IssueType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueType::Safety => "safety",
            IssueType::Infrastructure => "infrastructure",
            IssueType::Sanitation => "sanitation",
            IssueType::Other => "other",
        }
    }

    /// Parse a category label, also accepting the per-incident labels the
    /// reporting app submits (`fire`, `pothole`, ...). Unknown labels fall
    /// back to [`IssueType::Other`].
    pub fn from_label(label: &str) -> IssueType {
        label.parse().unwrap_or_else(|_| {
            tracing::warn!(label, "unknown issue type label, treating as other");
            IssueType::Other
        })
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown issue type '{0}' (expected safety, infrastructure, sanitation or other)")]
pub struct UnknownIssueType(pub String);

impl FromStr for IssueType {
    type Err = UnknownIssueType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "safety" | "fire" | "accident" => Ok(IssueType::Safety),
            "infrastructure" | "road_block" | "roadblock" | "pothole" | "water_leak" => {
                Ok(IssueType::Infrastructure)
            }
            "sanitation" | "garbage" => Ok(IssueType::Sanitation),
            "other" => Ok(IssueType::Other),
            _ => Err(UnknownIssueType(s.to_string())),
        }
    }
}

/// One row of levels per issue type, one level per score bucket.
///
/// Rows are fixed fields rather than a map so that a table cannot be missing
/// an issue type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityRows {
    pub safety: Vec<SeverityLevel>,
    pub infrastructure: Vec<SeverityLevel>,
    pub sanitation: Vec<SeverityLevel>,
    pub other: Vec<SeverityLevel>,
}

/// Score buckets plus the level each issue type gets in each bucket.
///
/// `floors` are the inclusive lower bounds of the buckets, strictly
/// descending and ending at 0. A score belongs to the first bucket whose floor
/// it meets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeverityTable {
    pub floors: Vec<u8>,
    pub levels: SeverityRows,
}

impl Default for SeverityTable {
    fn default() -> Self {
        use SeverityLevel::*;
        Self {
            floors: vec![80, 60, 40, 20, 0],
            levels: SeverityRows {
                safety: vec![Medium, High, High, Critical, Critical],
                infrastructure: vec![Low, Medium, High, High, Critical],
                sanitation: vec![Low, Low, Medium, High, Critical],
                other: vec![Low, Low, Low, Medium, Critical],
            },
        }
    }
}

impl SeverityTable {
    pub fn row(&self, issue: IssueType) -> &[SeverityLevel] {
        match issue {
            IssueType::Safety => &self.levels.safety,
            IssueType::Infrastructure => &self.levels.infrastructure,
            IssueType::Sanitation => &self.levels.sanitation,
            IssueType::Other => &self.levels.other,
        }
    }

    /// Index of the bucket a score falls into.
    ///
    /// Validated tables end with a 0 floor, so every score has a bucket; the
    /// fallback to the last bucket only matters for unvalidated tables.
    pub fn bucket(&self, trust_score: u8) -> usize {
        self.floors
            .iter()
            .position(|&floor| trust_score >= floor)
            .unwrap_or(self.floors.len().saturating_sub(1))
    }

    /// Check the table is total: every `(issue type, score)` maps to exactly
    /// one level.
    pub fn validate(&self) -> Result<(), String> {
        if self.floors.is_empty() {
            return Err("severity.floors must not be empty".into());
        }
        if self.floors[0] > 100 {
            return Err("severity.floors must be within 0-100".into());
        }
        if self.floors.windows(2).any(|w| w[0] <= w[1]) {
            return Err("severity.floors must be strictly descending".into());
        }
        if self.floors.last() != Some(&0) {
            return Err("severity.floors must end with 0 so every score has a bucket".into());
        }
        for issue in IssueType::ALL {
            let row = self.row(issue);
            if row.len() != self.floors.len() {
                return Err(format!(
                    "severity.levels.{issue} has {} levels, expected {} (one per floor)",
                    row.len(),
                    self.floors.len()
                ));
            }
        }
        Ok(())
    }

    /// Look up the level for a report.
    pub fn level(&self, issue: IssueType, trust_score: u8) -> SeverityLevel {
        let row = self.row(issue);
        row.get(self.bucket(trust_score))
            .or(row.last())
            .copied()
            .unwrap_or(SeverityLevel::Critical)
    }
}

/// Classify a report. Scores above 100 are treated as 100.
pub fn classify(table: &SeverityTable, issue: IssueType, trust_score: u8) -> SeverityResult {
    let trust_score = trust_score.min(100);
    SeverityResult {
        level: table.level(issue, trust_score),
        issue_type: issue,
        trust_score,
    }
}
