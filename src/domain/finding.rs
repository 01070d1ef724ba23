//! Finding model - the common shape every detector's output is normalized into

use serde::{Deserialize, Serialize};

use super::DetectorKind;

/// Severity levels for findings, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All levels, most severe first (report order)
    pub const DESCENDING: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Parse a severity, accepting the level names used by SARIF/Semgrep
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" | "crit" => Some(Severity::Critical),
            "high" | "error" => Some(Severity::High),
            "medium" | "med" | "moderate" | "warning" => Some(Severity::Medium),
            "low" | "note" => Some(Severity::Low),
            "info" | "informational" | "inventory" | "none" => Some(Severity::Info),
            _ => None,
        }
    }

    /// Like [`Severity::from_str`], but anything missing or unrecognized is `Info`
    pub fn normalize(s: Option<&str>) -> Self {
        s.and_then(Self::from_str).unwrap_or_default()
    }

    /// Weight used for the overall risk score
    pub fn risk_weight(&self) -> u32 {
        match self {
            Severity::Critical => 10,
            Severity::High => 7,
            Severity::Medium => 4,
            Severity::Low => 2,
            Severity::Info => 1,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much weight a finding deserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" | "certain" => Some(Confidence::High),
            "medium" | "med" | "firm" => Some(Confidence::Medium),
            "low" | "tentative" => Some(Confidence::Low),
            _ => None,
        }
    }
}

/// Where in the artifact a finding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// 1-based line
    pub line: Option<u32>,
    /// 1-based column
    pub column: Option<u32>,
    /// Byte offset into the artifact
    pub offset: Option<u32>,
}

impl Location {
    pub fn line(line: u32) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.column.is_none() && self.offset.is_none()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column, self.offset) {
            (Some(line), Some(col), _) => write!(f, "line {}:{}", line, col),
            (Some(line), None, _) => write!(f, "line {}", line),
            (None, _, Some(offset)) => write!(f, "offset {}", offset),
            (None, _, None) => write!(f, "unknown location"),
        }
    }
}

/// A normalized vulnerability observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Detector that produced this finding
    pub detector: DetectorKind,
    /// Category or rule id, e.g. "dangerous-eval"
    pub rule_id: String,
    pub severity: Severity,
    pub confidence: Confidence,
    pub location: Option<Location>,
    /// Human-readable description
    pub description: String,
    /// Suggested fix, if the detector offered one
    pub remediation: Option<String>,
}

impl Finding {
    /// Create a finding with `info` severity and the detector's default confidence
    pub fn new(
        detector: DetectorKind,
        rule_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            rule_id: rule_id.into(),
            severity: Severity::default(),
            confidence: detector.default_confidence(),
            location: None,
            description: description.into(),
            remediation: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = if location.is_empty() { None } else { Some(location) };
        self
    }

    pub fn with_line(self, line: u32) -> Self {
        self.with_location(Location::line(line))
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        let remediation = remediation.into();
        let trimmed = remediation.trim();
        self.remediation = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// True for semantic-review output, which must never outrank structured findings
    ///
    /// Depends only on the detector: a structured finding the engine itself
    /// rated low-confidence is still structured.
    pub fn is_advisory(&self) -> bool {
        self.detector == DetectorKind::SemanticReview
    }

    /// One-line rendering used in summaries and prompts
    pub fn summary_line(&self) -> String {
        let location = self
            .location
            .map(|l| format!(" ({})", l))
            .unwrap_or_default();
        format!(
            "[{}] {}{}: {}",
            self.severity.as_str().to_uppercase(),
            self.rule_id,
            location,
            self.description
        )
    }
}
