use serde::{Deserialize, Serialize};

use super::{Confidence, Finding};

/// The fixed set of detectors, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorKind {
    /// External static-analysis engine (Semgrep)
    StaticAnalysis,
    /// In-process exploit signature checker
    ExploitCheck,
    /// Language-model semantic review
    SemanticReview,
}

impl DetectorKind {
    /// Declaration order doubles as the report order
    pub const ALL: [DetectorKind; 3] = [
        DetectorKind::StaticAnalysis,
        DetectorKind::ExploitCheck,
        DetectorKind::SemanticReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::StaticAnalysis => "static-analysis",
            DetectorKind::ExploitCheck => "exploit-check",
            DetectorKind::SemanticReview => "semantic-review",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DetectorKind::StaticAnalysis => "Static Analysis",
            DetectorKind::ExploitCheck => "Exploit Signature Check",
            DetectorKind::SemanticReview => "Semantic Review",
        }
    }

    /// Position in the report
    pub fn index(&self) -> usize {
        match self {
            DetectorKind::StaticAnalysis => 0,
            DetectorKind::ExploitCheck => 1,
            DetectorKind::SemanticReview => 2,
        }
    }

    pub(crate) fn default_confidence(&self) -> Confidence {
        match self {
            DetectorKind::StaticAnalysis => Confidence::High,
            DetectorKind::ExploitCheck => Confidence::Medium,
            DetectorKind::SemanticReview => Confidence::Low,
        }
    }
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one detector invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectorStatus {
    Success,
    Failed,
    TimedOut,
}

impl DetectorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorStatus::Success => "success",
            DetectorStatus::Failed => "failed",
            DetectorStatus::TimedOut => "timed-out",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DetectorStatus::Success)
    }
}

impl std::fmt::Display for DetectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of one detector invocation
///
/// Built only through the constructors below, which keep `error` present
/// exactly when `status` is not [`DetectorStatus::Success`]. Read-only after
/// construction. Serialize-only, so the invariant cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorResult {
    detector: DetectorKind,
    findings: Vec<Finding>,
    raw_output: String,
    status: DetectorStatus,
    error: Option<String>,
    elapsed_ms: u64,
}

impl DetectorResult {
    pub fn success(detector: DetectorKind, findings: Vec<Finding>, raw_output: String) -> Self {
        Self {
            detector,
            findings,
            raw_output,
            status: DetectorStatus::Success,
            error: None,
            elapsed_ms: 0,
        }
    }

    /// A failed invocation. Whatever the detector printed before failing is kept.
    pub fn failed(detector: DetectorKind, error: impl Into<String>, raw_output: String) -> Self {
        Self {
            detector,
            findings: Vec::new(),
            raw_output,
            status: DetectorStatus::Failed,
            error: Some(non_empty(error.into(), "detector failed")),
            elapsed_ms: 0,
        }
    }

    pub fn timed_out(detector: DetectorKind, error: impl Into<String>) -> Self {
        Self {
            detector,
            findings: Vec::new(),
            raw_output: String::new(),
            status: DetectorStatus::TimedOut,
            error: Some(non_empty(error.into(), "detector timed out")),
            elapsed_ms: 0,
        }
    }

    /// Attach the measured wall-clock time
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn detector(&self) -> DetectorKind {
        self.detector
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn status(&self) -> DetectorStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Plain-text digest handed to later detectors
    pub fn summary(&self) -> String {
        if !self.is_success() {
            return format!(
                "{} unavailable ({}: {})",
                self.detector,
                self.status,
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        if self.findings.is_empty() {
            return format!("{}: no findings", self.detector);
        }

        let mut out = format!("{}: {} finding(s)", self.detector, self.findings.len());
        for finding in &self.findings {
            out.push_str("\n- ");
            out.push_str(&finding.summary_line());
        }
        out
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
