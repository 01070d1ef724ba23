//! Report synthesis
//!
//! [`synthesize`] is pure: it merges the three detector results into an
//! [`AuditReport`] and renders its Markdown body.

mod render;
mod risk;

pub use risk::{risk_level, RiskAssessment, SeverityTally, MAX_KEY_FINDINGS};

use serde::{Deserialize, Serialize};

use crate::{DetectorKind, DetectorResult};

/// Whether every detector succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Complete,
    Partial,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Complete => "complete",
            OverallStatus::Partial => "partial",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result set handed to [`synthesize`] was not one result per detector in order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("expected {expected} detector results, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("result {position} is from {found}, expected {expected}")]
    OutOfOrder {
        position: usize,
        expected: DetectorKind,
        found: DetectorKind,
    },
}

/// Final output of one audit call
///
/// Only [`synthesize`] builds one, so it always holds one result per
/// detector in order. Serialize-only for the same reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    results: Vec<DetectorResult>,
    status: OverallStatus,
    summary: SeverityTally,
    risk: RiskAssessment,
    body: String,
}

impl AuditReport {
    /// Detector results, always in [`DetectorKind::ALL`] order
    pub fn results(&self) -> &[DetectorResult] {
        &self.results
    }

    pub fn result(&self, kind: DetectorKind) -> &DetectorResult {
        &self.results[kind.index()]
    }

    pub fn status(&self) -> OverallStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == OverallStatus::Complete
    }

    pub fn summary(&self) -> &SeverityTally {
        &self.summary
    }

    pub fn risk(&self) -> &RiskAssessment {
        &self.risk
    }

    /// Rendered Markdown
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Merge detector results into a report
///
/// Expects exactly one result per detector, in [`DetectorKind::ALL`] order.
pub fn synthesize(results: Vec<DetectorResult>) -> Result<AuditReport, SynthesisError> {
    if results.len() != DetectorKind::ALL.len() {
        return Err(SynthesisError::WrongCount {
            expected: DetectorKind::ALL.len(),
            actual: results.len(),
        });
    }
    for (position, (result, expected)) in results.iter().zip(DetectorKind::ALL).enumerate() {
        if result.detector() != expected {
            return Err(SynthesisError::OutOfOrder {
                position,
                expected,
                found: result.detector(),
            });
        }
    }

    let status = if results.iter().all(DetectorResult::is_success) {
        OverallStatus::Complete
    } else {
        OverallStatus::Partial
    };
    let summary = SeverityTally::from_results(&results);
    let risk = RiskAssessment::from_results(&results);
    let body = render::render_markdown(&results, status, &summary, &risk);

    Ok(AuditReport {
        results,
        status,
        summary,
        risk,
        body,
    })
}
