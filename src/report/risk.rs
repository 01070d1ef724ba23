//! Severity tally and risk scoring

use serde::{Deserialize, Serialize};

use crate::{DetectorResult, Finding, Severity};

/// Maximum number of key findings called out in the report
pub const MAX_KEY_FINDINGS: usize = 5;

/// Count of findings per severity level, over every detector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityTally {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityTally {
    pub fn from_results(results: &[DetectorResult]) -> Self {
        let mut tally = Self::default();
        for finding in results.iter().flat_map(|r| r.findings()) {
            tally.add(finding.severity);
        }
        tally
    }

    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

/// Weighted score over all findings plus the findings that drive it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: Severity,
    /// Critical and high findings from structured detectors, most severe first
    pub key_findings: Vec<Finding>,
}

impl RiskAssessment {
    pub fn from_results(results: &[DetectorResult]) -> Self {
        let score = results
            .iter()
            .flat_map(|r| r.findings())
            .map(|f| f.severity.risk_weight())
            .sum();

        let mut key_findings: Vec<Finding> = results
            .iter()
            .flat_map(|r| r.findings())
            .filter(|f| !f.is_advisory() && f.severity >= Severity::High)
            .cloned()
            .collect();
        // sort_by is stable, so ties keep detector/report order
        key_findings.sort_by(|a, b| b.severity.cmp(&a.severity));
        key_findings.truncate(MAX_KEY_FINDINGS);

        Self {
            score,
            level: risk_level(score),
            key_findings,
        }
    }
}

/// Map a risk score onto a severity level
pub fn risk_level(score: u32) -> Severity {
    match score {
        s if s >= 50 => Severity::Critical,
        s if s >= 30 => Severity::High,
        s if s >= 15 => Severity::Medium,
        s if s >= 5 => Severity::Low,
        _ => Severity::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Confidence, DetectorKind};

    fn finding(kind: DetectorKind, rule: &str, severity: Severity) -> Finding {
        Finding::new(kind, rule, rule).with_severity(severity)
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(risk_level(0), Severity::Info);
        assert_eq!(risk_level(4), Severity::Info);
        assert_eq!(risk_level(5), Severity::Low);
        assert_eq!(risk_level(15), Severity::Medium);
        assert_eq!(risk_level(29), Severity::Medium);
        assert_eq!(risk_level(30), Severity::High);
        assert_eq!(risk_level(50), Severity::Critical);
    }

    #[test]
    fn test_tally_and_score() {
        let results = vec![
            DetectorResult::success(
                DetectorKind::StaticAnalysis,
                vec![
                    finding(DetectorKind::StaticAnalysis, "a", Severity::Critical),
                    finding(DetectorKind::StaticAnalysis, "b", Severity::Medium),
                ],
                String::new(),
            ),
            DetectorResult::success(
                DetectorKind::ExploitCheck,
                vec![finding(DetectorKind::ExploitCheck, "c", Severity::High)],
                String::new(),
            ),
        ];

        let tally = SeverityTally::from_results(&results);
        assert_eq!(tally.critical, 1);
        assert_eq!(tally.high, 1);
        assert_eq!(tally.medium, 1);
        assert_eq!(tally.total(), 3);

        let risk = RiskAssessment::from_results(&results);
        assert_eq!(risk.score, 10 + 4 + 7);
        assert_eq!(risk.level, Severity::Medium);
    }

    #[test]
    fn test_low_confidence_engine_finding_is_still_key() {
        let engine_rated_low =
            finding(DetectorKind::StaticAnalysis, "eval-detected", Severity::High)
                .with_confidence(Confidence::Low);
        let results = vec![DetectorResult::success(
            DetectorKind::StaticAnalysis,
            vec![engine_rated_low],
            String::new(),
        )];

        let risk = RiskAssessment::from_results(&results);
        assert_eq!(risk.key_findings.len(), 1);
        assert_eq!(risk.key_findings[0].rule_id, "eval-detected");
    }

    #[test]
    fn test_key_findings_skip_advisory_and_keep_order() {
        let advisory = finding(DetectorKind::SemanticReview, "semantic-review", Severity::Critical)
            .with_confidence(Confidence::Low);
        let results = vec![
            DetectorResult::success(
                DetectorKind::StaticAnalysis,
                vec![
                    finding(DetectorKind::StaticAnalysis, "h1", Severity::High),
                    finding(DetectorKind::StaticAnalysis, "low", Severity::Low),
                ],
                String::new(),
            ),
            DetectorResult::success(
                DetectorKind::ExploitCheck,
                (0..6)
                    .map(|i| {
                        let severity = if i == 3 { Severity::Critical } else { Severity::High };
                        finding(DetectorKind::ExploitCheck, &format!("e{}", i), severity)
                    })
                    .collect(),
                String::new(),
            ),
            DetectorResult::success(DetectorKind::SemanticReview, vec![advisory], String::new()),
        ];

        let risk = RiskAssessment::from_results(&results);
        let rules: Vec<&str> = risk.key_findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["e3", "h1", "e0", "e1", "e2"]);
    }
}
