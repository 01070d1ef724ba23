//! In-process exploit signature detector adapter

use async_trait::async_trait;
use std::sync::Arc;

use super::signatures::{check_exploits, RawExploitFinding};
use crate::detector::{panic_message, AdapterError, Detector, DetectorContext, DetectorOutput};
use crate::{Artifact, DetectorKind, Finding, Severity};

/// Signature of an exploit checker: raw source text in, raw matches out
pub type ExploitChecker = Arc<dyn Fn(&str) -> Vec<RawExploitFinding> + Send + Sync>;

/// Wraps an exploit checker and normalizes what it returns
///
/// The checker runs on the blocking pool so a slow scan cannot stall the
/// runtime, and a panicking checker surfaces as a `failed` result.
pub struct ExploitCheckAdapter {
    checker: ExploitChecker,
}

impl ExploitCheckAdapter {
    /// Adapter over the built-in signature set
    pub fn new() -> Self {
        Self::with_checker(Arc::new(check_exploits))
    }

    /// Adapter over a custom checker
    pub fn with_checker(checker: ExploitChecker) -> Self {
        Self { checker }
    }

    fn normalize(raw: &RawExploitFinding) -> Finding {
        let rule = raw.rule.trim();
        let rule = if rule.is_empty() { "exploit-pattern" } else { rule };

        let title = raw.title.trim();
        let title = if title.is_empty() { rule } else { title };
        let snippet = raw.snippet.trim();
        let description = if snippet.is_empty() {
            title.to_string()
        } else {
            format!("{}: `{}`", title, snippet)
        };

        let mut finding = Finding::new(DetectorKind::ExploitCheck, rule, description)
            .with_severity(Severity::normalize(raw.severity.as_deref()));

        if let Some(line) = raw.line {
            finding = finding.with_line(line);
        }
        if let Some(remediation) = &raw.remediation {
            finding = finding.with_remediation(remediation.as_str());
        }

        finding
    }
}

impl Default for ExploitCheckAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for ExploitCheckAdapter {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ExploitCheck
    }

    async fn run(
        &self,
        artifact: &Artifact,
        _context: &DetectorContext,
    ) -> Result<DetectorOutput, AdapterError> {
        let checker = Arc::clone(&self.checker);
        let code = artifact.content().to_string();

        let raw = tokio::task::spawn_blocking(move || checker(&code))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    AdapterError::process(format!(
                        "exploit checker panicked: {}",
                        panic_message(e.into_panic())
                    ))
                } else {
                    AdapterError::process("exploit checker was cancelled")
                }
            })?;

        let raw_output = serde_json::to_string_pretty(&raw)
            .map_err(|e| AdapterError::parse(format!("failed to serialize raw findings: {}", e)))?;

        let findings = raw.iter().map(Self::normalize).collect();
        Ok(DetectorOutput::new(findings, raw_output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DetectorStatus;

    #[tokio::test]
    async fn test_builtin_checker_findings_are_normalized() {
        let artifact = Artifact::new(
            "const password = \"supersecret\";\neval(input);\n",
            "javascript",
        );
        let result = ExploitCheckAdapter::new()
            .invoke(&artifact, &DetectorContext::empty())
            .await;

        assert!(result.is_success());
        let eval = result
            .findings()
            .iter()
            .find(|f| f.rule_id == "dangerous-eval")
            .unwrap();
        assert!(eval.severity >= Severity::Medium);
        assert_eq!(eval.location.unwrap().line, Some(2));
        assert!(eval.remediation.is_some());

        let raw: Vec<RawExploitFinding> = serde_json::from_str(result.raw_output()).unwrap();
        assert_eq!(raw.len(), result.findings().len());
    }

    #[tokio::test]
    async fn test_missing_severity_becomes_info() {
        let checker: ExploitChecker = Arc::new(|_code: &str| {
            vec![RawExploitFinding {
                rule: "  ".to_string(),
                title: String::new(),
                severity: None,
                line: None,
                snippet: String::new(),
                remediation: None,
            }]
        });
        let result = ExploitCheckAdapter::with_checker(checker)
            .invoke(&Artifact::new("x", "js"), &DetectorContext::empty())
            .await;

        let finding = &result.findings()[0];
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.rule_id, "exploit-pattern");
        assert_eq!(finding.description, "exploit-pattern");
    }

    #[tokio::test]
    async fn test_panicking_checker_is_failed() {
        let checker: ExploitChecker = Arc::new(|_code: &str| -> Vec<RawExploitFinding> {
            panic!("signature table corrupt")
        });
        let result = ExploitCheckAdapter::with_checker(checker)
            .invoke(&Artifact::new("x", "js"), &DetectorContext::empty())
            .await;

        assert_eq!(result.status(), DetectorStatus::Failed);
        assert!(result.error().unwrap().contains("signature table corrupt"));
    }
}
