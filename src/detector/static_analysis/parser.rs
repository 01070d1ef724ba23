//! Semgrep JSON output parser
//!
//! Only the native JSON format (`--json`) is understood. Fields the report
//! does not use are left out of the structs; serde ignores them.

use serde::Deserialize;

use crate::detector::AdapterError;
use crate::{Confidence, DetectorKind, Finding, Location, Severity};

/// Semgrep JSON output root
#[derive(Debug, Deserialize)]
pub struct SemgrepOutput {
    pub version: Option<String>,
    pub results: Vec<SemgrepResultItem>,
    pub errors: Option<Vec<SemgrepError>>,
}

#[derive(Debug, Deserialize)]
pub struct SemgrepResultItem {
    pub check_id: String,
    pub start: SemgrepPosition,
    pub extra: SemgrepExtra,
}

#[derive(Debug, Deserialize)]
pub struct SemgrepPosition {
    pub line: u32,
    pub col: u32,
    pub offset: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SemgrepExtra {
    pub message: String,
    pub severity: Option<String>,
    pub metadata: Option<SemgrepMetadata>,
    pub fix: Option<String>,
    pub is_ignored: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SemgrepMetadata {
    pub confidence: Option<String>,
    pub cwe: Option<SemgrepList>,
    pub owasp: Option<SemgrepList>,
}

/// Semgrep emits some metadata either as a string or a list of strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SemgrepList {
    Single(String),
    Multiple(Vec<String>),
}

impl SemgrepList {
    pub fn first(&self) -> Option<&str> {
        match self {
            SemgrepList::Single(s) => Some(s.as_str()),
            SemgrepList::Multiple(v) => v.first().map(|s| s.as_str()),
        }
    }

    pub fn joined(&self) -> String {
        match self {
            SemgrepList::Single(s) => s.clone(),
            SemgrepList::Multiple(v) => v.join(", "),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SemgrepError {
    pub level: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<SemgrepErrorType>,
}

/// `type` is a string in older releases and a tagged array in newer ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SemgrepErrorType {
    Name(String),
    Tagged(Vec<serde_json::Value>),
}

/// Findings plus engine-reported problems from one Semgrep run
#[derive(Debug, Default)]
pub struct ParsedScan {
    pub findings: Vec<Finding>,
    /// Results Semgrep marked as ignored (nosemgrep)
    pub skipped: usize,
    pub warnings: Vec<String>,
}

/// Parse Semgrep's `--json` stdout into normalized findings
pub fn parse_semgrep_json(content: &str) -> Result<ParsedScan, AdapterError> {
    if content.trim().is_empty() {
        return Err(AdapterError::parse("static analysis produced no output"));
    }

    let output: SemgrepOutput = serde_json::from_str(content)
        .map_err(|e| AdapterError::parse(format!("invalid Semgrep JSON: {}", e)))?;

    let mut parsed = ParsedScan::default();

    if let Some(errors) = &output.errors {
        for error in errors {
            if let Some(msg) = &error.message {
                let level = error.level.as_deref().unwrap_or("error");
                parsed
                    .warnings
                    .push(format!("semgrep {}: {}", level, msg.trim()));
            }
        }
    }

    for item in &output.results {
        if item.extra.is_ignored.unwrap_or(false) {
            parsed.skipped += 1;
            continue;
        }
        parsed.findings.push(to_finding(item));
    }

    Ok(parsed)
}

fn to_finding(item: &SemgrepResultItem) -> Finding {
    let metadata = item.extra.metadata.as_ref();

    let mut description = item.extra.message.trim().to_string();
    if let Some(cwe) = metadata.and_then(|m| m.cwe.as_ref()).and_then(|c| c.first()) {
        description.push_str(&format!(" [{}]", normalize_cwe(cwe)));
    }
    if let Some(owasp) = metadata.and_then(|m| m.owasp.as_ref()) {
        description.push_str(&format!(" [OWASP: {}]", owasp.joined()));
    }

    let mut location = Location::line(item.start.line).with_column(item.start.col);
    if let Some(offset) = item.start.offset {
        location = location.with_offset(offset);
    }

    let mut finding = Finding::new(DetectorKind::StaticAnalysis, &item.check_id, description)
        .with_severity(Severity::normalize(item.extra.severity.as_deref()))
        .with_location(location);

    if let Some(confidence) = metadata
        .and_then(|m| m.confidence.as_deref())
        .and_then(Confidence::from_str)
    {
        finding = finding.with_confidence(confidence);
    }

    if let Some(fix) = &item.extra.fix {
        finding = finding.with_remediation(format!("Suggested fix: {}", fix.trim()));
    }

    finding
}

/// "CWE-79: Improper Neutralization..." and "79" both become "CWE-79: ..."
fn normalize_cwe(cwe: &str) -> String {
    let cwe = cwe.trim();
    if cwe.to_uppercase().starts_with("CWE-") {
        cwe.to_string()
    } else {
        format!("CWE-{}", cwe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "version": "1.50.0",
  "results": [
    {
      "check_id": "javascript.lang.security.audit.eval-detected.eval-detected",
      "path": "/tmp/redaudit-abc.js",
      "start": {"line": 4, "col": 9, "offset": 71},
      "end": {"line": 4, "col": 46, "offset": 108},
      "extra": {
        "message": "Detected the use of eval().",
        "severity": "WARNING",
        "metadata": {
          "cwe": ["CWE-95: Improper Neutralization of Directives in Dynamically Evaluated Code"],
          "owasp": ["A03:2021 - Injection"],
          "confidence": "LOW"
        },
        "lines": "eval(\"console.log('User: ' + user)\");"
      }
    },
    {
      "check_id": "generic.secrets.security.detected-generic-secret",
      "path": "/tmp/redaudit-abc.js",
      "start": {"line": 2, "col": 5},
      "end": {"line": 2, "col": 20},
      "extra": {
        "message": "Generic secret detected",
        "severity": "ERROR",
        "fix": "const password = process.env.PASSWORD;"
      }
    },
    {
      "check_id": "ignored.rule",
      "path": "/tmp/redaudit-abc.js",
      "start": {"line": 9, "col": 1},
      "end": {"line": 9, "col": 2},
      "extra": {"message": "ignored", "severity": "INFO", "is_ignored": true}
    }
  ],
  "errors": [
    {"level": "warn", "message": "Syntax error at line 12", "type": ["PartialParsing", []]}
  ]
}"#;

    #[test]
    fn test_parses_results_in_order() {
        let parsed = parse_semgrep_json(SAMPLE).unwrap();
        assert_eq!(parsed.findings.len(), 2);
        assert_eq!(parsed.skipped, 1);

        let eval = &parsed.findings[0];
        assert_eq!(
            eval.rule_id,
            "javascript.lang.security.audit.eval-detected.eval-detected"
        );
        assert_eq!(eval.severity, Severity::Medium);
        assert_eq!(eval.confidence, Confidence::Low);
        assert_eq!(eval.location.unwrap().line, Some(4));
        assert_eq!(eval.location.unwrap().offset, Some(71));
        assert!(eval.description.contains("[CWE-95"));
        assert!(eval.description.contains("OWASP: A03:2021 - Injection"));

        let secret = &parsed.findings[1];
        assert_eq!(secret.severity, Severity::High);
        assert_eq!(secret.confidence, Confidence::High);
        assert!(secret.remediation.as_deref().unwrap().contains("process.env"));
    }

    #[test]
    fn test_collects_engine_errors_as_warnings() {
        let parsed = parse_semgrep_json(SAMPLE).unwrap();
        assert_eq!(parsed.warnings, vec!["semgrep warn: Syntax error at line 12"]);
    }

    #[test]
    fn test_missing_severity_defaults_to_info() {
        let json =
            r#"{"results":[{"check_id":"x","start":{"line":1,"col":1},"extra":{"message":"m"}}]}"#;
        let parsed = parse_semgrep_json(json).unwrap();
        assert_eq!(parsed.findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_empty_results() {
        let parsed = parse_semgrep_json(r#"{"results": [], "errors": []}"#).unwrap();
        assert!(parsed.findings.is_empty());
    }

    #[test]
    fn test_malformed_output_is_parse_failure() {
        let err = parse_semgrep_json("Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, AdapterError::ParseFailure { .. }));

        let err = parse_semgrep_json("   ").unwrap_err();
        assert!(err.to_string().contains("no output"));
    }

    #[test]
    fn test_normalize_cwe() {
        assert_eq!(normalize_cwe("79"), "CWE-79");
        assert_eq!(normalize_cwe("CWE-79: XSS"), "CWE-79: XSS");
    }
}
