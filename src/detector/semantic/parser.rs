//! Turns a free-form model answer into one advisory finding

use once_cell::sync::Lazy;
use regex::Regex;

use crate::detector::AdapterError;
use crate::{Confidence, DetectorKind, Finding, Severity};

/// Rule id carried by every semantic-review finding
pub const SEMANTIC_RULE_ID: &str = "semantic-review";

const MAX_DESCRIPTION_CHARS: usize = 200;

static SEVERITY_WORD: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)\b(critical|high|medium|low)\b").ok());

static REMEDIATION_WORD: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)\b(remediation|recommendation|recommended|mitigation|fix)\b").ok()
});

/// Parse the model's answer
///
/// Empty answers and answers with no readable text are rejected; anything
/// else yields exactly one low-confidence finding.
pub fn parse_review(text: &str) -> Result<Finding, AdapterError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AdapterError::parse("language model returned an empty response"));
    }
    if is_garbled(trimmed) {
        return Err(AdapterError::parse("language model response is not readable text"));
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    let description = lines
        .iter()
        .map(|l| clean_line(l))
        .find(|l| !l.is_empty())
        .map(|l| l.chars().take(MAX_DESCRIPTION_CHARS).collect::<String>())
        .unwrap_or_else(|| "Semantic review completed".to_string());

    let mut finding = Finding::new(DetectorKind::SemanticReview, SEMANTIC_RULE_ID, description)
        .with_severity(highest_severity_mentioned(trimmed))
        .with_confidence(Confidence::Low);

    if let Some(remediation) = remediation_line(&lines) {
        finding = finding.with_remediation(remediation);
    }

    Ok(finding)
}

/// The most severe level the text talks about, `Info` if none
fn highest_severity_mentioned(text: &str) -> Severity {
    let Some(re) = SEVERITY_WORD.as_ref() else {
        return Severity::Info;
    };
    re.find_iter(text)
        .filter_map(|m| Severity::from_str(m.as_str()))
        .max()
        .unwrap_or_default()
}

fn remediation_line(lines: &[&str]) -> Option<String> {
    let re = REMEDIATION_WORD.as_ref()?;

    for (i, line) in lines.iter().enumerate() {
        if !re.is_match(line) {
            continue;
        }

        let is_heading = line.trim_start().starts_with('#') || line.trim_end().ends_with(':');
        if is_heading {
            // "## Remediation" - the advice is on the next non-empty line
            return lines[i + 1..]
                .iter()
                .map(|l| clean_line(l))
                .find(|l| !l.is_empty());
        }

        let cleaned = clean_line(line);
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    None
}

/// Strip markdown decoration (headings, bullets, emphasis) from a line
fn clean_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '#' | '-' | '*' | '>') || c.is_whitespace())
        .trim_end_matches(|c: char| c == '*' || c.is_whitespace())
        .replace("**", "")
        .trim()
        .to_string()
}

/// True when the text has no alphanumerics or is dominated by control/replacement chars
fn is_garbled(text: &str) -> bool {
    if !text.chars().any(char::is_alphanumeric) {
        return true;
    }

    let total = text.chars().count();
    let junk = text
        .chars()
        .filter(|c| *c == '\u{FFFD}' || (c.is_control() && !matches!(c, '\n' | '\r' | '\t')))
        .count();
    junk * 10 > total
}
