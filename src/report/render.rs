//! Markdown rendering of an audit report
//!
//! Output depends only on the results passed in. No clocks, no durations,
//! no map iteration, so the same results always render the same bytes.

use super::risk::{RiskAssessment, SeverityTally};
use super::OverallStatus;
use crate::{DetectorKind, DetectorResult, Finding, Severity};

pub(crate) fn render_markdown(
    results: &[DetectorResult],
    status: OverallStatus,
    tally: &SeverityTally,
    risk: &RiskAssessment,
) -> String {
    let mut sections = vec![format!(
        "# Security Audit Report\n\n**Overall status:** {}",
        status
    )];

    for result in results {
        sections.push(render_detector(result));
    }

    sections.push(render_tally(tally));
    sections.push(render_risk(risk));

    let failed: Vec<&DetectorResult> = results.iter().filter(|r| !r.is_success()).collect();
    if !failed.is_empty() {
        let lines: Vec<String> = failed
            .iter()
            .map(|r| {
                format!(
                    "- **{}** ({}): {}",
                    r.detector(),
                    r.status(),
                    r.error().unwrap_or("no reason given")
                )
            })
            .collect();
        sections.push(format!("## Failed Detectors\n\n{}", lines.join("\n")));
    }

    format!("{}\n", sections.join("\n\n"))
}

fn render_detector(result: &DetectorResult) -> String {
    let kind = result.detector();
    let mut out = format!("## {}\n\n**Status:** {}", kind.title(), result.status());
    if let Some(error) = result.error() {
        out.push_str(&format!("\n**Error:** {}", error));
    }

    let heading = if kind == DetectorKind::SemanticReview {
        "### Advisory Findings (low confidence)"
    } else {
        "### Findings"
    };
    out.push_str(&format!("\n\n{}\n\n", heading));

    if result.findings().is_empty() {
        out.push_str("_No findings._");
    } else {
        let items: Vec<String> = result.findings().iter().map(render_finding).collect();
        out.push_str(&items.join("\n"));
    }

    out.push_str("\n\n### Raw Output\n\n");
    if result.raw_output().trim().is_empty() {
        out.push_str("_No raw output._");
    } else {
        out.push_str(&fenced(result.raw_output()));
    }

    out
}

fn render_finding(finding: &Finding) -> String {
    let mut out = format!(
        "- **[{}]** `{}`",
        finding.severity.as_str().to_uppercase(),
        finding.rule_id
    );
    if let Some(location) = &finding.location {
        out.push_str(&format!(" at {}", location));
    }
    out.push_str(&format!(": {}", single_line(&finding.description)));
    if let Some(remediation) = &finding.remediation {
        out.push_str(&format!("\n  - Remediation: {}", single_line(remediation)));
    }
    out
}

fn render_tally(tally: &SeverityTally) -> String {
    let mut out = String::from("## Severity Summary\n\n| Severity | Count |\n|----------|-------|");
    for severity in Severity::DESCENDING {
        out.push_str(&format!("\n| {} | {} |", title_case(severity), tally.count(severity)));
    }
    out.push_str(&format!("\n| **Total** | {} |", tally.total()));
    out
}

fn render_risk(risk: &RiskAssessment) -> String {
    let mut out = format!(
        "## Risk Assessment\n\n**Risk score:** {} ({})\n\n### Key Findings\n\n",
        risk.score, risk.level
    );
    if risk.key_findings.is_empty() {
        out.push_str("_No critical or high severity findings from structured detectors._");
    } else {
        let items: Vec<String> = risk
            .key_findings
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{}. {}", i + 1, single_line(&f.summary_line())))
            .collect();
        out.push_str(&items.join("\n"));
    }
    out
}

/// Fence `text` with more backticks than it contains in a row
fn fenced(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}text\n{}\n{fence}", text.trim_end_matches('\n'))
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case(severity: Severity) -> String {
    let s = severity.as_str();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
