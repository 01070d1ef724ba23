//! Prompt construction for the semantic reviewer

use crate::detector::DetectorContext;
use crate::{Artifact, DetectorKind};

const NOT_AVAILABLE: &str = "(not available)";

/// Build the review prompt from the artifact and the earlier detectors' summaries
pub fn build_review_prompt(artifact: &Artifact, context: &DetectorContext) -> String {
    let static_summary = context
        .summary_for(DetectorKind::StaticAnalysis)
        .unwrap_or(NOT_AVAILABLE);
    let exploit_summary = context
        .summary_for(DetectorKind::ExploitCheck)
        .unwrap_or(NOT_AVAILABLE);

    format!(
        "You are an expert security auditor. Analyze the following {language} code for vulnerabilities.\n\
         Here is the code:\n\n\
         ```{language}\n{code}\n```\n\n\
         Static analysis report:\n{static_summary}\n\n\
         Custom exploit findings:\n{exploit_summary}\n\n\
         Give a detailed audit listing all vulnerabilities, their severity \
         (critical, high, medium, low or info) and remediation suggestions. \
         Start with a one-line summary. Format as a markdown report.",
        language = artifact.language(),
        code = artifact.content(),
        static_summary = static_summary,
        exploit_summary = exploit_summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DetectorResult;

    #[test]
    fn test_prompt_includes_code_and_summaries() {
        let artifact = Artifact::new("eval(x)", "javascript");
        let static_result =
            DetectorResult::failed(DetectorKind::StaticAnalysis, "semgrep missing", String::new());
        let exploit_result =
            DetectorResult::success(DetectorKind::ExploitCheck, Vec::new(), String::new());
        let context = DetectorContext::from_results([&static_result, &exploit_result]);

        let prompt = build_review_prompt(&artifact, &context);
        assert!(prompt.contains("```javascript\neval(x)\n```"));
        assert!(prompt.contains("static-analysis unavailable (failed: semgrep missing)"));
        assert!(prompt.contains("exploit-check: no findings"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_review_prompt(&Artifact::new("x", "python"), &DetectorContext::empty());
        assert!(prompt.contains("following python code"));
        assert_eq!(prompt.matches(NOT_AVAILABLE).count(), 2);
    }
}
