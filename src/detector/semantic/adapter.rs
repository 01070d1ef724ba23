//! Language-model semantic review detector adapter

use async_trait::async_trait;
use std::sync::Arc;

use super::client::{ChatCompletionsClient, LanguageModel};
use super::parser::parse_review;
use super::prompt::build_review_prompt;
use crate::config::SemanticReviewConfig;
use crate::detector::{AdapterError, Detector, DetectorContext, DetectorOutput};
use crate::{Artifact, DetectorKind};

/// Asks a language model to review the artifact in light of the other detectors
///
/// Produces a single advisory finding. Without a configured backend the
/// adapter still runs and reports `failed`, so the report keeps its shape.
pub struct SemanticReviewAdapter {
    model: Option<Arc<dyn LanguageModel>>,
}

impl SemanticReviewAdapter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Reviewer backed by the chat-completions endpoint in `config`
    pub fn from_config(config: &SemanticReviewConfig) -> Self {
        match ChatCompletionsClient::from_config(config) {
            Some(client) => Self::new(Arc::new(client)),
            None => Self::unconfigured(),
        }
    }

    /// Reviewer with no backend; every run fails with a clear reason
    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }
}

#[async_trait]
impl Detector for SemanticReviewAdapter {
    fn kind(&self) -> DetectorKind {
        DetectorKind::SemanticReview
    }

    async fn run(
        &self,
        artifact: &Artifact,
        context: &DetectorContext,
    ) -> Result<DetectorOutput, AdapterError> {
        let Some(model) = &self.model else {
            return Err(AdapterError::process("no API key configured for the language model"));
        };

        let prompt = build_review_prompt(artifact, context);
        tracing::debug!(
            model = model.name(),
            prompt_chars = prompt.len(),
            "requesting semantic review"
        );

        let answer = model.complete(&prompt).await?;

        match parse_review(&answer) {
            Ok(finding) => Ok(DetectorOutput::new(vec![finding], answer)),
            Err(AdapterError::ParseFailure { message, .. }) => {
                Err(AdapterError::parse_with_output(message, answer))
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DetectorResult, DetectorStatus, Severity};
    use std::sync::Mutex;

    /// Records the prompt and replies with a canned answer
    struct CannedModel {
        reply: Result<String, AdapterError>,
        seen: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(reply: Result<String, AdapterError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &str) -> Result<String, AdapterError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_review_produces_one_advisory_finding() {
        let model = CannedModel::new(Ok("Eval usage is a high risk.".to_string()));
        let adapter = SemanticReviewAdapter::new(model.clone());
        let exploit =
            DetectorResult::success(DetectorKind::ExploitCheck, Vec::new(), String::new());
        let context = DetectorContext::from_results([&exploit]);

        let result = adapter
            .invoke(&Artifact::new("eval(x)", "javascript"), &context)
            .await;

        assert!(result.is_success());
        assert_eq!(result.findings().len(), 1);
        assert_eq!(result.findings()[0].severity, Severity::High);
        assert!(result.findings()[0].is_advisory());
        assert_eq!(result.raw_output(), "Eval usage is a high risk.");

        let prompts = model.seen.lock().unwrap();
        assert!(prompts[0].contains("exploit-check: no findings"));
    }

    #[tokio::test]
    async fn test_empty_answer_is_failed_but_kept() {
        let adapter = SemanticReviewAdapter::new(CannedModel::new(Ok("  \n".to_string())));
        let result = adapter
            .invoke(&Artifact::new("x", "js"), &DetectorContext::empty())
            .await;

        assert_eq!(result.status(), DetectorStatus::Failed);
        assert!(result.error().unwrap().contains("empty response"));
        assert_eq!(result.raw_output(), "  \n");
    }

    #[tokio::test]
    async fn test_network_error_is_failed() {
        let adapter = SemanticReviewAdapter::new(CannedModel::new(Err(AdapterError::process(
            "language model endpoint unreachable: connection refused",
        ))));
        let result = adapter
            .invoke(&Artifact::new("x", "js"), &DetectorContext::empty())
            .await;

        assert_eq!(result.status(), DetectorStatus::Failed);
        assert!(result.error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unconfigured_reviewer_fails_cleanly() {
        let adapter = SemanticReviewAdapter::from_config(&SemanticReviewConfig::default());
        assert!(!adapter.is_configured());

        let result = adapter
            .invoke(&Artifact::new("x", "js"), &DetectorContext::empty())
            .await;
        assert_eq!(result.status(), DetectorStatus::Failed);
        assert!(result.error().unwrap().contains("no API key"));
    }
}
