//! Generic detector trait

use async_trait::async_trait;
use std::time::Instant;

use super::AdapterError;
use crate::{Artifact, DetectorKind, DetectorResult, Finding};

/// What a detector produced when it ran to completion
#[derive(Debug, Clone, Default)]
pub struct DetectorOutput {
    /// Normalized findings, in the order the detector reported them
    pub findings: Vec<Finding>,
    /// The detector's native output, kept verbatim for the report
    pub raw_output: String,
}

impl DetectorOutput {
    pub fn new(findings: Vec<Finding>, raw_output: impl Into<String>) -> Self {
        Self {
            findings,
            raw_output: raw_output.into(),
        }
    }
}

/// Results of earlier detectors, made available to detectors that build on them
#[derive(Debug, Clone, Default)]
pub struct DetectorContext {
    prior: Vec<(DetectorKind, String)>,
}

impl DetectorContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from already-finished results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a DetectorResult>) -> Self {
        Self {
            prior: results
                .into_iter()
                .map(|r| (r.detector(), r.summary()))
                .collect(),
        }
    }

    /// Summary of an earlier detector, if it is part of this context
    pub fn summary_for(&self, kind: DetectorKind) -> Option<&str> {
        self.prior
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.prior.is_empty()
    }
}

/// Trait for detector adapters
///
/// Implementors only write [`Detector::run`]. Callers go through
/// [`Detector::invoke`], which never lets an error escape: every fault
/// becomes a `failed` or `timed-out` [`DetectorResult`].
#[async_trait]
pub trait Detector: Send + Sync {
    /// Which detector slot this adapter fills
    fn kind(&self) -> DetectorKind;

    /// Run the detector against an artifact
    ///
    /// # Arguments
    /// * `artifact` - The code under audit
    /// * `context` - Summaries from detectors that ran before this one
    async fn run(
        &self,
        artifact: &Artifact,
        context: &DetectorContext,
    ) -> Result<DetectorOutput, AdapterError>;

    /// Run the detector and convert the outcome into a [`DetectorResult`]
    async fn invoke(&self, artifact: &Artifact, context: &DetectorContext) -> DetectorResult {
        let kind = self.kind();
        let started = Instant::now();

        let result = match self.run(artifact, context).await {
            Ok(output) => DetectorResult::success(kind, output.findings, output.raw_output),
            Err(err) => {
                tracing::warn!(detector = %kind, error = %err, "detector failed");
                err.into_result(kind)
            }
        };

        result.with_elapsed_ms(started.elapsed().as_millis() as u64)
    }
}
