//! Audit pipeline controller
//!
//! Runs the three detectors in a fixed order: static analysis and the exploit
//! check first (side by side unless configured otherwise), then the semantic
//! review with both of their summaries in its context. Every detector produces
//! a result no matter what happens, so the report always has three sections.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use super::isolator::{Isolator, TimeoutPolicy};
use crate::config::Config;
use crate::detector::{
    panic_message, Detector, DetectorContext, ExploitCheckAdapter, SemanticReviewAdapter,
    StaticAnalysisAdapter,
};
use crate::report::{synthesize, AuditReport, SynthesisError};
use crate::{Artifact, DetectorKind, DetectorResult};

/// One adapter per detector slot
#[derive(Clone)]
pub struct DetectorSet {
    pub static_analysis: Arc<dyn Detector>,
    pub exploit_check: Arc<dyn Detector>,
    pub semantic_review: Arc<dyn Detector>,
}

impl DetectorSet {
    /// Production adapters built from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            static_analysis: Arc::new(StaticAnalysisAdapter::new(config.static_analysis.clone())),
            exploit_check: Arc::new(ExploitCheckAdapter::new()),
            semantic_review: Arc::new(SemanticReviewAdapter::from_config(&config.semantic_review)),
        }
    }
}

/// Orchestrates one audit call end to end
pub struct AuditPipeline {
    detectors: DetectorSet,
    isolator: Isolator,
    concurrent: bool,
    deadline_margin: Duration,
}

impl AuditPipeline {
    pub fn new(detectors: DetectorSet, policy: TimeoutPolicy) -> Self {
        Self {
            detectors,
            isolator: Isolator::new(policy),
            concurrent: true,
            deadline_margin: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DetectorSet::from_config(config), TimeoutPolicy::from_config(config))
            .with_concurrency(config.pipeline.concurrent)
            .with_deadline_margin(config.pipeline.deadline_margin())
    }

    /// Run static analysis and the exploit check side by side (default) or one after the other
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_deadline_margin(mut self, margin: Duration) -> Self {
        self.deadline_margin = margin;
        self
    }

    /// Upper bound on a whole [`AuditPipeline::audit`] call
    pub fn max_duration(&self) -> Duration {
        self.isolator.policy().total() + self.deadline_margin
    }

    /// Audit source text in the given language
    pub async fn audit_source(
        &self,
        content: &str,
        language: &str,
    ) -> Result<AuditReport, SynthesisError> {
        self.audit(&Artifact::new(content, language)).await
    }

    /// Audit an artifact
    ///
    /// Detector faults never fail the call; they show up as `failed` or
    /// `timed-out` sections of a partial report. An `Err` means the result
    /// set handed to the synthesizer was malformed.
    pub async fn audit(&self, artifact: &Artifact) -> Result<AuditReport, SynthesisError> {
        let deadline = Instant::now() + self.max_duration();
        let artifact = Arc::new(artifact.clone());

        tracing::info!(
            language = artifact.language(),
            lines = artifact.line_count(),
            concurrent = self.concurrent,
            deadline_ms = self.max_duration().as_millis() as u64,
            "audit started"
        );

        let detectors = &self.detectors;
        let (static_result, exploit_result) = if self.concurrent {
            let static_task =
                self.spawn(&detectors.static_analysis, &artifact, DetectorContext::empty());
            let exploit_task =
                self.spawn(&detectors.exploit_check, &artifact, DetectorContext::empty());
            (
                settle(DetectorKind::StaticAnalysis, static_task, deadline).await,
                settle(DetectorKind::ExploitCheck, exploit_task, deadline).await,
            )
        } else {
            let static_result = self
                .run_before(
                    &detectors.static_analysis,
                    &artifact,
                    DetectorContext::empty(),
                    deadline,
                )
                .await;
            let exploit_result = self
                .run_before(&detectors.exploit_check, &artifact, DetectorContext::empty(), deadline)
                .await;
            (static_result, exploit_result)
        };

        // Both prerequisites are settled at this point
        let context = DetectorContext::from_results([&static_result, &exploit_result]);
        let semantic_result = self
            .run_before(&detectors.semantic_review, &artifact, context, deadline)
            .await;

        let report = synthesize(vec![static_result, exploit_result, semantic_result])?;

        tracing::info!(
            status = %report.status(),
            findings = report.summary().total(),
            risk_score = report.risk().score,
            "audit finished"
        );

        Ok(report)
    }

    fn spawn(
        &self,
        detector: &Arc<dyn Detector>,
        artifact: &Arc<Artifact>,
        context: DetectorContext,
    ) -> JoinHandle<DetectorResult> {
        let isolator = self.isolator.clone();
        let detector = Arc::clone(detector);
        let artifact = Arc::clone(artifact);

        tokio::spawn(async move { isolator.run(detector.as_ref(), &artifact, &context).await })
    }

    /// Start a detector unless the call deadline has already passed, then settle it
    async fn run_before(
        &self,
        detector: &Arc<dyn Detector>,
        artifact: &Arc<Artifact>,
        context: DetectorContext,
        deadline: Instant,
    ) -> DetectorResult {
        let kind = detector.kind();
        if Instant::now() >= deadline {
            tracing::warn!(detector = %kind, "audit deadline passed, detector not started");
            return DetectorResult::timed_out(
                kind,
                "audit deadline passed before the detector started",
            );
        }

        let task = self.spawn(detector, artifact, context);
        settle(kind, task, deadline).await
    }
}

/// Await a detector task, aborting it if the call deadline passes first
async fn settle(
    kind: DetectorKind,
    mut task: JoinHandle<DetectorResult>,
    deadline: Instant,
) -> DetectorResult {
    match tokio::time::timeout_at(deadline, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => join_failure(kind, err),
        Err(_) => {
            task.abort();
            tracing::warn!(detector = %kind, "audit deadline exceeded, detector aborted");
            DetectorResult::timed_out(kind, "audit deadline exceeded before the detector finished")
        }
    }
}

fn join_failure(kind: DetectorKind, err: JoinError) -> DetectorResult {
    let message = if err.is_panic() {
        format!("detector panicked: {}", panic_message(err.into_panic()))
    } else {
        "detector task was cancelled".to_string()
    };
    tracing::error!(detector = %kind, error = %message, "detector task failed");
    DetectorResult::failed(kind, message, String::new())
}
