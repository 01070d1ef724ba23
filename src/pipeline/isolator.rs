//! Per-detector deadlines

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::detector::{AdapterError, Detector, DetectorContext};
use crate::{Artifact, DetectorKind, DetectorResult};

/// Time budget for each detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub static_analysis: Duration,
    pub exploit_check: Duration,
    pub semantic_review: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            static_analysis: Duration::from_secs(30),
            exploit_check: Duration::from_secs(10),
            semantic_review: Duration::from_secs(60),
        }
    }
}

impl TimeoutPolicy {
    /// Same budget for every detector
    pub fn uniform(budget: Duration) -> Self {
        Self {
            static_analysis: budget,
            exploit_check: budget,
            semantic_review: budget,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            static_analysis: config.static_analysis.timeout(),
            exploit_check: config.exploit_check.timeout(),
            semantic_review: config.semantic_review.timeout(),
        }
    }

    pub fn budget(&self, kind: DetectorKind) -> Duration {
        match kind {
            DetectorKind::StaticAnalysis => self.static_analysis,
            DetectorKind::ExploitCheck => self.exploit_check,
            DetectorKind::SemanticReview => self.semantic_review,
        }
    }

    pub fn with_budget(mut self, kind: DetectorKind, budget: Duration) -> Self {
        match kind {
            DetectorKind::StaticAnalysis => self.static_analysis = budget,
            DetectorKind::ExploitCheck => self.exploit_check = budget,
            DetectorKind::SemanticReview => self.semantic_review = budget,
        }
        self
    }

    /// Sum of all budgets
    pub fn total(&self) -> Duration {
        self.static_analysis + self.exploit_check + self.semantic_review
    }
}

/// Runs one detector under its budget
///
/// When the budget runs out the detector future is dropped, which kills its
/// child process and removes its scratch file, and a `timed-out` result is
/// returned in its place.
#[derive(Debug, Clone, Default)]
pub struct Isolator {
    policy: TimeoutPolicy,
}

impl Isolator {
    pub fn new(policy: TimeoutPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    pub async fn run(
        &self,
        detector: &dyn Detector,
        artifact: &Artifact,
        context: &DetectorContext,
    ) -> DetectorResult {
        let kind = detector.kind();
        let budget = self.policy.budget(kind);
        let started = Instant::now();

        tracing::info!(detector = %kind, budget_ms = budget.as_millis() as u64, "detector started");

        let result = match tokio::time::timeout(budget, detector.invoke(artifact, context)).await {
            Ok(result) => result,
            Err(_) => AdapterError::Timeout { budget }
                .into_result(kind)
                .with_elapsed_ms(started.elapsed().as_millis() as u64),
        };

        if result.is_success() {
            tracing::info!(
                detector = %kind,
                status = %result.status(),
                findings = result.findings().len(),
                elapsed_ms = result.elapsed_ms(),
                "detector finished"
            );
        } else {
            tracing::warn!(
                detector = %kind,
                status = %result.status(),
                elapsed_ms = result.elapsed_ms(),
                error = result.error().unwrap_or_default(),
                "detector did not succeed"
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectorOutput;
    use crate::DetectorStatus;
    use async_trait::async_trait;

    struct Sleeper(Duration);

    #[async_trait]
    impl Detector for Sleeper {
        fn kind(&self) -> DetectorKind {
            DetectorKind::SemanticReview
        }

        async fn run(
            &self,
            _artifact: &Artifact,
            _context: &DetectorContext,
        ) -> Result<DetectorOutput, AdapterError> {
            tokio::time::sleep(self.0).await;
            Ok(DetectorOutput::default())
        }
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = Config::default();
        config.exploit_check.timeout_secs = 3;
        let policy = TimeoutPolicy::from_config(&config);

        assert_eq!(policy.budget(DetectorKind::ExploitCheck), Duration::from_secs(3));
        assert_eq!(policy.budget(DetectorKind::StaticAnalysis), Duration::from_secs(30));
        assert_eq!(policy.total(), Duration::from_secs(93));
        assert_eq!(TimeoutPolicy::default(), TimeoutPolicy::from_config(&Config::default()));
    }

    #[tokio::test]
    async fn test_fast_detector_succeeds() {
        let isolator = Isolator::new(TimeoutPolicy::uniform(Duration::from_secs(5)));
        let result = isolator
            .run(
                &Sleeper(Duration::from_millis(1)),
                &Artifact::new("x", "js"),
                &DetectorContext::empty(),
            )
            .await;
        assert_eq!(result.status(), DetectorStatus::Success);
    }

    #[tokio::test]
    async fn test_slow_detector_times_out_within_budget() {
        let policy = TimeoutPolicy::default()
            .with_budget(DetectorKind::SemanticReview, Duration::from_millis(50));
        let isolator = Isolator::new(policy);

        let started = Instant::now();
        let result = isolator
            .run(
                &Sleeper(Duration::from_secs(30)),
                &Artifact::new("x", "js"),
                &DetectorContext::empty(),
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.status(), DetectorStatus::TimedOut);
        assert_eq!(result.detector(), DetectorKind::SemanticReview);
        assert!(result.error().unwrap().contains("50ms"));
    }
}
