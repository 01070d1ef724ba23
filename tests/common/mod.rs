//! Shared test utilities for pipeline integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use redaudit::config::StaticAnalysisConfig;
use redaudit::detector::{
    AdapterError, ExploitCheckAdapter, LanguageModel, SemanticReviewAdapter,
    StaticAnalysisAdapter,
};
use redaudit::DetectorSet;

/// Semgrep-shaped output with one warning-level result on line 2
pub const SEMGREP_ONE_RESULT: &str = r#"{"version":"1.50.0","results":[{"check_id":"javascript.lang.security.audit.eval-detected","start":{"line":2,"col":1,"offset":31},"extra":{"message":"Detected eval with user input","severity":"WARNING","metadata":{"cwe":["CWE-95"]}}}],"errors":[]}"#;

/// ERROR-level result the engine itself rates low-confidence
pub const SEMGREP_LOW_CONFIDENCE_ERROR: &str = r#"{"results":[{"check_id":"javascript.express.security.injection.tainted-sql","start":{"line":1,"col":1},"extra":{"message":"Tainted SQL string","severity":"ERROR","metadata":{"confidence":"LOW"}}}],"errors":[]}"#;

pub const JS_EVAL_AND_SECRET: &str =
    "const password = \"supersecret\";\neval(userInput);\n";

/// Static-analysis config that runs `sh -c <script>` with the scratch path as `$1`
pub fn sh_engine(script: &str) -> StaticAnalysisConfig {
    StaticAnalysisConfig {
        binary: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            script.to_string(),
            "sh".to_string(),
            "{path}".to_string(),
        ],
        ..StaticAnalysisConfig::default()
    }
}

/// Engine that prints `json` and exits 0
pub fn engine_printing(json: &str) -> StaticAnalysisConfig {
    sh_engine(&format!("printf '%s' '{}'", json))
}

/// Scripted language model
pub struct MockModel {
    reply: Result<String, AdapterError>,
    delay: Duration,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok("too late".to_string()),
            delay,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(AdapterError::process(message)),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String, AdapterError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Production adapters, with a scripted engine and model
pub fn detectors(engine: StaticAnalysisConfig, model: Arc<MockModel>) -> DetectorSet {
    DetectorSet {
        static_analysis: Arc::new(StaticAnalysisAdapter::new(engine)),
        exploit_check: Arc::new(ExploitCheckAdapter::new()),
        semantic_review: Arc::new(SemanticReviewAdapter::new(model)),
    }
}

/// True while `pid` exists and is not a zombie
#[cfg(target_os = "linux")]
pub fn is_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.trim_start().chars().next())
            .is_some_and(|state| state != 'Z' && state != 'X'),
        Err(_) => false,
    }
}
