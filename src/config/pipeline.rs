//! Pipeline-wide settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[pipeline]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run static analysis and the exploit check side by side
    #[serde(default = "default_concurrent")]
    pub concurrent: bool,

    /// Slack added on top of the summed detector budgets for the whole call
    #[serde(default = "default_deadline_margin_secs")]
    pub deadline_margin_secs: u64,
}

fn default_concurrent() -> bool {
    true
}

fn default_deadline_margin_secs() -> u64 {
    5
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrent: default_concurrent(),
            deadline_margin_secs: default_deadline_margin_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn deadline_margin(&self) -> Duration {
        Duration::from_secs(self.deadline_margin_secs)
    }
}
