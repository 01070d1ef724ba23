//! Per-detector configuration tables

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[static_analysis]` - the external Semgrep-compatible engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAnalysisConfig {
    /// Engine binary
    #[serde(default = "default_static_binary")]
    pub binary: String,

    /// Argument template. `{config}` and `{path}` are substituted per call.
    #[serde(default = "default_static_args")]
    pub args: Vec<String>,

    /// Rule profile passed as `{config}`
    #[serde(default = "default_config_profile")]
    pub config_profile: String,

    #[serde(default = "default_static_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_static_binary() -> String {
    "semgrep".to_string()
}

fn default_static_args() -> Vec<String> {
    vec![
        "--config".to_string(),
        "{config}".to_string(),
        "--json".to_string(),
        "--quiet".to_string(),
        "{path}".to_string(),
    ]
}

fn default_config_profile() -> String {
    "auto".to_string()
}

fn default_static_timeout_secs() -> u64 {
    30
}

impl Default for StaticAnalysisConfig {
    fn default() -> Self {
        Self {
            binary: default_static_binary(),
            args: default_static_args(),
            config_profile: default_config_profile(),
            timeout_secs: default_static_timeout_secs(),
        }
    }
}

impl StaticAnalysisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[exploit_check]` - the in-process signature checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploitCheckConfig {
    #[serde(default = "default_exploit_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_exploit_timeout_secs() -> u64 {
    10
}

impl Default for ExploitCheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_exploit_timeout_secs(),
        }
    }
}

impl ExploitCheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[semantic_review]` - the language-model reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticReviewConfig {
    /// Chat-completions endpoint (OpenAI-compatible)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the endpoint. Without one the reviewer reports `failed`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_semantic_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_semantic_timeout_secs() -> u64 {
    60
}

impl Default for SemanticReviewConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_semantic_timeout_secs(),
        }
    }
}

impl SemanticReviewConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The configured key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
