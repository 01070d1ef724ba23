//! Configuration loading and management

mod detectors;
mod pipeline;

pub use detectors::{ExploitCheckConfig, SemanticReviewConfig, StaticAnalysisConfig};
pub use pipeline::PipelineConfig;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory (relative to the working dir or home) holding `config.toml`
pub const CONFIG_DIR: &str = ".redaudit";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub static_analysis: StaticAnalysisConfig,

    #[serde(default)]
    pub exploit_check: ExploitCheckConfig,

    #[serde(default)]
    pub semantic_review: SemanticReviewConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for: .redaudit/config.toml in `dir`, then in the home directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let local = dir.join(CONFIG_DIR).join("config.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(global) = global_config_path() {
            if global.exists() {
                return Self::from_file(&global);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Explicit path wins; otherwise search from `work_dir`
    pub fn load(work_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::from_dir(work_dir),
        }
    }
}

/// `~/.redaudit/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join("config.toml"))
}
