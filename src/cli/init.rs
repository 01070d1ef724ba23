//! Init command implementation

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use redaudit::config::CONFIG_DIR;

/// Default configuration content for `redaudit init`
pub const DEFAULT_CONFIG: &str = r#"# redaudit configuration
# ======================
#
# Every key is optional; removing one falls back to the value shown here.

# ============================================================================
# STATIC ANALYSIS - external Semgrep-compatible engine
# ============================================================================
#
#   binary          - Engine executable (looked up on PATH)
#   args            - Argument template; {config} and {path} are substituted
#   config_profile  - Rule profile passed as {config}
#   timeout_secs    - Budget for one run

[static_analysis]
binary = "semgrep"
args = ["--config", "{config}", "--json", "--quiet", "{path}"]
config_profile = "auto"
timeout_secs = 30

# ============================================================================
# EXPLOIT CHECK - built-in signature scanner
# ============================================================================

[exploit_check]
timeout_secs = 10

# ============================================================================
# SEMANTIC REVIEW - language model (OpenAI-compatible chat completions)
# ============================================================================
#
# Without an API key the review still runs and is reported as failed.
# The key can also be passed per call with `redaudit audit --api-key`.

[semantic_review]
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o"
# api_key = "sk-..."
max_tokens = 1000
temperature = 0.0
timeout_secs = 60

# ============================================================================
# PIPELINE
# ============================================================================
#
#   concurrent           - Run static analysis and the exploit check side by side
#   deadline_margin_secs - Slack on top of the summed budgets for a whole audit

[pipeline]
concurrent = true
deadline_margin_secs = 5
"#;

/// Where `init` writes when no `--config` path is given
pub fn default_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(CONFIG_DIR).join("config.toml")
}

pub fn init_command(work_dir: &Path, config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(|| default_config_path(work_dir));

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created: {}", config_path.display());

    Ok(())
}
