//! Semgrep (or compatible engine) detector adapter

use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::parser::parse_semgrep_json;
use super::process::{isolate_group, ProcessGroupGuard};
use crate::config::StaticAnalysisConfig;
use crate::detector::{AdapterError, Detector, DetectorContext, DetectorOutput};
use crate::{Artifact, DetectorKind};

/// How much of the engine's stderr ends up in an error message
const STDERR_TAIL_CHARS: usize = 600;

/// Runs an external static-analysis engine over a scratch copy of the artifact
///
/// The scratch file is a [`NamedTempFile`] owned by the `run` future, so it
/// is removed on success, on error, and when the future is dropped because
/// the isolator's deadline fired. The engine runs in its own process group,
/// which is killed when the future is dropped before the engine exits.
pub struct StaticAnalysisAdapter {
    config: StaticAnalysisConfig,
}

impl StaticAnalysisAdapter {
    pub fn new(config: StaticAnalysisConfig) -> Self {
        Self { config }
    }

    /// Substitute `{config}` and `{path}` into the argument template
    fn build_args(&self, path: &Path) -> Vec<String> {
        let path = path.display().to_string();
        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{config}", &self.config.config_profile)
                    .replace("{path}", &path)
            })
            .collect()
    }

    /// Write the artifact to a uniquely named file the engine can read
    fn write_scratch_file(artifact: &Artifact) -> Result<NamedTempFile, AdapterError> {
        let suffix = format!(".{}", artifact.file_extension());
        let mut file = tempfile::Builder::new()
            .prefix("redaudit-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| AdapterError::process(format!("failed to create scratch file: {}", e)))?;

        file.write_all(artifact.content().as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| AdapterError::process(format!("failed to write scratch file: {}", e)))?;

        Ok(file)
    }
}

impl Default for StaticAnalysisAdapter {
    fn default() -> Self {
        Self::new(StaticAnalysisConfig::default())
    }
}

#[async_trait]
impl Detector for StaticAnalysisAdapter {
    fn kind(&self) -> DetectorKind {
        DetectorKind::StaticAnalysis
    }

    async fn run(
        &self,
        artifact: &Artifact,
        _context: &DetectorContext,
    ) -> Result<DetectorOutput, AdapterError> {
        let scratch = Self::write_scratch_file(artifact)?;
        let args = self.build_args(scratch.path());

        tracing::debug!(
            binary = %self.config.binary,
            path = %scratch.path().display(),
            "starting static analysis"
        );

        let mut command = Command::new(&self.config.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        isolate_group(&mut command);

        let child = command.spawn().map_err(|e| {
            AdapterError::process(format!("failed to spawn {}: {}", self.config.binary, e))
        })?;
        // Dropped with this future on timeout, taking the engine's helpers with it
        let group = ProcessGroupGuard::new(child.id());

        let output = child.wait_with_output().await.map_err(|e| {
            AdapterError::process(format!("failed to wait for {}: {}", self.config.binary, e))
        })?;
        group.release();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = tail(stderr.trim(), STDERR_TAIL_CHARS);
            let mut message = format!("{} exited with {}", self.config.binary, output.status);
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(stderr);
            }
            return Err(AdapterError::process_with_output(message, stdout));
        }

        let parsed = match parse_semgrep_json(&stdout) {
            Ok(parsed) => parsed,
            Err(AdapterError::ParseFailure { message, .. }) => {
                return Err(AdapterError::parse_with_output(message, stdout));
            }
            Err(other) => return Err(other),
        };

        for warning in &parsed.warnings {
            tracing::warn!(detector = %DetectorKind::StaticAnalysis, "{}", warning);
        }
        if parsed.skipped > 0 {
            tracing::debug!(skipped = parsed.skipped, "skipped ignored results");
        }

        Ok(DetectorOutput::new(parsed.findings, stdout))
    }
}

/// Last `max` characters of `s`, on a char boundary
fn tail(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let skip = count - max;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
