//! Audit command implementation

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

use redaudit::config::Config;
use redaudit::pipeline::AuditPipeline;
use redaudit::report::AuditReport;
use redaudit::Artifact;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Options for one `redaudit audit` invocation
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub file: PathBuf,
    pub language: Option<String>,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub api_key: Option<String>,
    pub sequential: bool,
}

/// Apply command-line overrides on top of the loaded configuration
pub fn apply_overrides(config: &mut Config, options: &AuditOptions) {
    if let Some(key) = &options.api_key {
        config.semantic_review.api_key = Some(key.clone());
    }
    if options.sequential {
        config.pipeline.concurrent = false;
    }
}

pub fn render(report: &AuditReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Markdown => Ok(report.body().to_string()),
        ReportFormat::Json => report.to_json().context("Failed to serialize report"),
    }
}

pub async fn audit_command(
    work_dir: &Path,
    config_path: Option<&Path>,
    options: AuditOptions,
) -> Result<AuditReport> {
    let mut config = Config::load(work_dir, config_path)?;
    apply_overrides(&mut config, &options);

    let artifact = Artifact::from_path(&options.file, options.language.as_deref())?;
    tracing::debug!(
        file = %options.file.display(),
        language = artifact.language(),
        "loaded artifact"
    );

    let pipeline = AuditPipeline::from_config(&config);
    let report = pipeline
        .audit(&artifact)
        .await
        .context("Failed to synthesize audit report")?;

    let rendered = render(&report, options.format)?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(report)
}
