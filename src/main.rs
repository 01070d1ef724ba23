use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::audit::{AuditOptions, ReportFormat};

/// Exit code for a report where at least one detector did not succeed
const EXIT_PARTIAL: u8 = 2;

#[derive(Parser)]
#[command(name = "redaudit")]
#[command(about = "Security audit pipeline: static analysis, exploit signatures and LLM review")]
#[command(version)]
struct Cli {
    /// Working directory used to look up .redaudit/config.toml (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to the config file (defaults to .redaudit/config.toml, then ~/.redaudit/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a source file and print the report
    Audit {
        /// Source file to audit
        file: PathBuf,

        /// Language tag (inferred from the file extension when omitted)
        #[arg(short, long)]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// API key for the semantic reviewer (overrides the config file)
        #[arg(long)]
        api_key: Option<String>,

        /// Run static analysis and the exploit check one after the other
        #[arg(long)]
        sequential: bool,
    },

    /// Initialize a new .redaudit/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so reports on stdout stay clean
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let work_dir = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Audit {
            file,
            language,
            format,
            output,
            api_key,
            sequential,
        } => {
            let options = AuditOptions {
                file,
                language,
                format,
                output,
                api_key,
                sequential,
            };
            let report =
                cli::audit::audit_command(&work_dir, cli.config.as_deref(), options).await?;
            if report.is_complete() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_PARTIAL))
            }
        }
        Commands::Init { force } => {
            cli::init::init_command(&work_dir, cli.config, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
