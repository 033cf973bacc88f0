//! qarun - QA pipeline runner for Bitrix modules
//!
//! Runs the static shell audit, the static PHPUnit suite and the integration
//! PHPUnit suite in order, then writes one Markdown report with an A-I area
//! summary and a risk-sorted fix backlog.
//!
//! Exits 1 when the overall status is FAIL.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

use qarun_ci::{
    PipelineResult, ProcessRunner, QaGate, QaPipeline, QaRunConfig, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(name = "qarun")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run module QA checks and write a Markdown report", long_about = None)]
struct Cli {
    /// Module project root (commands run here)
    #[arg(long)]
    project_root: PathBuf,

    /// Module identifier, e.g. vendor.module
    #[arg(long)]
    module_id: String,

    /// Bitrix installation root for the integration suite
    #[arg(long, env = "BITRIX_ROOT")]
    bitrix_root: Option<String>,

    /// Report path, relative to the working directory
    /// (default: <project-root>/tests/qa-run-report-<timestamp>.md)
    #[arg(long)]
    report: Option<PathBuf>,

    /// PHPUnit executable (default: vendor/bin/phpunit, then PATH)
    #[arg(long)]
    phpunit_bin: Option<PathBuf>,

    /// Static shell audit script (default: qa-static-audit.sh)
    #[arg(long)]
    static_script: Option<PathBuf>,

    /// Do not run the static shell audit
    #[arg(long)]
    skip_static_script: bool,

    /// Do not run the integration suite
    #[arg(long)]
    skip_integration: bool,

    /// Per-step timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> QaRunConfig {
        QaRunConfig {
            project_root: self.project_root,
            module_id: self.module_id,
            bitrix_root: self.bitrix_root,
            report: self.report,
            phpunit_bin: self.phpunit_bin,
            static_script: self.static_script,
            skip_static_script: self.skip_static_script,
            skip_integration: self.skip_integration,
            timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    qarun_core::init_tracing(cli.json, level);

    let config = cli
        .into_config()
        .validate()
        .context("Invalid run configuration")?;

    info!(
        project_root = %config.project_root.display(),
        module_id = %config.module_id,
        "starting QA run"
    );

    let generated_at = chrono::Local::now().naive_local();
    let report_path = config.resolve_report_path(generated_at);

    let result = QaPipeline::run(&ProcessRunner, &config).await;
    result
        .write_report(&config, &report_path, generated_at)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    print!("{}", summary(&result, &report_path.display().to_string()));

    let verdict = QaGate::evaluate(&result.steps);
    for violation in &verdict.violations {
        info!(violation = %violation, "gate violation");
    }
    Ok(ExitCode::from(verdict.exit_code()))
}

/// Console summary printed after the report is written.
fn summary(result: &PipelineResult, report_path: &str) -> String {
    let mut out = format!("Report: {report_path}\n");
    for step in &result.steps {
        out.push_str(&format!(
            "{}: {} (exit={})\n",
            step.status,
            step.name,
            step.exit_code_label()
        ));
    }
    out.push_str(&format!("Overall: {}\n", result.overall));
    out
}
