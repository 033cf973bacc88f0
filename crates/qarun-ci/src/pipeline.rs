//! QA pipeline orchestration.

use chrono::NaiveDateTime;
use qarun_core::{
    demote_skipped, derive_area_results, emit_report_written, emit_run_finished,
    emit_run_started, emit_step_demoted, emit_step_finished, overall_status, write_report,
    ReportContext, RunSpan, Status, StepKind, StepResult,
};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::QaRunConfig;
use crate::runner::{run_step, CommandRunner};
use crate::step::{plan_steps, success_note, Prerequisites, StepPlan};

/// Result of a complete QA run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Unique id for log correlation.
    pub run_id: String,

    /// Step records in execution order.
    pub steps: Vec<StepResult>,

    /// Overall verdict.
    pub overall: Status,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn passed_count(&self) -> usize {
        self.count(Status::Pass)
    }

    pub fn failed_count(&self) -> usize {
        self.count(Status::Fail)
    }

    pub fn not_applicable_count(&self) -> usize {
        self.count(Status::NotApplicable)
    }

    fn count(&self, status: Status) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Render the report for this run and write it to `report_path`.
    ///
    /// Returns the SHA-256 digest of the written bytes.
    pub fn write_report(
        &self,
        config: &QaRunConfig,
        report_path: &Path,
        generated_at: NaiveDateTime,
    ) -> qarun_core::Result<String> {
        let ctx = ReportContext {
            steps: &self.steps,
            generated_at,
            report_path,
            project_root: &config.project_root,
            module_id: &config.module_id,
            bitrix_root: config.bitrix_root.as_deref(),
        };
        let content = ctx.render_markdown();
        let digest = write_report(report_path, &content)?;
        emit_report_written(&report_path.display().to_string(), &digest, content.len());
        Ok(digest)
    }
}

/// QA pipeline orchestrator.
pub struct QaPipeline;

impl QaPipeline {
    /// Decide which steps run, based on flags and what exists on disk.
    pub fn plan(config: &QaRunConfig) -> Vec<StepPlan> {
        plan_steps(config, &Prerequisites::discover(config))
    }

    /// Execute the steps in order.
    ///
    /// Steps never abort the run: every planned step yields a record, and
    /// the integration suite is demoted to N-A when it reports skipped tests.
    pub async fn run(runner: &dyn CommandRunner, config: &QaRunConfig) -> PipelineResult {
        Self::run_plans(runner, config, Self::plan(config)).await
    }

    /// Execute an already-computed plan.
    pub async fn run_plans(
        runner: &dyn CommandRunner,
        config: &QaRunConfig,
        plans: Vec<StepPlan>,
    ) -> PipelineResult {
        let start = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        let _span = RunSpan::enter(&run_id);

        emit_run_started(
            &config.project_root.display().to_string(),
            &config.module_id,
            config.timeout_secs,
        );

        let mut steps = Vec::with_capacity(plans.len());
        for plan in plans {
            let step = match &plan {
                StepPlan::Skip { kind, note } => StepResult::not_executed(kind.name(), *note),
                StepPlan::Run { kind, command } => {
                    info!(step = kind.name(), command = %command.display(), "running step");
                    let step = run_step(runner, kind.name(), command, success_note(*kind)).await;
                    if *kind == StepKind::IntegrationSuite {
                        demote_if_skipped(step)
                    } else {
                        step
                    }
                }
            };
            emit_step_finished(&step);
            steps.push(step);
        }

        let overall = overall_status(&steps);
        let failed_areas = derive_area_results(&steps)
            .iter()
            .filter(|a| a.status == Status::Fail)
            .count();
        let duration_ms = start.elapsed().as_millis() as u64;
        emit_run_finished(overall, duration_ms, failed_areas);

        PipelineResult {
            run_id,
            steps,
            overall,
            duration_ms,
        }
    }
}

fn demote_if_skipped(step: StepResult) -> StepResult {
    let before = step.status;
    let step = demote_skipped(step);
    if step.status != before {
        emit_step_demoted(&step);
    }
    step
}
