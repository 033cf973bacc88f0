//! Structured observability hooks for the QA run lifecycle.
//!
//! Every event is emitted at `info!` (or `warn!`) with an `event` field so
//! JSON log consumers can filter on it.

use tracing::{info, warn};

use crate::domain::{Status, StepResult};

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// ```ignore
/// let _span = RunSpan::enter("6f1c...");
/// // every log line below carries run_id
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("qarun.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started for a project/module.
pub fn emit_run_started(project_root: &str, module_id: &str, timeout_secs: u64) {
    info!(
        event = "run.started",
        project_root = %project_root,
        module_id = %module_id,
        timeout_secs = timeout_secs,
    );
}

/// Emit event: a step was recorded (executed or skipped).
pub fn emit_step_finished(step: &StepResult) {
    info!(
        event = "step.finished",
        step = %step.name,
        status = %step.status,
        exit_code = ?step.exit_code,
        duration_ms = step.duration_ms,
        note = %step.note,
    );
}

/// Emit event: a passing step was demoted because tests were skipped.
pub fn emit_step_demoted(step: &StepResult) {
    warn!(event = "step.demoted", step = %step.name, note = %step.note);
}

/// Emit event: report written with its content digest.
pub fn emit_report_written(path: &str, digest: &str, bytes: usize) {
    info!(event = "report.written", path = %path, digest = %digest, bytes = bytes);
}

/// Emit event: run finished with the overall verdict.
pub fn emit_run_finished(overall: Status, duration_ms: u64, failed_areas: usize) {
    info!(
        event = "run.finished",
        overall = %overall,
        duration_ms = duration_ms,
        failed_areas = failed_areas,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
        emit_step_finished(&StepResult::not_executed("Static Shell Audit", "skipped"));
    }
}
