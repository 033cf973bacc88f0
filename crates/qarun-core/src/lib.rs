//! qarun core - QA result aggregation and reporting
//!
//! Turns raw verification step records into:
//! - one PASS / FAIL / N-A verdict per step and per run
//! - nine quality areas (A–I) with evidence, risk and fix text
//! - a risk-bucketed backlog with stable IDs
//! - remediation hints
//! - a deterministic Markdown report

pub mod areas;
pub mod backlog;
pub mod combine;
pub mod domain;
pub mod evidence;
pub mod obs;
pub mod recommend;
pub mod report;
pub mod skips;
pub mod telemetry;

pub use areas::{
    area_spec, derive_area_results, derive_area_results_with, fix_for_area, risk_for_area,
    AreaSource, AreaSpec, AREA_TABLE,
};
pub use backlog::{build_backlog, Backlog, BacklogEntry};
pub use combine::{combine_statuses, overall_status};
pub use domain::{
    find_step, AreaCode, AreaResult, QaError, Result, Risk, Status, StepKind, StepResult,
    NOT_EXECUTED_COMMAND,
};
pub use evidence::{clip_text, EvidenceExtractor};
pub use obs::{
    emit_report_written, emit_run_finished, emit_run_started, emit_step_demoted,
    emit_step_finished, RunSpan,
};
pub use recommend::build_recommendations;
pub use report::{
    flow_check, md_cell, trim_output, write_report, FlowCheck, ReportContext, RunAssessment,
};
pub use skips::{demote_skipped, detect_skips};
pub use telemetry::init_tracing;

/// qarun version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
