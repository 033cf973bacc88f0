//! Deterministic Markdown report for a QA run.
//!
//! Identical step records and timestamp always render byte-identical output:
//! nothing in here reads the clock or the environment.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

use crate::areas::derive_area_results;
use crate::backlog::{build_backlog, Backlog, BUCKETS};
use crate::combine::overall_status;
use crate::domain::{AreaResult, QaError, Result, Status, StepKind, StepResult};
use crate::evidence::clip_text;
use crate::recommend::build_recommendations;
use crate::skips::detect_skips;

/// Maximum transcript lines kept per stream.
pub const TRANSCRIPT_MAX_LINES: usize = 140;

/// Maximum transcript characters kept per stream.
pub const TRANSCRIPT_MAX_CHARS: usize = 12_000;

/// Default clip width for table cells.
pub const CELL_LIMIT: usize = 220;

/// Timestamp format used in the report header.
pub const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether executed static steps all ran before the executed integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowCheck {
    Yes,
    No,
    /// The integration step did not run.
    NotApplicable,
}

impl fmt::Display for FlowCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowCheck::Yes => "Yes",
            FlowCheck::No => "No",
            FlowCheck::NotApplicable => "N-A",
        })
    }
}

/// Check the static-before-integration ordering over executed steps.
pub fn flow_check(steps: &[StepResult]) -> FlowCheck {
    let executed = |pred: fn(StepKind) -> bool| -> Vec<usize> {
        steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status != Status::NotApplicable)
            .filter(|(_, s)| s.kind().is_some_and(pred))
            .map(|(idx, _)| idx)
            .collect()
    };
    let static_idx = executed(|k| k.is_static());
    let integration_idx = executed(|k| k == StepKind::IntegrationSuite);

    match (static_idx.iter().max(), integration_idx.iter().min()) {
        (_, None) => FlowCheck::NotApplicable,
        (None, Some(_)) => FlowCheck::No,
        (Some(last_static), Some(first_integration)) if last_static < first_integration => {
            FlowCheck::Yes
        }
        _ => FlowCheck::No,
    }
}

/// Trim a transcript to its tail.
///
/// Keeps the last [`TRANSCRIPT_MAX_LINES`] lines (with a marker carrying the
/// original line count) and then the last [`TRANSCRIPT_MAX_CHARS`] characters.
pub fn trim_output(text: &str) -> String {
    let stripped = text.trim();
    if stripped.is_empty() {
        return "(empty)".to_string();
    }

    let lines: Vec<&str> = stripped.lines().collect();
    let mut compact = if lines.len() > TRANSCRIPT_MAX_LINES {
        let tail = &lines[lines.len() - TRANSCRIPT_MAX_LINES..];
        format!(
            "[... trimmed, total lines: {} ...]\n{}",
            lines.len(),
            tail.join("\n")
        )
    } else {
        lines.join("\n")
    };

    let char_count = compact.chars().count();
    if char_count > TRANSCRIPT_MAX_CHARS {
        let tail: String = compact
            .chars()
            .skip(char_count - TRANSCRIPT_MAX_CHARS)
            .collect();
        compact = format!("[... trimmed ...]\n{tail}");
    }
    compact
}

/// Clip text for a Markdown table cell and escape pipes.
pub fn md_cell(text: &str, limit: usize) -> String {
    clip_text(text, limit).replace('|', "\\|")
}

/// Everything derived from the step records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunAssessment {
    pub overall: Status,
    pub flow: FlowCheck,
    pub areas: Vec<AreaResult>,
    pub backlog: Backlog,
    pub recommendations: Vec<String>,
}

impl RunAssessment {
    pub fn evaluate(steps: &[StepResult], project_root: &Path, module_id: &str) -> Self {
        let areas = derive_area_results(steps);
        let backlog = build_backlog(&areas);
        Self {
            overall: overall_status(steps),
            flow: flow_check(steps),
            recommendations: build_recommendations(steps, project_root, module_id),
            areas,
            backlog,
        }
    }
}

/// Inputs to the report renderer.
pub struct ReportContext<'a> {
    pub steps: &'a [StepResult],
    pub generated_at: NaiveDateTime,
    pub report_path: &'a Path,
    pub project_root: &'a Path,
    pub module_id: &'a str,
    pub bitrix_root: Option<&'a str>,
}

impl<'a> ReportContext<'a> {
    pub fn assess(&self) -> RunAssessment {
        RunAssessment::evaluate(self.steps, self.project_root, self.module_id)
    }

    /// Render the full report.
    pub fn render_markdown(&self) -> String {
        let assessment = self.assess();
        let mut md = String::from("# QA Run Report\n");

        md.push_str("\n## Header\n\n");
        md.push_str(&format!(
            "- Generated: {}\n",
            self.generated_at.format(GENERATED_FORMAT)
        ));
        md.push_str(&format!("- Project root: `{}`\n", self.project_root.display()));
        md.push_str(&format!("- Module ID: `{}`\n", self.module_id));
        md.push_str(&format!(
            "- Bitrix root: `{}`\n",
            self.bitrix_root.unwrap_or("not provided")
        ));
        md.push_str(&format!("- Report file: `{}`\n", self.report_path.display()));
        md.push_str(&format!("- Overall status: **{}**\n", assessment.overall));

        md.push_str("\n## Flow\n\n");
        md.push_str(&format!("- Static before integration: {}\n", assessment.flow));

        md.push_str("\n## Summary\n\n");
        md.push_str("| Step | Status | Exit code | Duration (s) | Command |\n");
        md.push_str("|---|---|---:|---:|---|\n");
        for step in self.steps {
            md.push_str(&format!(
                "| {} | {} | {} | {:.2} | `{}` |\n",
                step.name,
                step.status,
                step.exit_code_label(),
                step.duration_secs(),
                step.command
            ));
        }

        md.push_str("\n## A-I Summary (Auto)\n\n");
        md.push_str("| Area | Status | Evidence | Risk | Concrete fix |\n");
        md.push_str("|---|---|---|---|---|\n");
        for area in &assessment.areas {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                md_cell(&area.label(), 90),
                area.status,
                md_cell(&area.evidence, CELL_LIMIT),
                area.risk,
                md_cell(&area.fix, CELL_LIMIT)
            ));
        }

        md.push_str("\n## Fix Backlog (Risk Sorted)\n");
        for (risk, heading, _) in BUCKETS {
            md.push_str(&format!("\n### {heading}\n\n"));
            let bucket = assessment.backlog.bucket(risk);
            if bucket.is_empty() {
                md.push_str("- No items.\n");
                continue;
            }
            md.push_str("| ID | Area | Issue | Evidence | Fix |\n");
            md.push_str("|---|---|---|---|---|\n");
            for entry in bucket {
                md.push_str(&format!(
                    "| {} | {}. {} | {} | {} | {} |\n",
                    entry.id,
                    entry.area.code,
                    md_cell(&entry.area.title, 80),
                    md_cell(&entry.issue(), 90),
                    md_cell(&entry.area.evidence, CELL_LIMIT),
                    md_cell(&entry.area.fix, CELL_LIMIT)
                ));
            }
        }

        // Recommendations is preceded by two blank lines.
        md.push_str("\n\n## Recommendations\n\n");
        for rec in &assessment.recommendations {
            md.push_str(&format!("- {rec}\n"));
        }

        md.push_str("\n## Details\n");
        for step in self.steps {
            md.push_str(&format!("\n### {}\n\n", step.name));
            md.push_str(&format!("- Status: {}\n", step.status));
            let note = if step.note.is_empty() { "-" } else { step.note.as_str() };
            md.push_str(&format!("- Note: {note}\n"));
            md.push_str(&format!("- Command: `{}`\n", step.command));
            md.push_str("\nstdout:\n```text\n");
            md.push_str(&trim_output(&step.stdout));
            md.push_str("\n```\n\nstderr:\n```text\n");
            md.push_str(&trim_output(&step.stderr));
            md.push_str("\n```\n");

            if step.kind() == Some(StepKind::IntegrationSuite) {
                if let Some(skipped) = detect_skips(&step.stdout, &step.stderr) {
                    md.push_str(&format!("\n- Skipped tests detected: {skipped}\n"));
                }
            }
        }

        md
    }
}

/// Write the report and return the SHA-256 hex digest of its bytes.
pub fn write_report(path: &Path, content: &str) -> Result<String> {
    let write_err = |source: std::io::Error| QaError::ReportWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content.as_bytes()).map_err(write_err)?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
