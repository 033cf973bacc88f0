//! Step records produced by the command runner.

use serde::{Deserialize, Serialize};

use super::status::Status;

/// Placeholder command for steps that were never executed.
pub const NOT_EXECUTED_COMMAND: &str = "(not executed)";

/// The fixed set of verification steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// `bash qa-static-audit.sh`
    StaticShellAudit,

    /// `phpunit -c phpunit.xml.dist --testsuite static`
    StaticSuite,

    /// `phpunit -c phpunit.xml.dist --testsuite integration`
    IntegrationSuite,
}

impl StepKind {
    /// Declared execution order.
    pub const ALL: [StepKind; 3] = [
        StepKind::StaticShellAudit,
        StepKind::StaticSuite,
        StepKind::IntegrationSuite,
    ];

    /// Display name used in step records and in the report.
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::StaticShellAudit => "Static Shell Audit",
            StepKind::StaticSuite => "PHPUnit Static Suite",
            StepKind::IntegrationSuite => "PHPUnit Integration Suite",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Static steps are expected to run before integration steps.
    pub fn is_static(&self) -> bool {
        matches!(self, StepKind::StaticShellAudit | StepKind::StaticSuite)
    }
}

/// One executed (or skipped) verification step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Step name (see [`StepKind::name`]).
    pub name: String,

    pub status: Status,

    /// Shell-quoted command line, or [`NOT_EXECUTED_COMMAND`].
    pub command: String,

    /// Absent when the step was not executed or timed out.
    pub exit_code: Option<i32>,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// Short explanation: why skipped, why failed, or a success summary.
    pub note: String,

    pub stdout: String,

    pub stderr: String,
}

impl StepResult {
    /// Record a step that was skipped before execution.
    pub fn not_executed(name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::NotApplicable,
            command: NOT_EXECUTED_COMMAND.to_string(),
            exit_code: None,
            duration_ms: 0,
            note: note.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// The well-known step this record belongs to, if any.
    pub fn kind(&self) -> Option<StepKind> {
        StepKind::from_name(&self.name)
    }

    /// stdout and stderr joined by a newline.
    pub fn merged_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Exit code for tables and console output (`-` when absent).
    pub fn exit_code_label(&self) -> String {
        self.exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Find the record for a well-known step.
pub fn find_step(steps: &[StepResult], kind: StepKind) -> Option<&StepResult> {
    steps.iter().find(|step| step.name == kind.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_kind_names_round_trip() {
        for kind in StepKind::ALL {
            assert_eq!(StepKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StepKind::from_name("cargo_test"), None);
    }

    #[test]
    fn test_static_classification() {
        assert!(StepKind::StaticShellAudit.is_static());
        assert!(StepKind::StaticSuite.is_static());
        assert!(!StepKind::IntegrationSuite.is_static());
    }

    #[test]
    fn test_not_executed_has_no_exit_code_or_output() {
        let step = StepResult::not_executed("PHPUnit Static Suite", "phpunit.xml.dist not found");
        assert_eq!(step.status, Status::NotApplicable);
        assert_eq!(step.command, NOT_EXECUTED_COMMAND);
        assert!(step.exit_code.is_none());
        assert!(step.stdout.is_empty());
        assert!(step.stderr.is_empty());
        assert_eq!(step.duration_ms, 0);
        assert_eq!(step.exit_code_label(), "-");
        assert_eq!(step.kind(), Some(StepKind::StaticSuite));
    }

    #[test]
    fn test_find_step() {
        let steps = vec![
            StepResult::not_executed(StepKind::StaticShellAudit.name(), "skipped"),
            StepResult::not_executed(StepKind::IntegrationSuite.name(), "no root"),
        ];
        assert!(find_step(&steps, StepKind::IntegrationSuite).is_some());
        assert!(find_step(&steps, StepKind::StaticSuite).is_none());
    }

    #[test]
    fn test_duration_secs() {
        let mut step = StepResult::not_executed("x", "y");
        step.duration_ms = 1250;
        assert!((step.duration_secs() - 1.25).abs() < f64::EPSILON);
    }
}
