//! Exit gate for a QA run.

use qarun_core::{overall_status, Status, StepResult};
use serde::{Deserialize, Serialize};

/// Gate evaluation verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Combined status of all steps.
    pub overall: Status,

    /// Whether the gate passed. N-A passes: nothing verifiably failed.
    pub passed: bool,

    /// Failing steps with their notes (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

impl GateVerdict {
    /// Process exit code: 1 iff the overall status is FAIL.
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.passed)
    }
}

/// QA gate evaluation rules.
pub struct QaGate;

impl QaGate {
    pub fn evaluate(steps: &[StepResult]) -> GateVerdict {
        let overall = overall_status(steps);
        let violations: Vec<String> = steps
            .iter()
            .filter(|s| s.status == Status::Fail)
            .map(|s| format!("Step '{}' failed: {}", s.name, s.note))
            .collect();

        let passed = overall != Status::Fail;
        let message = match overall {
            Status::Pass => "All executed steps passed".to_string(),
            Status::NotApplicable => "No step produced a verdict".to_string(),
            Status::Fail => format!("Gate failed with {} violation(s)", violations.len()),
        };

        GateVerdict {
            overall,
            passed,
            violations,
            message,
        }
    }
}
