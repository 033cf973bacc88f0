//! Skipped-test detection and PASS → N-A demotion.
//!
//! A test runner that exits zero while reporting skipped tests has not
//! verified anything for those tests. The integration step is demoted once,
//! after execution and before area mapping.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{Status, StepResult};

static SKIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+skipped").expect("skip regex is valid"));

/// Sum every `<count> skipped` marker in stdout and stderr.
///
/// Counts from both streams are added without deduplication. Returns `None`
/// when no marker is present. Counts too large for `u64` saturate.
pub fn detect_skips(stdout: &str, stderr: &str) -> Option<u64> {
    let merged = format!("{stdout}\n{stderr}");

    let mut found = false;
    let mut total = 0u64;
    for caps in SKIP_RE.captures_iter(&merged) {
        found = true;
        // The group is all digits, so a parse error can only be overflow.
        let count = caps
            .get(1)
            .map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(u64::MAX));
        total = total.saturating_add(count);
    }
    found.then_some(total)
}

/// Demote a passing step that reported skipped tests to N-A.
///
/// Any other step is returned unchanged. The exit code and captured output
/// are kept so the report still shows what the runner printed.
pub fn demote_skipped(step: StepResult) -> StepResult {
    if step.status != Status::Pass {
        return step;
    }
    match detect_skips(&step.stdout, &step.stderr) {
        Some(skipped) if skipped > 0 => StepResult {
            status: Status::NotApplicable,
            note: format!("Integration suite contains skipped tests ({skipped}); treated as N-A."),
            ..step
        },
        _ => step,
    }
}
