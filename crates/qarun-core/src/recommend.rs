//! Remediation hints derived from why steps are N-A or FAIL.

use std::path::Path;

use crate::domain::{find_step, Status, StepKind, StepResult};

/// Note fragment written when the PHPUnit executable is missing.
pub const NOTE_PHPUNIT_MISSING: &str = "phpunit executable not found";

/// Note fragment written when `phpunit.xml.dist` is missing.
pub const NOTE_CONFIG_MISSING: &str = "phpunit.xml.dist not found";

/// The only recommendation when nothing else applies.
pub const NO_BLOCKING_FINDINGS: &str =
    "No blocking findings. Keep this report with release artifacts.";

/// Build recommendations, most actionable first.
///
/// Always returns at least one entry.
pub fn build_recommendations(
    steps: &[StepResult],
    project_root: &Path,
    module_id: &str,
) -> Vec<String> {
    let mut recs = Vec::new();

    if let Some(shell) = find_step(steps, StepKind::StaticShellAudit) {
        if shell.status == Status::NotApplicable {
            recs.push(format!(
                "Optional static shell audit was not found. Generate QA gate files: \
                 `python3 skills/bitrix/scripts/scaffold_qa_gate.py --out ./qa --module-id {module_id}`."
            ));
        }
    }

    if let Some(suite) = find_step(steps, StepKind::StaticSuite) {
        match suite.status {
            Status::NotApplicable if suite.note.contains(NOTE_PHPUNIT_MISSING) => {
                recs.push(
                    "Install dev dependencies before rerun: `composer install` in project root."
                        .to_string(),
                );
            }
            Status::NotApplicable if suite.note.contains(NOTE_CONFIG_MISSING) => {
                recs.push(format!(
                    "Static PHPUnit suite is not available. Scaffold root tests: \
                     `python3 skills/bitrix/scripts/scaffold_root_tests.py --project-root \"{}\" --module-id \"{module_id}\"`.",
                    project_root.display()
                ));
            }
            Status::NotApplicable => {
                recs.push(
                    "Static PHPUnit suite was not executed. Check prerequisites and rerun."
                        .to_string(),
                );
            }
            Status::Fail => {
                recs.push(
                    "Fix static audit findings and rerun \
                     `vendor/bin/phpunit -c phpunit.xml.dist --testsuite static`."
                        .to_string(),
                );
            }
            Status::Pass => {}
        }
    }

    if let Some(integration) = find_step(steps, StepKind::IntegrationSuite) {
        match integration.status {
            Status::NotApplicable => recs.push(
                "Integration suite was skipped. Set `BITRIX_ROOT` and ensure module + \
                 socialservices are installed."
                    .to_string(),
            ),
            Status::Fail => recs.push(
                "Fix integration/runtime issues and rerun \
                 `vendor/bin/phpunit -c phpunit.xml.dist --testsuite integration`."
                    .to_string(),
            ),
            Status::Pass => {}
        }
    }

    if recs.is_empty() {
        recs.push(NO_BLOCKING_FINDINGS.to_string());
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_status(kind: StepKind, status: Status) -> StepResult {
        let mut s = StepResult::not_executed(kind.name(), "");
        s.status = status;
        s
    }

    #[test]
    fn test_all_pass_yields_single_fallback() {
        let steps: Vec<StepResult> = StepKind::ALL
            .iter()
            .map(|k| with_status(*k, Status::Pass))
            .collect();
        let recs = build_recommendations(&steps, Path::new("/srv/site"), "vendor.module");
        assert_eq!(recs, vec![NO_BLOCKING_FINDINGS.to_string()]);
    }

    #[test]
    fn test_no_steps_yields_single_fallback() {
        let recs = build_recommendations(&[], Path::new("/srv/site"), "vendor.module");
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_missing_shell_script_recommends_scaffold() {
        let steps = vec![StepResult::not_executed(
            StepKind::StaticShellAudit.name(),
            "No static shell script found (qa-static-audit.sh).",
        )];
        let recs = build_recommendations(&steps, Path::new("/srv/site"), "vendor.module");
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("scaffold_qa_gate.py"));
        assert!(recs[0].contains("--module-id vendor.module"));
    }

    #[test]
    fn test_static_suite_na_reasons_are_distinct() {
        let root = Path::new("/srv/site");
        let missing_bin = vec![StepResult::not_executed(
            StepKind::StaticSuite.name(),
            "phpunit executable not found. Run composer install or set --phpunit-bin.",
        )];
        let missing_cfg = vec![StepResult::not_executed(
            StepKind::StaticSuite.name(),
            "phpunit.xml.dist not found in project root.",
        )];
        let other = vec![StepResult::not_executed(
            StepKind::StaticSuite.name(),
            "something else",
        )];

        let a = build_recommendations(&missing_bin, root, "m");
        let b = build_recommendations(&missing_cfg, root, "m");
        let c = build_recommendations(&other, root, "m");
        assert!(a[0].contains("composer install"));
        assert!(b[0].contains("scaffold_root_tests.py"));
        assert!(b[0].contains("--project-root \"/srv/site\""));
        assert!(c[0].contains("Check prerequisites"));
    }

    #[test]
    fn test_failures_recommend_canonical_commands() {
        let steps = vec![
            with_status(StepKind::StaticSuite, Status::Fail),
            with_status(StepKind::IntegrationSuite, Status::Fail),
        ];
        let recs = build_recommendations(&steps, Path::new("."), "m");
        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("--testsuite static"));
        assert!(recs[1].contains("--testsuite integration"));
    }

    #[test]
    fn test_integration_na_recommends_root() {
        let steps = vec![StepResult::not_executed(
            StepKind::IntegrationSuite.name(),
            "Skipped by --skip-integration.",
        )];
        let recs = build_recommendations(&steps, Path::new("."), "m");
        assert!(recs[0].contains("BITRIX_ROOT"));
    }
}
