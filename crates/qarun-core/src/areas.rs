//! Step → area mapping for the fixed A–I quality taxonomy.
//!
//! The taxonomy is a static table. Each row names where its status comes
//! from, which risk it carries when it fails, and the remediation sentence
//! shown in the report. Risk and fix depend only on `(code, status)`.

use crate::combine::combine_statuses;
use crate::domain::{find_step, AreaCode, AreaResult, Risk, Status, StepKind, StepResult};
use crate::evidence::EvidenceExtractor;

/// Fix text for passing areas.
pub const FIX_NONE: &str = "No action required.";

/// Fix text for areas without a verdict.
pub const FIX_MANUAL: &str = "Manual verification required in QA cycle.";

/// Where an area's status comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaSource {
    /// One step's status, verbatim (N-A when the step is absent).
    Step(StepKind),

    /// [`combine_statuses`] over the listed steps, in order.
    Combined(&'static [StepKind]),

    /// No automated coverage; always N-A with fixed evidence.
    Uncovered(&'static str),
}

/// Static definition of one area row.
#[derive(Debug, Clone, Copy)]
pub struct AreaSpec {
    pub code: AreaCode,
    pub title: &'static str,
    pub source: AreaSource,
    /// Risk when the area fails.
    pub fail_risk: Risk,
    /// Remediation sentence when the area fails.
    pub fail_fix: &'static str,
}

pub const AREA_TABLE: [AreaSpec; 9] = [
    AreaSpec {
        code: AreaCode::A,
        title: "Install/Uninstall/Update",
        source: AreaSource::Step(StepKind::IntegrationSuite),
        fail_risk: Risk::High,
        fail_fix: "Validate install/uninstall/reinstall/update path on stage and confirm module registration + savedata behavior.",
    },
    AreaSpec {
        code: AreaCode::B,
        title: "Code quality (localization, magic numbers, debug)",
        source: AreaSource::Combined(&[StepKind::StaticSuite, StepKind::StaticShellAudit]),
        fail_risk: Risk::Med,
        fail_fix: "Replace debug leftovers, localize UI strings, and move magic numbers to named constants/config.",
    },
    AreaSpec {
        code: AreaCode::C,
        title: "Core E2E scenarios",
        source: AreaSource::Step(StepKind::IntegrationSuite),
        fail_risk: Risk::Med,
        fail_fix: "Fix failing business flow and rerun top 5-10 E2E scenarios with evidence.",
    },
    AreaSpec {
        code: AreaCode::D,
        title: "Performance and scaling",
        source: AreaSource::Uncovered(
            "No automated benchmark in qarun; requires manual/perf suite execution.",
        ),
        fail_risk: Risk::Low,
        fail_fix: "Run performance profiling on large dataset and optimize bottlenecks (SQL, cache, batch size).",
    },
    AreaSpec {
        code: AreaCode::E,
        title: "UX on large datasets",
        source: AreaSource::Uncovered(
            "No automated UI load checks in qarun; requires manual QA validation.",
        ),
        fail_risk: Risk::Low,
        fail_fix: "Improve list/filter/pagination UX and add progress feedback for long actions.",
    },
    AreaSpec {
        code: AreaCode::F,
        title: "Security (rights, CSRF, path traversal)",
        source: AreaSource::Step(StepKind::StaticSuite),
        fail_risk: Risk::High,
        fail_fix: "Fix rights checks, CSRF/session checks, and unsafe path handling; rerun static and integration tests.",
    },
    AreaSpec {
        code: AreaCode::G,
        title: "Reliability (locks, resume, parallelism)",
        source: AreaSource::Step(StepKind::IntegrationSuite),
        fail_risk: Risk::High,
        fail_fix: "Add/verify locks, idempotency, and retry-safe behavior for parallel operations.",
    },
    AreaSpec {
        code: AreaCode::H,
        title: "Diagnostics and logs",
        source: AreaSource::Combined(&[StepKind::IntegrationSuite, StepKind::StaticShellAudit]),
        fail_risk: Risk::Med,
        fail_fix: "Add actionable diagnostics and explicit error handling; remove silent failures.",
    },
    AreaSpec {
        code: AreaCode::I,
        title: "Compatibility",
        source: AreaSource::Step(StepKind::IntegrationSuite),
        fail_risk: Risk::Med,
        fail_fix: "Re-check behavior on PHP 8+/MySQL 8+ and target platform matrix (Site/Box/Cloud REST).",
    },
];

/// Table row for a code.
pub fn area_spec(code: AreaCode) -> &'static AreaSpec {
    // AREA_TABLE is indexed in AreaCode order.
    &AREA_TABLE[code as usize]
}

/// Risk for an area given its status.
pub fn risk_for_area(code: AreaCode, status: Status) -> Risk {
    if status.is_fail() {
        area_spec(code).fail_risk
    } else {
        Risk::Low
    }
}

/// Remediation text for an area given its status.
pub fn fix_for_area(code: AreaCode, status: Status) -> &'static str {
    match status {
        Status::Pass => FIX_NONE,
        Status::NotApplicable => FIX_MANUAL,
        Status::Fail => area_spec(code).fail_fix,
    }
}

/// Derive all nine area rows, A→I, with the default evidence extractor.
pub fn derive_area_results(steps: &[StepResult]) -> Vec<AreaResult> {
    derive_area_results_with(steps, &EvidenceExtractor::default())
}

/// Derive all nine area rows, A→I.
pub fn derive_area_results_with(
    steps: &[StepResult],
    extractor: &EvidenceExtractor,
) -> Vec<AreaResult> {
    AREA_TABLE
        .iter()
        .map(|spec| {
            let (status, evidence) = match spec.source {
                AreaSource::Step(kind) => {
                    let step = find_step(steps, kind);
                    let status = step.map_or(Status::NotApplicable, |s| s.status);
                    (status, extractor.extract(step))
                }
                AreaSource::Combined(kinds) => {
                    let sources: Vec<Option<&StepResult>> =
                        kinds.iter().map(|kind| find_step(steps, *kind)).collect();
                    (combine_statuses(&sources), extractor.combine(&sources))
                }
                AreaSource::Uncovered(evidence) => {
                    (Status::NotApplicable, evidence.to_string())
                }
            };

            AreaResult {
                code: spec.code,
                title: spec.title.to_string(),
                status,
                evidence,
                risk: risk_for_area(spec.code, status),
                fix: fix_for_area(spec.code, status).to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(kind: StepKind, status: Status) -> StepResult {
        let mut s = StepResult::not_executed(kind.name(), "note");
        s.status = status;
        s
    }

    #[test]
    fn test_table_is_in_code_order() {
        for (idx, spec) in AREA_TABLE.iter().enumerate() {
            assert_eq!(spec.code, AreaCode::ALL[idx]);
            assert_eq!(area_spec(spec.code).code, spec.code);
        }
    }

    #[test]
    fn test_nine_areas_without_steps() {
        let areas = derive_area_results(&[]);
        assert_eq!(areas.len(), 9);
        let codes: Vec<AreaCode> = areas.iter().map(|a| a.code).collect();
        assert_eq!(codes, AreaCode::ALL.to_vec());
        assert!(areas.iter().all(|a| a.status == Status::NotApplicable));
        assert!(areas.iter().all(|a| a.risk == Risk::Low));
        assert!(areas.iter().all(|a| a.fix == FIX_MANUAL));
        assert_eq!(areas[0].evidence, "No automated step executed.");
        assert_eq!(areas[1].evidence, "No automated evidence.");
    }

    #[test]
    fn test_risk_rules() {
        for code in [AreaCode::A, AreaCode::F, AreaCode::G] {
            assert_eq!(risk_for_area(code, Status::Fail), Risk::High);
        }
        for code in [AreaCode::B, AreaCode::C, AreaCode::H, AreaCode::I] {
            assert_eq!(risk_for_area(code, Status::Fail), Risk::Med);
        }
        for code in [AreaCode::D, AreaCode::E] {
            assert_eq!(risk_for_area(code, Status::Fail), Risk::Low);
        }
        for code in AreaCode::ALL {
            assert_eq!(risk_for_area(code, Status::Pass), Risk::Low);
            assert_eq!(risk_for_area(code, Status::NotApplicable), Risk::Low);
        }
    }

    #[test]
    fn test_fix_rules() {
        assert_eq!(fix_for_area(AreaCode::A, Status::Pass), FIX_NONE);
        assert_eq!(fix_for_area(AreaCode::A, Status::NotApplicable), FIX_MANUAL);
        assert!(fix_for_area(AreaCode::F, Status::Fail).contains("CSRF"));
    }

    #[test]
    fn test_performance_and_ux_always_na() {
        let steps: Vec<StepResult> = StepKind::ALL
            .iter()
            .map(|k| step(*k, Status::Fail))
            .collect();
        let areas = derive_area_results(&steps);
        assert_eq!(areas[3].status, Status::NotApplicable);
        assert_eq!(areas[4].status, Status::NotApplicable);
        assert!(areas[3].evidence.contains("benchmark"));
    }

    #[test]
    fn test_code_quality_combines_static_steps() {
        let steps = vec![
            step(StepKind::StaticShellAudit, Status::Fail),
            step(StepKind::StaticSuite, Status::Pass),
        ];
        let areas = derive_area_results(&steps);
        let b = &areas[1];
        assert_eq!(b.status, Status::Fail);
        assert_eq!(b.risk, Risk::Med);
        // F follows the static suite alone.
        assert_eq!(areas[5].status, Status::Pass);
        assert_eq!(areas[5].evidence, "PHPUnit Static Suite: PASS");
    }

    #[test]
    fn test_label() {
        let areas = derive_area_results(&[]);
        assert_eq!(areas[8].label(), "I. Compatibility");
    }
}
