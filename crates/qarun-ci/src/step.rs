//! Step planning: decide for each fixed step whether it runs and how.

use qarun_core::{StepKind, StepResult};
use std::path::PathBuf;

use crate::config::QaRunConfig;
use crate::discovery::{discover_phpunit, discover_static_script, phpunit_config, PHPUNIT_CONFIG};
use crate::runner::CommandSpec;

pub const NOTE_SKIP_STATIC_FLAG: &str = "Skipped by --skip-static-script.";
pub const NOTE_NO_STATIC_SCRIPT: &str = "No static shell script found (qa-static-audit.sh).";
pub const NOTE_NO_PHPUNIT_CONFIG: &str = "phpunit.xml.dist not found in project root.";
pub const NOTE_NO_PHPUNIT: &str =
    "phpunit executable not found. Run composer install or set --phpunit-bin.";
pub const NOTE_SKIP_INTEGRATION_FLAG: &str = "Skipped by --skip-integration.";
pub const NOTE_NO_BITRIX_ROOT: &str =
    "BITRIX_ROOT is not set (use --bitrix-root or environment variable).";

/// Success note recorded when a step exits zero.
pub fn success_note(kind: StepKind) -> &'static str {
    match kind {
        StepKind::StaticShellAudit => "Static shell audit completed.",
        StepKind::StaticSuite => "Static PHPUnit suite completed.",
        StepKind::IntegrationSuite => "Integration PHPUnit suite completed.",
    }
}

/// PHPUnit test suite name for a step.
pub fn testsuite(kind: StepKind) -> Option<&'static str> {
    match kind {
        StepKind::StaticShellAudit => None,
        StepKind::StaticSuite => Some("static"),
        StepKind::IntegrationSuite => Some("integration"),
    }
}

/// What was found on disk and in the environment before the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisites {
    pub static_script: Option<PathBuf>,
    pub phpunit: Option<PathBuf>,
    pub phpunit_config: Option<PathBuf>,
}

impl Prerequisites {
    pub fn discover(config: &QaRunConfig) -> Self {
        let root = &config.project_root;
        Self {
            static_script: discover_static_script(root, config.static_script.as_deref()),
            phpunit: discover_phpunit(root, config.phpunit_bin.as_deref()),
            phpunit_config: phpunit_config(root),
        }
    }
}

/// Decision for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPlan {
    Run {
        kind: StepKind,
        command: CommandSpec,
    },
    Skip {
        kind: StepKind,
        note: &'static str,
    },
}

impl StepPlan {
    pub fn kind(&self) -> StepKind {
        match self {
            StepPlan::Run { kind, .. } | StepPlan::Skip { kind, .. } => *kind,
        }
    }

    /// Skipped steps become N-A records immediately.
    pub fn skipped_result(&self) -> Option<StepResult> {
        match self {
            StepPlan::Skip { kind, note } => Some(StepResult::not_executed(kind.name(), *note)),
            StepPlan::Run { .. } => None,
        }
    }

    /// Plan one step. Prerequisites are checked in a fixed order so the
    /// recorded reason is the first one that applies.
    pub fn for_kind(kind: StepKind, config: &QaRunConfig, prereqs: &Prerequisites) -> Self {
        let skip = |note| StepPlan::Skip { kind, note };
        let root = config.project_root.clone();

        match kind {
            StepKind::StaticShellAudit => {
                if config.skip_static_script {
                    return skip(NOTE_SKIP_STATIC_FLAG);
                }
                let Some(script) = &prereqs.static_script else {
                    return skip(NOTE_NO_STATIC_SCRIPT);
                };
                let argv = vec!["bash".to_string(), script.display().to_string()];
                StepPlan::Run {
                    kind,
                    command: CommandSpec::new(argv, root, config.timeout_secs),
                }
            }
            StepKind::StaticSuite | StepKind::IntegrationSuite => {
                let integration = kind == StepKind::IntegrationSuite;
                if integration && config.skip_integration {
                    return skip(NOTE_SKIP_INTEGRATION_FLAG);
                }
                if prereqs.phpunit_config.is_none() {
                    return skip(NOTE_NO_PHPUNIT_CONFIG);
                }
                let Some(phpunit) = &prereqs.phpunit else {
                    return skip(NOTE_NO_PHPUNIT);
                };
                let argv = vec![
                    phpunit.display().to_string(),
                    "-c".to_string(),
                    PHPUNIT_CONFIG.to_string(),
                    "--testsuite".to_string(),
                    testsuite(kind).unwrap_or_default().to_string(),
                ];
                let command = CommandSpec::new(argv, root, config.timeout_secs);
                if !integration {
                    return StepPlan::Run { kind, command };
                }
                let Some(bitrix_root) = &config.bitrix_root else {
                    return skip(NOTE_NO_BITRIX_ROOT);
                };
                StepPlan::Run {
                    kind,
                    command: command
                        .with_env("BITRIX_ROOT", bitrix_root.clone())
                        .with_env("BITRIX_MODULE_ID", config.module_id.clone()),
                }
            }
        }
    }
}

/// Plan all steps in declared order.
pub fn plan_steps(config: &QaRunConfig, prereqs: &Prerequisites) -> Vec<StepPlan> {
    StepKind::ALL
        .into_iter()
        .map(|kind| StepPlan::for_kind(kind, config, prereqs))
        .collect()
}
