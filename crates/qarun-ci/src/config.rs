//! Run configuration.

use chrono::NaiveDateTime;
use qarun_core::QaError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default per-step timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1200;

/// Default report location, relative to the project root.
pub const DEFAULT_REPORT_DIR: &str = "tests";

/// Immutable settings for one QA run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaRunConfig {
    /// Project root; all commands run here.
    pub project_root: PathBuf,

    /// Module identifier passed to the integration suite.
    pub module_id: String,

    /// Bitrix installation root; integration is N-A without it.
    pub bitrix_root: Option<String>,

    /// Explicit report path, relative to the working directory; defaults to a
    /// timestamped file under `<project_root>/tests/`.
    pub report: Option<PathBuf>,

    /// Explicit PHPUnit executable.
    pub phpunit_bin: Option<PathBuf>,

    /// Explicit static shell audit script.
    pub static_script: Option<PathBuf>,

    pub skip_static_script: bool,
    pub skip_integration: bool,

    /// Per-step timeout (0 = no timeout).
    pub timeout_secs: u64,
}

impl QaRunConfig {
    pub fn new(project_root: PathBuf, module_id: impl Into<String>) -> Self {
        Self {
            project_root,
            module_id: module_id.into(),
            bitrix_root: None,
            report: None,
            phpunit_bin: None,
            static_script: None,
            skip_static_script: false,
            skip_integration: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Canonicalize the project root. Fails if it is not an existing directory.
    ///
    /// An empty `BITRIX_ROOT` counts as unset.
    pub fn validate(mut self) -> qarun_core::Result<Self> {
        let root = self
            .project_root
            .canonicalize()
            .map_err(|_| QaError::InvalidProjectRoot(self.project_root.clone()))?;
        if !root.is_dir() {
            return Err(QaError::InvalidProjectRoot(self.project_root));
        }
        self.project_root = root;
        self.bitrix_root = self.bitrix_root.filter(|r| !r.trim().is_empty());
        Ok(self)
    }

    /// Where the report goes for a run started at `now`.
    pub fn resolve_report_path(&self, now: NaiveDateTime) -> PathBuf {
        match &self.report {
            Some(explicit) => absolute(explicit),
            None => self
                .project_root
                .join(DEFAULT_REPORT_DIR)
                .join(format!("qa-run-report-{}.md", now.format("%Y%m%d-%H%M%S"))),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
