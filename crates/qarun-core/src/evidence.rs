//! Evidence extraction from raw step output.
//!
//! Reduces arbitrary stdout/stderr text to one clipped line that explains a
//! step's status. For failures the first output line matching any indicator
//! pattern wins; patterns are not ranked against each other, so the command's
//! own failure narrative is preserved.

use regex::{Regex, RegexBuilder};

use crate::domain::{QaError, Result, Status, StepResult};

/// Default clip width for evidence lines.
pub const EVIDENCE_LIMIT: usize = 180;

/// Indicator keywords scanned for in failing output.
pub const DEFAULT_INDICATORS: [&str; 9] = [
    "forbidden",
    "failed",
    "error",
    "exception",
    "skipped",
    "assert",
    "fatal",
    "warning",
    "timeout",
];

/// Evidence used when a step record is missing entirely.
pub const NO_STEP_EVIDENCE: &str = "No automated step executed.";

/// Evidence used when none of the combined steps has a record.
pub const NO_EVIDENCE: &str = "No automated evidence.";

const FAILED_WITHOUT_OUTPUT: &str = "Step failed without output.";

/// Collapse whitespace and clip to `limit` characters.
///
/// Empty input yields `-`. Clipped text ends with `...` and is exactly
/// `limit` characters long.
pub fn clip_text(text: &str, limit: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return "-".to_string();
    }
    if cleaned.chars().count() <= limit {
        return cleaned;
    }
    let head: String = cleaned.chars().take(limit.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Ordered, case-insensitive indicator patterns used to pick a failure line.
#[derive(Debug, Clone)]
pub struct EvidenceExtractor {
    patterns: Vec<Regex>,
    limit: usize,
}

impl Default for EvidenceExtractor {
    fn default() -> Self {
        let patterns = DEFAULT_INDICATORS
            .iter()
            .filter_map(|p| RegexBuilder::new(p).case_insensitive(true).build().ok())
            .collect();
        Self {
            patterns,
            limit: EVIDENCE_LIMIT,
        }
    }
}

impl EvidenceExtractor {
    /// Build an extractor from custom patterns (matched case-insensitively).
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(QaError::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            patterns,
            limit: EVIDENCE_LIMIT,
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn is_indicator(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(line))
    }

    /// One line of evidence for a single step.
    pub fn extract(&self, step: Option<&StepResult>) -> String {
        let Some(step) = step else {
            return NO_STEP_EVIDENCE.to_string();
        };

        match step.status {
            Status::Pass => format!("{}: PASS", step.name),
            Status::NotApplicable => clip_text(&step.note, self.limit),
            Status::Fail => self.failure_evidence(step),
        }
    }

    fn failure_evidence(&self, step: &StepResult) -> String {
        let merged = step.merged_output();
        let lines: Vec<&str> = merged
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            let note = if step.note.trim().is_empty() {
                FAILED_WITHOUT_OUTPUT
            } else {
                step.note.as_str()
            };
            return clip_text(note, self.limit);
        };

        let line = lines
            .iter()
            .find(|line| self.is_indicator(line))
            .unwrap_or(first);
        clip_text(&format!("{}: {}", step.name, line), self.limit)
    }

    /// Evidence for a combination of steps: first FAIL, else first PASS,
    /// else first N-A.
    pub fn combine(&self, steps: &[Option<&StepResult>]) -> String {
        [Status::Fail, Status::Pass, Status::NotApplicable]
            .into_iter()
            .find_map(|wanted| {
                steps
                    .iter()
                    .flatten()
                    .copied()
                    .find(|s| s.status == wanted)
            })
            .map(|step| self.extract(Some(step)))
            .unwrap_or_else(|| NO_EVIDENCE.to_string())
    }
}
