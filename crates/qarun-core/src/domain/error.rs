//! Error taxonomy for qarun library operations.
//!
//! Step-level failures are never errors: they become FAIL or N-A step
//! records. These variants cover the few things that can stop a run.

use std::path::PathBuf;

/// qarun library errors.
#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("project root does not exist: {}", .0.display())]
    InvalidProjectRoot(PathBuf),

    #[error("failed to write report {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid evidence pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for qarun library operations.
pub type Result<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_project_root_message() {
        let err = QaError::InvalidProjectRoot(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "project root does not exist: /nope");
    }

    #[test]
    fn test_report_write_keeps_source() {
        let err = QaError::ReportWrite {
            path: PathBuf::from("/ro/report.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/ro/report.md"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
