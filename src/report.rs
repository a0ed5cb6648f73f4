//! Run-level accumulation of per-file results.

use crate::processor::{FileOutcome, ProcessError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A file that could not be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Totals for one migration run.
///
/// `files_processed` counts every file that went through the pipeline
/// without error, whether or not it changed. `files_changed` counts only
/// files whose content was (or, in a dry run, would be) rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_changed: usize,
    pub changed_paths: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's result into the totals.
    pub fn record(&mut self, result: &Result<FileOutcome, ProcessError>) {
        match result {
            Ok(outcome) => {
                self.files_processed += 1;
                if outcome.is_rewritten() {
                    self.files_changed += 1;
                    self.changed_paths.push(outcome.path().to_path_buf());
                }
            }
            Err(e) => {
                tracing::debug!("{}: {}", e.path().display(), e);
                self.errors.push(FileError {
                    path: e.path().to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Files that were attempted, successfully or not.
    pub fn files_attempted(&self) -> usize {
        self.files_processed + self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Clear every counter and list so the report can back a new run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn unchanged(path: &str) -> Result<FileOutcome, ProcessError> {
        Ok(FileOutcome::Unchanged {
            path: PathBuf::from(path),
            backup: None,
        })
    }

    fn rewritten(path: &str) -> Result<FileOutcome, ProcessError> {
        Ok(FileOutcome::Rewritten {
            path: PathBuf::from(path),
            applied: vec!["namespace-import".to_string()],
            original: "a".to_string(),
            content: "b".to_string(),
            backup: None,
        })
    }

    #[test]
    fn test_processed_and_changed_are_separate() {
        let mut report = MigrationReport::new();
        report.record(&unchanged("A.cs"));
        report.record(&rewritten("B.cs"));

        assert_eq!(report.files_processed, 2);
        assert_eq!(report.files_changed, 1);
        assert_eq!(report.changed_paths, vec![PathBuf::from("B.cs")]);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_errors_keep_order_and_path() {
        let mut report = MigrationReport::new();
        for name in ["X.cs", "Y.cs"] {
            let err = Err(ProcessError::Read {
                path: PathBuf::from(name),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "locked"),
            });
            report.record(&err);
        }

        assert_eq!(report.files_processed, 0);
        assert_eq!(report.files_attempted(), 2);
        assert_eq!(report.errors[0].path, PathBuf::from("X.cs"));
        assert_eq!(report.errors[1].path, PathBuf::from("Y.cs"));
        assert!(report.errors[0].message.contains("locked"));
    }

    #[test]
    fn test_backup_failure_is_filed_under_the_script() {
        let mut report = MigrationReport::new();
        let err = Err(ProcessError::Backup {
            path: PathBuf::from("Player.cs"),
            backup: PathBuf::from("Player.cs.bak"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        });
        report.record(&err);

        assert_eq!(report.errors[0].path, PathBuf::from("Player.cs"));
        assert!(report.errors[0].message.contains("Player.cs.bak"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut report = MigrationReport::new();
        report.files_found = 3;
        report.record(&rewritten("B.cs"));
        report.reset();
        assert_eq!(report, MigrationReport::default());
    }

    #[test]
    fn test_serializes_to_json() {
        let mut report = MigrationReport::new();
        report.files_found = 1;
        report.record(&rewritten("B.cs"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files_changed"], 1);
        assert_eq!(json["changed_paths"][0], "B.cs");
    }
}
