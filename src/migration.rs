//! Run orchestration: validate, enumerate, process, report.

use crate::config::{ConfigError, MigrationConfig};
use crate::processor::{process_file, FileOutcome, ProcessError, ProcessOptions};
use crate::report::MigrationReport;
use crate::rules::{RuleError, RuleTable};
use crate::scan::{enumerate, ScanError, ScanOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a run before any file is touched.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("invalid rule table: {0}")]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// A validated migration, ready to run against any number of roots.
#[derive(Debug, Clone)]
pub struct Migration {
    rules: RuleTable,
    scan: ScanOptions,
    options: ProcessOptions,
}

impl Migration {
    /// Built-in rules and default scan options.
    pub fn new(options: ProcessOptions) -> Self {
        Self {
            rules: RuleTable::builtin().clone(),
            scan: ScanOptions::default(),
            options,
        }
    }

    /// Built-in rules followed by the config's own, plus its scan options.
    ///
    /// `options.backup` is OR-ed with the config's `backup` flag.
    pub fn from_config(
        config: &MigrationConfig,
        mut options: ProcessOptions,
    ) -> Result<Self, MigrationError> {
        let mut rules = RuleTable::builtin().clone();
        rules.extend_from_specs(&config.rule_specs())?;
        options.backup |= config.backup;
        Ok(Self {
            rules,
            scan: config.scan_options(),
            options,
        })
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn scan_options(&self) -> &ScanOptions {
        &self.scan
    }

    pub fn options(&self) -> ProcessOptions {
        self.options
    }

    /// Candidate files under `root`.
    pub fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, MigrationError> {
        Ok(enumerate(root, &self.scan)?)
    }

    /// Scan `root` and migrate everything found.
    pub fn run(&self, root: &Path) -> Result<MigrationReport, MigrationError> {
        let mut report = MigrationReport::new();
        self.run_with(root, &mut report, |_, _| {})?;
        Ok(report)
    }

    /// Like [`Migration::run`], calling `on_file` after each file.
    ///
    /// `report` is reset first, and again if the scan fails, so it never
    /// carries numbers from an earlier or aborted run.
    pub fn run_with<F>(
        &self,
        root: &Path,
        report: &mut MigrationReport,
        on_file: F,
    ) -> Result<(), MigrationError>
    where
        F: FnMut(&Path, &Result<FileOutcome, ProcessError>),
    {
        report.reset();
        let files = match self.enumerate(root) {
            Ok(files) => files,
            Err(e) => {
                report.reset();
                return Err(e);
            }
        };
        tracing::info!(
            "found {} file(s) that may need migrating under {}",
            files.len(),
            root.display()
        );
        self.process_files(&files, report, on_file);
        Ok(())
    }

    /// Migrate an explicit list of files, one at a time, in order.
    ///
    /// A failing file is recorded and the loop moves on.
    pub fn process_files<P, F>(&self, files: &[P], report: &mut MigrationReport, mut on_file: F)
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &Result<FileOutcome, ProcessError>),
    {
        report.files_found += files.len();
        for path in files {
            let path = path.as_ref();
            let result = process_file(path, &self.rules, self.options);
            report.record(&result);
            on_file(path, &result);
        }
        tracing::info!(
            "processed {} file(s), {} changed, {} failed",
            report.files_processed,
            report.files_changed,
            report.errors.len()
        );
    }
}

/// Migrate `files` with the built-in rules.
pub fn migrate_files<P: AsRef<Path>>(files: &[P], backup: bool) -> MigrationReport {
    let migration = Migration::new(ProcessOptions {
        backup,
        dry_run: false,
    });
    let mut report = MigrationReport::new();
    migration.process_files(files, &mut report, |_, _| {});
    report
}
