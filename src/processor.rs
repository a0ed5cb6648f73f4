//! Per-file read, rewrite, backup and write-back.

use crate::rewrite::{rewrite, Rewrite};
use crate::rules::RuleTable;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the full file name for backups (`Player.cs.bak`).
pub const BACKUP_SUFFIX: &str = ".bak";

const UTF8_BOM: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    /// The script being migrated when the error happened.
    pub fn path(&self) -> &Path {
        match self {
            ProcessError::Read { path, .. }
            | ProcessError::Decode { path, .. }
            | ProcessError::Backup { path, .. }
            | ProcessError::Write { path, .. } => path,
        }
    }
}

/// How each file is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Copy the original to `<path>.bak` unless that file already exists.
    pub backup: bool,
    /// Compute the rewrite but touch nothing on disk.
    pub dry_run: bool,
}

/// A single file moving through the pipeline.
#[derive(Debug)]
pub struct MigrationJob {
    pub path: PathBuf,
    raw: Vec<u8>,
    original: String,
}

impl MigrationJob {
    /// Load `path`. A leading UTF-8 byte order mark is not part of the text.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ProcessError> {
        let path = path.into();
        let raw = fs::read(&path).map_err(|source| ProcessError::Read {
            path: path.clone(),
            source,
        })?;
        let mut original =
            String::from_utf8(raw.clone()).map_err(|source| ProcessError::Decode {
                path: path.clone(),
                source,
            })?;
        if original.starts_with(UTF8_BOM) {
            original.drain(..UTF8_BOM.len_utf8());
        }
        Ok(Self {
            path,
            raw,
            original,
        })
    }

    pub fn rewrite(&self, rules: &RuleTable) -> Rewrite {
        rewrite(&self.original, rules)
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileOutcome should be recorded in a MigrationReport"]
pub enum FileOutcome {
    /// The file differed after rewriting and was written back (or would
    /// have been, in a dry run).
    Rewritten {
        path: PathBuf,
        applied: Vec<String>,
        original: String,
        content: String,
        backup: Option<PathBuf>,
    },
    /// Nothing to migrate.
    Unchanged {
        path: PathBuf,
        backup: Option<PathBuf>,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Rewritten { path, .. } | FileOutcome::Unchanged { path, .. } => path,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, FileOutcome::Rewritten { .. })
    }
}

/// `<path>.bak`, keeping the original extension.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Read, rewrite, back up and write back a single file.
///
/// The backup is taken before any write and never replaces an existing
/// backup. The file is written only when its text actually changed; the
/// written text has leading whitespace trimmed and carries no BOM.
pub fn process_file(
    path: &Path,
    rules: &RuleTable,
    options: ProcessOptions,
) -> Result<FileOutcome, ProcessError> {
    let job = MigrationJob::load(path)?;
    let result = job.rewrite(rules);

    let backup = if options.backup && !options.dry_run {
        create_backup(&job.path, &job.raw)?
    } else {
        None
    };

    if !result.changed {
        tracing::debug!("{}: nothing to migrate", job.path.display());
        return Ok(FileOutcome::Unchanged {
            path: job.path,
            backup,
        });
    }

    let content = result.content.trim_start().to_string();
    if options.dry_run {
        tracing::debug!("{}: would apply {:?}", job.path.display(), result.applied);
    } else {
        atomic_write(&job.path, content.as_bytes()).map_err(|source| ProcessError::Write {
            path: job.path.clone(),
            source,
        })?;
        tracing::debug!("{}: applied {:?}", job.path.display(), result.applied);
    }

    Ok(FileOutcome::Rewritten {
        path: job.path,
        applied: result.applied,
        original: job.original,
        content,
        backup,
    })
}

/// Write `raw` to the backup path unless something is already there.
///
/// Returns the backup path when one was created.
fn create_backup(path: &Path, raw: &[u8]) -> Result<Option<PathBuf>, ProcessError> {
    let backup = backup_path(path);
    let file = OpenOptions::new().write(true).create_new(true).open(&backup);
    let mut file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!("keeping existing backup {}", backup.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ProcessError::Backup {
                path: path.to_path_buf(),
                backup,
                source,
            })
        }
    };

    file.write_all(raw)
        .and_then(|()| file.sync_all())
        .map_err(|source| ProcessError::Backup {
            path: path.to_path_buf(),
            backup: backup.clone(),
            source,
        })?;
    Ok(Some(backup))
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The replacement takes over the permissions of the file it replaces.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().set_permissions(permissions)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
