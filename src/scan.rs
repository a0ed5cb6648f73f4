//! Candidate file discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Script extension scanned by default (without the leading dot).
pub const DEFAULT_EXTENSION: &str = "cs";

/// Folder holding the vendored Mirror sources, never rewritten.
pub const VENDORED_DIR: &str = "Mirror";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Which files a scan selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// File extension to select, compared case-insensitively.
    pub extension: String,
    /// Directory names whose whole subtree is skipped.
    pub excluded_dirs: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            excluded_dirs: vec![VENDORED_DIR.to_string()],
        }
    }
}

impl ScanOptions {
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.iter().any(|dir| dir == name))
    }

    fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

/// Collect every candidate script under `root`, in traversal order.
///
/// Excluded directories are pruned rather than filtered, so nothing below
/// them is visited. Symlinks are not followed.
pub fn enumerate(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !options.is_excluded_dir(entry));

    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        if entry.file_type().is_file() && options.is_candidate(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("found {} candidate file(s) under {}", files.len(), root.display());
    Ok(files)
}
