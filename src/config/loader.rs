//! Finding and reading `mirror-migrate.toml`.

use crate::config::schema::{MigrationConfig, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "mirror-migrate.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {} is not valid TOML: {source}", describe(.path.as_deref()))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("config {} rejected: {source}", describe(.path.as_deref()))]
    Invalid {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    /// The config file involved, if the text came from disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path.as_path()),
            ConfigError::Parse { path, .. } | ConfigError::Invalid { path, .. } => path.as_deref(),
        }
    }
}

fn describe(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<inline>".to_string(),
    }
}

/// Deserialize and check a config whose text came from `origin`.
fn parse(input: &str, origin: Option<&Path>) -> Result<MigrationConfig, ConfigError> {
    let path = origin.map(Path::to_path_buf);
    let config: MigrationConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Parse { path, source }),
    };
    if let Err(source) = config.validate() {
        return Err(ConfigError::Invalid { path, source });
    }
    Ok(config)
}

/// Parse config text that did not come from a file.
pub fn load_from_str(input: &str) -> Result<MigrationConfig, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<MigrationConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

/// Load `explicit` if given, else `dir/mirror-migrate.toml` if it exists,
/// else the defaults.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<MigrationConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
        tracing::debug!("no {} in {}, using defaults", DEFAULT_CONFIG_FILE, dir.display());
        return Ok(MigrationConfig::default());
    }
    tracing::debug!("using config {}", candidate.display());
    load_from_path(candidate)
}
