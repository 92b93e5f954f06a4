//! Where the word database lives and how many writers service it.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".wordbook";
/// Logical name of the database; the file carries a `.sqlite` extension.
pub const DB_NAME: &str = "word_database";
/// Environment variable that overrides the default database location.
pub const DB_PATH_ENV: &str = "WORDBOOK_DB";

/// Fixed size of the background write pool.
pub const DEFAULT_WORKERS: usize = 4;
/// Background failures kept for the error channel before new ones are only logged.
pub const ERROR_CHANNEL_CAPACITY: usize = 64;

/// Location of the backing file. Only consulted by the first caller that
/// opens the store; later callers get the existing instance regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    path: PathBuf,
}

impl StoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `dir/word_database.sqlite`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at(dir.as_ref().join(format!("{DB_NAME}.sqlite")))
    }

    /// Resolve `~/.wordbook/word_database.sqlite`.
    pub fn default_location() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Honour `WORDBOOK_DB` when it is set and non-empty.
    pub fn from_env() -> Result<Self> {
        match env::var_os(DB_PATH_ENV) {
            Some(path) if !path.is_empty() => Ok(Self::at(path)),
            _ => Self::default_location(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
