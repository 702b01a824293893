//! Runtime configuration for hosts embedding the movie library.
//!
//! # Responsibility
//! - Resolve database location, collection name and logging options.
//! - Read overrides from `MOVIELIB_*` environment variables.
//!
//! # Invariants
//! - A resolved config always names a valid collection.
//! - `log_dir`, when set, is absolute.

use crate::logging::{default_log_level, normalize_level};
use crate::store::is_valid_collection_name;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_VAR: &str = "MOVIELIB_DB_PATH";
pub const COLLECTION_VAR: &str = "MOVIELIB_COLLECTION";
pub const LOG_LEVEL_VAR: &str = "MOVIELIB_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "MOVIELIB_LOG_DIR";

/// Collection used when nothing else is configured.
pub const DEFAULT_COLLECTION: &str = "movies";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but blank.
    EmptyValue(&'static str),
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
    InvalidCollectionName(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "{key} is set but empty"),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
            Self::InvalidCollectionName(name) => {
                write!(f, "invalid collection name `{name}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Fresh in-memory database per connection.
    Memory,
    /// SQLite database file, created on first open.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub database: DatabaseLocation,
    pub collection: String,
    pub log_level: &'static str,
    /// File logging stays disabled while this is `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::Memory,
            collection: DEFAULT_COLLECTION.to_string(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl LibraryConfig {
    /// Builds a config from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set-but-blank keys are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();
        let read = |key: &'static str| -> ConfigResult<Option<String>> {
            match lookup(key) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
                Some(value) => Ok(Some(value.trim().to_string())),
            }
        };

        if let Some(path) = read(DB_PATH_VAR)? {
            config.database = DatabaseLocation::File(PathBuf::from(path));
        }
        if let Some(name) = read(COLLECTION_VAR)? {
            config = config.with_collection(name)?;
        }
        if let Some(level) = read(LOG_LEVEL_VAR)? {
            config = config.with_log_level(&level)?;
        }
        if let Some(dir) = read(LOG_DIR_VAR)? {
            config = config.with_log_dir(dir)?;
        }

        Ok(config)
    }

    pub fn with_database_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = DatabaseLocation::File(path.into());
        self
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> ConfigResult<Self> {
        let name = name.into();
        if !is_valid_collection_name(&name) {
            return Err(ConfigError::InvalidCollectionName(name));
        }
        self.collection = name;
        Ok(self)
    }

    pub fn with_log_level(mut self, level: &str) -> ConfigResult<Self> {
        self.log_level =
            normalize_level(level).ok_or_else(|| ConfigError::InvalidLogLevel(level.to_string()))?;
        Ok(self)
    }

    pub fn with_log_dir(mut self, dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(dir.to_path_buf()));
        }
        self.log_dir = Some(dir.to_path_buf());
        Ok(self)
    }
}
