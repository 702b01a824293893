//! Storage for every document collection.
//!
//! One SQLite table, `documents`, holds all collections. Each row carries the
//! owning collection name, the JSON body and millisecond timestamps; `seq`
//! fixes insertion order.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the last applied migration.
//! - A connection handed out by `open_*` is already at `latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_configured, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer library release.
    SchemaTooNew { found: u32, supported: u32 },
    /// A migration script failed; nothing from the batch was committed.
    MigrationFailed {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "movie store database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "document schema v{found} is newer than this build understands (v{supported})"
            ),
            Self::MigrationFailed {
                version,
                name,
                source,
            } => write!(f, "document schema migration v{version} ({name}) failed: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::MigrationFailed { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
