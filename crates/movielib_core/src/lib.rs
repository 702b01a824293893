//! Core of the movie library.
//! Owns movie validation, the repository contract and the document store.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ConfigError, DatabaseLocation, LibraryConfig};
pub use controller::movie_controller::{
    ControllerError, ControllerResult, ErrorKind, MovieController,
};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::movie::{Movie, MovieId, MovieValidationError};
pub use repo::movie_repo::{DocumentMovieRepository, MovieRepository, RepoError, RepoResult};
pub use store::{
    DocumentCollection, Filter, FilterValue, MemoryCollection, SqliteCollection, StoreError,
    StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
