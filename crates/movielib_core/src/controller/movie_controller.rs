//! Movie use-case controller.
//!
//! # Responsibility
//! - Validate caller input before any repository write.
//! - Map repository outcomes onto the caller-facing error taxonomy.
//!
//! # Invariants
//! - Add/update reject invalid movies with exactly `Movie is not valid.`.
//! - Titles stay unique across stored movies.
//! - `get_by_title` returns `None` for a miss, while
//!   `search_by_title_fragment` fails with `NoTitleMatches`.

use crate::model::movie::{Movie, MovieId, MovieValidationError};
use crate::repo::movie_repo::{MovieRepository, RepoError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Coarse error class, for hosts mapping failures to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Argument,
    NotFound,
    KeyNotFound,
    Conflict,
    Storage,
}

#[derive(Debug)]
pub enum ControllerError {
    InvalidMovie(MovieValidationError),
    /// Blank title passed where an identifier is required.
    EmptyTitle,
    MovieNotFound(String),
    NoTitleMatches(String),
    DuplicateTitle(String),
    Repo(RepoError),
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMovie(_) => ErrorKind::Validation,
            Self::EmptyTitle => ErrorKind::Argument,
            Self::MovieNotFound(_) => ErrorKind::NotFound,
            Self::NoTitleMatches(_) => ErrorKind::KeyNotFound,
            Self::DuplicateTitle(_) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMovie(_) => write!(f, "Movie is not valid."),
            Self::EmptyTitle => write!(f, "Title cannot be empty"),
            Self::MovieNotFound(title) => write!(f, "Movie with title '{title}' not found."),
            Self::NoTitleMatches(fragment) => {
                write!(f, "No movies found with title containing '{fragment}'.")
            }
            Self::DuplicateTitle(title) => {
                write!(f, "Movie with title '{title}' already exists.")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMovie(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TitleNotFound(title) => Self::MovieNotFound(title),
            other => Self::Repo(other),
        }
    }
}

/// Validating front for a movie repository.
pub struct MovieController<R: MovieRepository> {
    repo: R,
}

impl<R: MovieRepository> MovieController<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new movie.
    ///
    /// # Errors
    /// - `InvalidMovie` when a required field is missing.
    /// - `DuplicateTitle` when another movie already uses the title.
    pub fn add(&self, movie: &Movie) -> ControllerResult<MovieId> {
        validate(movie, "add")?;
        self.ensure_title_free(movie)?;
        Ok(self.repo.add(movie)?)
    }

    /// Deletes the movie with exactly this title.
    ///
    /// # Errors
    /// - `EmptyTitle` for empty or whitespace-only input.
    /// - `MovieNotFound` when no stored movie has the title.
    pub fn delete(&self, title: &str) -> ControllerResult<()> {
        if title.trim().is_empty() {
            debug!("event=movie_delete module=controller status=rejected reason=empty_title");
            return Err(ControllerError::EmptyTitle);
        }
        Ok(self.repo.delete(title)?)
    }

    /// Replaces the stored movie sharing `movie.id`.
    ///
    /// The title may change; identity is the id.
    ///
    /// # Errors
    /// - `InvalidMovie` when a required field is missing.
    /// - `DuplicateTitle` when the new title belongs to another movie.
    /// - `MovieNotFound` (naming the new title) when the id is not stored.
    pub fn update(&self, movie: &Movie) -> ControllerResult<()> {
        validate(movie, "update")?;
        self.ensure_title_free(movie)?;
        self.repo.update(movie).map_err(|err| match err {
            RepoError::IdNotFound(_) => ControllerError::MovieNotFound(movie.title.clone()),
            other => other.into(),
        })
    }

    pub fn get_all(&self) -> ControllerResult<Vec<Movie>> {
        Ok(self.repo.get_all()?)
    }

    /// Looks up one movie; a miss is `Ok(None)`.
    pub fn get_by_title(&self, title: &str) -> ControllerResult<Option<Movie>> {
        Ok(self.repo.get_by_title(title)?)
    }

    /// Returns every movie whose title contains `fragment`.
    ///
    /// # Errors
    /// - `NoTitleMatches` when nothing matches.
    pub fn search_by_title_fragment(&self, fragment: &str) -> ControllerResult<Vec<Movie>> {
        let movies = self.repo.search_by_title_fragment(fragment)?;
        if movies.is_empty() {
            return Err(ControllerError::NoTitleMatches(fragment.to_string()));
        }
        Ok(movies)
    }

    fn ensure_title_free(&self, movie: &Movie) -> ControllerResult<()> {
        match self.repo.get_by_title(&movie.title)? {
            Some(existing) if existing.id != movie.id => {
                warn!(
                    "event=movie_write module=controller status=rejected reason=duplicate_title movie_id={} existing_id={}",
                    movie.id, existing.id
                );
                Err(ControllerError::DuplicateTitle(movie.title.clone()))
            }
            _ => Ok(()),
        }
    }
}

fn validate(movie: &Movie, operation: &'static str) -> ControllerResult<()> {
    movie.validate().map_err(|err| {
        debug!(
            "event=movie_{operation} module=controller status=rejected reason=invalid_movie detail={err}"
        );
        ControllerError::InvalidMovie(err)
    })
}
