//! Movie domain model.
//!
//! # Responsibility
//! - Define the single record stored by the library.
//! - Own the required-field rules checked before writes.
//!
//! # Invariants
//! - `id` is stable and never reused; renames keep it.
//! - A valid movie has a non-blank title and a finite rating.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Immutable identity of a stored movie.
pub type MovieId = Uuid;

/// Document field names used in store filters.
pub const ID_FIELD: &str = "id";
pub const TITLE_FIELD: &str = "title";

/// Reasons a movie cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieValidationError {
    NilId,
    /// Title is empty or whitespace only.
    MissingTitle,
    /// NaN and infinities have no JSON representation.
    NonFiniteRating,
}

impl Display for MovieValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "movie id must not be nil"),
            Self::MissingTitle => write!(f, "movie title is required"),
            Self::NonFiniteRating => write!(f, "movie rating must be a finite number"),
        }
    }
}

impl Error for MovieValidationError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub year_released: i32,
    pub genre: String,
    /// Running time in minutes.
    pub duration: i32,
    pub rating: f64,
}

impl Movie {
    /// Creates a movie with a generated id and empty descriptive fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates a movie with a caller-provided id.
    ///
    /// Does not validate; nil ids are caught by [`Movie::validate`].
    pub fn with_id(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            director: String::new(),
            year_released: 0,
            genre: String::new(),
            duration: 0,
            rating: 0.0,
        }
    }

    /// Checks required fields, reporting the first violation.
    pub fn validate(&self) -> Result<(), MovieValidationError> {
        if self.id.is_nil() {
            return Err(MovieValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(MovieValidationError::MissingTitle);
        }
        if !self.rating.is_finite() {
            return Err(MovieValidationError::NonFiniteRating);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
