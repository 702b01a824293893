//! Movie repository contract and document-collection implementation.
//!
//! # Responsibility
//! - Provide add/delete/update/get/search APIs over a movie collection.
//! - Keep filter construction inside the persistence boundary.
//!
//! # Invariants
//! - `update` targets the stored document by `id`, never by title.
//! - `delete` targets the first document whose title matches exactly.
//! - Title search is a case-sensitive substring match.

use crate::model::movie::{Movie, MovieId, ID_FIELD, TITLE_FIELD};
use crate::store::{DocumentCollection, Filter, StoreError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    TitleNotFound(String),
    IdNotFound(MovieId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::TitleNotFound(title) => write!(f, "movie not found by title: {title}"),
            Self::IdNotFound(id) => write!(f, "movie not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::TitleNotFound(_) | Self::IdNotFound(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Repository interface for movie CRUD operations.
pub trait MovieRepository {
    fn add(&self, movie: &Movie) -> RepoResult<MovieId>;
    fn delete(&self, title: &str) -> RepoResult<()>;
    fn update(&self, movie: &Movie) -> RepoResult<()>;
    fn get_all(&self) -> RepoResult<Vec<Movie>>;
    fn get_by_title(&self, title: &str) -> RepoResult<Option<Movie>>;
    fn search_by_title_fragment(&self, fragment: &str) -> RepoResult<Vec<Movie>>;
}

/// Movie repository backed by any document collection.
pub struct DocumentMovieRepository<C> {
    collection: C,
}

impl<C: DocumentCollection<Movie>> DocumentMovieRepository<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }
}

impl<C: DocumentCollection<Movie>> MovieRepository for DocumentMovieRepository<C> {
    fn add(&self, movie: &Movie) -> RepoResult<MovieId> {
        self.collection.insert_one(movie)?;
        debug!(
            "event=movie_add module=repo status=ok movie_id={}",
            movie.id
        );
        Ok(movie.id)
    }

    fn delete(&self, title: &str) -> RepoResult<()> {
        let removed = self.collection.delete_one(&title_filter(title))?;
        if removed == 0 {
            debug!("event=movie_delete module=repo status=not_found");
            return Err(RepoError::TitleNotFound(title.to_string()));
        }

        debug!("event=movie_delete module=repo status=ok removed={removed}");
        Ok(())
    }

    fn update(&self, movie: &Movie) -> RepoResult<()> {
        let replaced = self
            .collection
            .replace_one(&Filter::eq(ID_FIELD, movie.id.to_string()), movie)?;
        if replaced == 0 {
            debug!(
                "event=movie_update module=repo status=not_found movie_id={}",
                movie.id
            );
            return Err(RepoError::IdNotFound(movie.id));
        }

        debug!(
            "event=movie_update module=repo status=ok movie_id={}",
            movie.id
        );
        Ok(())
    }

    fn get_all(&self) -> RepoResult<Vec<Movie>> {
        let movies = self.collection.find(&Filter::All)?;
        debug!(
            "event=movie_list module=repo status=ok count={}",
            movies.len()
        );
        Ok(movies)
    }

    fn get_by_title(&self, title: &str) -> RepoResult<Option<Movie>> {
        Ok(self.collection.find_one(&title_filter(title))?)
    }

    fn search_by_title_fragment(&self, fragment: &str) -> RepoResult<Vec<Movie>> {
        let movies = self
            .collection
            .find(&Filter::contains(TITLE_FIELD, fragment))?;
        debug!(
            "event=movie_search module=repo status=ok hits={}",
            movies.len()
        );
        Ok(movies)
    }
}

fn title_filter(title: &str) -> Filter {
    Filter::eq(TITLE_FIELD, title)
}
