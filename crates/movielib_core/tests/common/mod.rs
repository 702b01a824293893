#![allow(dead_code)]

use movielib_core::db::open_db_in_memory;
use movielib_core::{DocumentMovieRepository, Movie, MovieController, SqliteCollection};
use rusqlite::Connection;
use uuid::Uuid;

pub type SqliteController<'conn> =
    MovieController<DocumentMovieRepository<SqliteCollection<'conn, Movie>>>;

/// Fresh in-memory database with migrations applied.
pub fn fresh_db() -> Connection {
    open_db_in_memory().unwrap()
}

/// Random collection name so tests never share documents.
pub fn random_collection_name() -> String {
    format!("movies_{}", Uuid::new_v4().simple())
}

pub fn movie_collection(conn: &Connection) -> SqliteCollection<'_, Movie> {
    SqliteCollection::try_new(conn, random_collection_name()).unwrap()
}

pub fn controller(conn: &Connection) -> SqliteController<'_> {
    MovieController::new(DocumentMovieRepository::new(movie_collection(conn)))
}

pub fn movie(title: &str, director: &str, year_released: i32, genre: &str) -> Movie {
    let mut movie = Movie::new(title);
    movie.director = director.to_string();
    movie.year_released = year_released;
    movie.genre = genre.to_string();
    movie.duration = 120;
    movie.rating = 7.5;
    movie
}

pub fn first_and_second() -> (Movie, Movie) {
    let mut first = movie("First Movie", "Director One", 2001, "Drama");
    first.duration = 95;
    first.rating = 6.8;
    let mut second = movie("Second Movie", "Director Two", 2012, "Thriller");
    second.duration = 131;
    second.rating = 8.1;
    (first, second)
}
