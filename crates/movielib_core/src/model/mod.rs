//! Domain model for the movie library.
//!
//! # Invariants
//! - Every movie is identified by a stable `MovieId`, independent of title.
//! - Deletion is a hard delete; there are no tombstones.

pub mod movie;
