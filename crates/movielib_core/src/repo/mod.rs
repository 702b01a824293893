//! Repository layer over document collections.
//!
//! # Responsibility
//! - Translate movie use-cases into collection filters and commands.
//! - Stay storage-agnostic: any `DocumentCollection<Movie>` works.
//!
//! # Invariants
//! - Repositories never validate; callers own required-field checks.
//! - Missing targets on delete/update surface as semantic `NotFound` errors.

pub mod movie_repo;
