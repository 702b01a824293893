mod common;

use common::{first_and_second, fresh_db, movie, movie_collection};
use movielib_core::{
    DocumentCollection, DocumentMovieRepository, Filter, MemoryCollection, Movie,
    MovieRepository, RepoError,
};

#[test]
fn add_and_get_by_title_roundtrip() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));

    let (first, _) = first_and_second();
    let id = repo.add(&first).unwrap();
    assert_eq!(id, first.id);

    let loaded = repo.get_by_title("First Movie").unwrap().unwrap();
    assert_eq!(loaded, first);
}

#[test]
fn add_performs_no_validation() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));

    let untitled = Movie::new("");
    repo.add(&untitled).unwrap();

    assert_eq!(repo.get_all().unwrap(), vec![untitled]);
}

#[test]
fn get_all_returns_empty_vec_for_empty_collection() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));

    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn get_by_title_is_exact_match() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));
    repo.add(&movie("Alien", "Ridley Scott", 1979, "Horror"))
        .unwrap();

    assert!(repo.get_by_title("alien").unwrap().is_none());
    assert!(repo.get_by_title("Alie").unwrap().is_none());
    assert!(repo.get_by_title("Alien").unwrap().is_some());
}

#[test]
fn delete_removes_matching_title_only() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));
    let (first, second) = first_and_second();
    repo.add(&first).unwrap();
    repo.add(&second).unwrap();

    repo.delete("First Movie").unwrap();

    assert_eq!(repo.get_all().unwrap(), vec![second]);
}

#[test]
fn delete_missing_title_returns_title_not_found() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));

    let err = repo.delete("Ghost").unwrap_err();
    assert!(matches!(err, RepoError::TitleNotFound(title) if title == "Ghost"));
}

#[test]
fn update_matches_by_id_and_allows_rename() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));
    let (mut first, second) = first_and_second();
    repo.add(&first).unwrap();
    repo.add(&second).unwrap();

    first.title = "First Movie (Director's Cut)".to_string();
    first.duration = 140;
    repo.update(&first).unwrap();

    assert!(repo.get_by_title("First Movie").unwrap().is_none());
    let renamed = repo
        .get_by_title("First Movie (Director's Cut)")
        .unwrap()
        .unwrap();
    assert_eq!(renamed, first);
    assert_eq!(repo.get_by_title("Second Movie").unwrap().unwrap(), second);

    let all = repo.get_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first.id);
}

#[test]
fn update_unknown_id_returns_id_not_found() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));
    let stray = movie("Stray", "Nobody", 2000, "Drama");

    let err = repo.update(&stray).unwrap_err();
    assert!(matches!(err, RepoError::IdNotFound(id) if id == stray.id));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn search_by_fragment_is_case_sensitive_substring() {
    let conn = fresh_db();
    let repo = DocumentMovieRepository::new(movie_collection(&conn));
    let (first, second) = first_and_second();
    repo.add(&first).unwrap();
    repo.add(&second).unwrap();

    assert_eq!(repo.search_by_title_fragment("Second").unwrap(), vec![second]);
    assert_eq!(repo.search_by_title_fragment("Movie").unwrap().len(), 2);
    assert!(repo.search_by_title_fragment("second").unwrap().is_empty());
}

#[test]
fn repository_works_over_memory_collection() {
    let collection: MemoryCollection<Movie> = MemoryCollection::new();
    let repo = DocumentMovieRepository::new(&collection);
    let (first, second) = first_and_second();

    collection.insert_many(&[first.clone(), second.clone()]).unwrap();

    assert_eq!(repo.get_all().unwrap().len(), 2);
    repo.delete("Second Movie").unwrap();
    assert_eq!(collection.count(&Filter::All).unwrap(), 1);
    assert_eq!(repo.get_by_title("First Movie").unwrap(), Some(first));
}

#[test]
fn seeded_collection_is_visible_to_repository() {
    let conn = fresh_db();
    let collection = movie_collection(&conn);
    let seed: Vec<Movie> = (1..=5)
        .map(|n| movie(&format!("Seeded {n}"), "Crew", 2000 + n, "Drama"))
        .collect();
    collection.insert_many(&seed).unwrap();

    let repo = DocumentMovieRepository::new(collection);
    let all = repo.get_all().unwrap();
    assert_eq!(all, seed);
}
