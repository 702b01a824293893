//! Document collection abstraction and its implementations.
//!
//! # Responsibility
//! - Define the minimal capability set repositories rely on.
//! - Keep filter semantics identical across SQLite and in-memory backends.
//!
//! # Invariants
//! - Documents are JSON objects; typed values round-trip through serde.
//! - `find` returns documents in insertion order; `*_one` operations act on
//!   the first match in that order.
//! - Text matching is case-sensitive.

use crate::db::DbError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCollection;
pub use sqlite::SqliteCollection;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));
static COLLECTION_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]{0,127}$").expect("valid collection name regex")
});

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Documents must serialize to JSON objects.
    NotAnObject,
    InvalidField(String),
    InvalidCollectionName(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// In-memory collection lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::NotAnObject => write!(f, "document does not serialize to a JSON object"),
            Self::InvalidField(field) => write!(f, "invalid document field name `{field}`"),
            Self::InvalidCollectionName(name) => write!(f, "invalid collection name `{name}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::Poisoned => write!(f, "collection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Scalar operand for equality filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

/// Predicate over top-level document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq { field: String, value: FilterValue },
    /// Substring match on a text field. An empty fragment matches any text.
    Contains { field: String, fragment: String },
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            fragment: fragment.into(),
        }
    }

    /// Rejects field names outside `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn validate(&self) -> StoreResult<()> {
        match self {
            Self::All => Ok(()),
            Self::Eq { field, .. } | Self::Contains { field, .. } => check_field(field),
            Self::And(filters) => filters.iter().try_for_each(Filter::validate),
        }
    }

    /// Evaluates the filter against one JSON document.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Self::All => true,
            Self::Eq { field, value } => match (document.get(field), value) {
                (Some(Value::String(actual)), FilterValue::Text(expected)) => actual == expected,
                // Numbers compare by value: `7` matches a stored `7.0`.
                (Some(Value::Number(actual)), FilterValue::Integer(expected)) => {
                    match actual.as_i64() {
                        Some(actual) => actual == *expected,
                        None => actual.as_f64() == Some(*expected as f64),
                    }
                }
                (Some(actual @ Value::Number(_)), FilterValue::Real(expected)) => {
                    actual.as_f64() == Some(*expected)
                }
                _ => false,
            },
            Self::Contains { field, fragment } => document
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.contains(fragment.as_str())),
            Self::And(filters) => filters.iter().all(|filter| filter.matches(document)),
        }
    }
}

fn check_field(field: &str) -> StoreResult<()> {
    if FIELD_NAME_RE.is_match(field) {
        Ok(())
    } else {
        Err(StoreError::InvalidField(field.to_string()))
    }
}

/// Returns whether `name` can be used as a collection name.
pub fn is_valid_collection_name(name: &str) -> bool {
    COLLECTION_NAME_RE.is_match(name)
}

/// Minimal document collection capability set.
pub trait DocumentCollection<T> {
    fn insert_one(&self, document: &T) -> StoreResult<()>;
    /// Inserts every document or none of them.
    fn insert_many(&self, documents: &[T]) -> StoreResult<usize>;
    fn find(&self, filter: &Filter) -> StoreResult<Vec<T>>;
    fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>>;
    /// Replaces the first match in place. Returns the number replaced (0 or 1).
    fn replace_one(&self, filter: &Filter, document: &T) -> StoreResult<usize>;
    /// Deletes the first match. Returns the number deleted (0 or 1).
    fn delete_one(&self, filter: &Filter) -> StoreResult<usize>;
    fn count(&self, filter: &Filter) -> StoreResult<usize>;
}

impl<T, C> DocumentCollection<T> for &C
where
    C: DocumentCollection<T> + ?Sized,
{
    fn insert_one(&self, document: &T) -> StoreResult<()> {
        (**self).insert_one(document)
    }

    fn insert_many(&self, documents: &[T]) -> StoreResult<usize> {
        (**self).insert_many(documents)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        (**self).find(filter)
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        (**self).find_one(filter)
    }

    fn replace_one(&self, filter: &Filter, document: &T) -> StoreResult<usize> {
        (**self).replace_one(filter, document)
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<usize> {
        (**self).delete_one(filter)
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        (**self).count(filter)
    }
}

/// Serializes `document` and checks it is a JSON object.
pub(crate) fn to_document<T: serde::Serialize>(document: &T) -> StoreResult<Value> {
    let value = serde_json::to_value(document)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(StoreError::NotAnObject)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_collection_name, Filter, StoreError};
    use serde_json::json;

    #[test]
    fn contains_is_case_sensitive_substring() {
        let doc = json!({ "title": "Second Movie" });
        assert!(Filter::contains("title", "Second").matches(&doc));
        assert!(Filter::contains("title", "cond Mo").matches(&doc));
        assert!(!Filter::contains("title", "second").matches(&doc));
        assert!(Filter::contains("title", "").matches(&doc));
        assert!(!Filter::contains("director", "").matches(&doc));
    }

    #[test]
    fn eq_compares_by_json_type() {
        let doc = json!({ "title": "1999", "year_released": 1999, "rating": 7.5 });
        assert!(Filter::eq("year_released", 1999_i64).matches(&doc));
        assert!(!Filter::eq("title", 1999_i64).matches(&doc));
        assert!(Filter::eq("title", "1999").matches(&doc));
        assert!(Filter::eq("rating", 7.5).matches(&doc));
    }

    #[test]
    fn integer_eq_matches_integral_floats() {
        let doc = json!({ "score": 7.0, "rating": 7.5 });
        assert!(Filter::eq("score", 7_i64).matches(&doc));
        assert!(!Filter::eq("score", 8_i64).matches(&doc));
        assert!(!Filter::eq("rating", 7_i64).matches(&doc));
        assert!(Filter::eq("score", 7.0).matches(&json!({ "score": 7 })));
    }

    #[test]
    fn and_requires_every_clause() {
        let doc = json!({ "title": "Alien", "genre": "Horror" });
        let both = Filter::And(vec![
            Filter::eq("title", "Alien"),
            Filter::eq("genre", "Horror"),
        ]);
        let mismatch = Filter::And(vec![
            Filter::eq("title", "Alien"),
            Filter::eq("genre", "Comedy"),
        ]);
        assert!(both.matches(&doc));
        assert!(!mismatch.matches(&doc));
        assert!(Filter::And(Vec::new()).matches(&doc));
    }

    #[test]
    fn validate_rejects_path_like_fields() {
        let nested = Filter::And(vec![Filter::All, Filter::eq("a.b", "x")]);
        assert!(matches!(
            nested.validate(),
            Err(StoreError::InvalidField(field)) if field == "a.b"
        ));
        assert!(Filter::contains("title", "x").validate().is_ok());
    }

    #[test]
    fn collection_names_are_restricted() {
        assert!(is_valid_collection_name("movies"));
        assert!(is_valid_collection_name("movies_0f3a-test.v2"));
        assert!(!is_valid_collection_name(""));
        assert!(!is_valid_collection_name("bad name"));
        assert!(!is_valid_collection_name("-leading"));
    }
}
