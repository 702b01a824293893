//! SQLite-backed document collection.
//!
//! All collections share the `documents` table and are partitioned by the
//! `collection` column. Filters compile to `json_extract` predicates with
//! bound parameters; field names are validated before they reach SQL.

use super::{to_document, DocumentCollection, Filter, FilterValue, StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

const DOCUMENTS_TABLE: &str = "documents";

/// Named collection of `T` documents inside a migrated SQLite database.
pub struct SqliteCollection<'conn, T> {
    conn: &'conn Connection,
    name: String,
    _document: PhantomData<fn() -> T>,
}

impl<'conn, T> SqliteCollection<'conn, T> {
    /// Binds a collection to a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `InvalidCollectionName` for names outside the allowed pattern.
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the schema lacks `documents`.
    pub fn try_new(conn: &'conn Connection, name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();
        if !super::is_valid_collection_name(&name) {
            return Err(StoreError::InvalidCollectionName(name));
        }

        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [DOCUMENTS_TABLE],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(StoreError::MissingRequiredTable(DOCUMENTS_TABLE));
        }

        Ok(Self {
            conn,
            name,
            _document: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deletes every document of this collection. Returns the number removed.
    pub fn drop_collection(&self) -> StoreResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1;",
            [self.name.as_str()],
        )?;
        Ok(removed)
    }

    /// Builds `collection = ? AND <filter>` and its bind values.
    fn scoped_where(&self, filter: &Filter) -> StoreResult<(String, Vec<Value>)> {
        filter.validate()?;
        let mut sql = String::from("collection = ?");
        let mut binds = vec![Value::Text(self.name.clone())];
        sql.push_str(" AND ");
        compile_filter(filter, &mut sql, &mut binds);
        Ok((sql, binds))
    }

    fn first_match_seq_sql(where_sql: &str) -> String {
        format!("SELECT seq FROM documents WHERE {where_sql} ORDER BY seq LIMIT 1")
    }
}

impl<T> DocumentCollection<T> for SqliteCollection<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    fn insert_one(&self, document: &T) -> StoreResult<()> {
        let body = to_document(document)?.to_string();
        self.conn.execute(
            "INSERT INTO documents (collection, body) VALUES (?1, ?2);",
            params![self.name.as_str(), body],
        )?;
        Ok(())
    }

    fn insert_many(&self, documents: &[T]) -> StoreResult<usize> {
        let bodies = documents
            .iter()
            .map(|document| to_document(document).map(|value| value.to_string()))
            .collect::<StoreResult<Vec<_>>>()?;

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO documents (collection, body) VALUES (?1, ?2);")?;
            for body in &bodies {
                stmt.execute(params![self.name.as_str(), body])?;
            }
        }
        tx.commit()?;

        Ok(bodies.len())
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        let (where_sql, binds) = self.scoped_where(filter)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body FROM documents WHERE {where_sql} ORDER BY seq;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            documents.push(serde_json::from_str(&body)?);
        }
        Ok(documents)
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        let (where_sql, binds) = self.scoped_where(filter)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body FROM documents WHERE {where_sql} ORDER BY seq LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;

        if let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            return Ok(Some(serde_json::from_str(&body)?));
        }
        Ok(None)
    }

    fn replace_one(&self, filter: &Filter, document: &T) -> StoreResult<usize> {
        let body = to_document(document)?.to_string();
        let (where_sql, filter_binds) = self.scoped_where(filter)?;

        let mut binds = vec![Value::Text(body)];
        binds.extend(filter_binds);
        let changed = self.conn.execute(
            &format!(
                "UPDATE documents
                 SET
                    body = ?,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE seq = ({});",
                Self::first_match_seq_sql(&where_sql)
            ),
            params_from_iter(binds),
        )?;
        Ok(changed)
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<usize> {
        let (where_sql, binds) = self.scoped_where(filter)?;
        let removed = self.conn.execute(
            &format!(
                "DELETE FROM documents WHERE seq = ({});",
                Self::first_match_seq_sql(&where_sql)
            ),
            params_from_iter(binds),
        )?;
        Ok(removed)
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        let (where_sql, binds) = self.scoped_where(filter)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM documents WHERE {where_sql};"),
            params_from_iter(binds),
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn compile_filter(filter: &Filter, sql: &mut String, binds: &mut Vec<Value>) {
    match filter {
        Filter::All => sql.push_str("1 = 1"),
        Filter::Eq { field, value } => {
            sql.push_str("json_extract(body, ?) = ?");
            binds.push(Value::Text(json_path(field)));
            binds.push(match value {
                FilterValue::Text(text) => Value::Text(text.clone()),
                FilterValue::Integer(number) => Value::Integer(*number),
                FilterValue::Real(number) => Value::Real(*number),
            });
        }
        Filter::Contains { field, fragment } => {
            // json_type guards against instr() coercing numbers to text.
            sql.push_str("(json_type(body, ?) = 'text' AND instr(json_extract(body, ?), ?) > 0)");
            binds.push(Value::Text(json_path(field)));
            binds.push(Value::Text(json_path(field)));
            binds.push(Value::Text(fragment.clone()));
        }
        Filter::And(filters) if filters.is_empty() => sql.push_str("1 = 1"),
        Filter::And(filters) => {
            sql.push('(');
            for (index, inner) in filters.iter().enumerate() {
                if index > 0 {
                    sql.push_str(" AND ");
                }
                compile_filter(inner, sql, binds);
            }
            sql.push(')');
        }
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

#[cfg(test)]
mod tests {
    use super::compile_filter;
    use crate::store::Filter;
    use rusqlite::types::Value;

    #[test]
    fn compiles_nested_filters_with_positional_binds() {
        let filter = Filter::And(vec![
            Filter::eq("genre", "Drama"),
            Filter::contains("title", "Night"),
        ]);
        let mut sql = String::new();
        let mut binds = Vec::new();
        compile_filter(&filter, &mut sql, &mut binds);

        assert_eq!(sql.matches('?').count(), binds.len());
        assert!(sql.starts_with('('));
        assert_eq!(binds[0], Value::Text("$.genre".to_string()));
        assert_eq!(binds[1], Value::Text("Drama".to_string()));
        assert_eq!(binds[4], Value::Text("Night".to_string()));
    }

    #[test]
    fn empty_and_compiles_to_tautology() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        compile_filter(&Filter::And(Vec::new()), &mut sql, &mut binds);
        assert_eq!(sql, "1 = 1");
        assert!(binds.is_empty());
    }
}
