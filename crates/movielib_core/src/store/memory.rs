//! Process-local document collection.
//!
//! Stores serialized JSON values so filters behave exactly as they do
//! against SQLite. Useful for embedding and for tests that do not need a
//! database file.

use super::{to_document, DocumentCollection, Filter, StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard};

pub struct MemoryCollection<T> {
    documents: Mutex<Vec<Value>>,
    _document: PhantomData<fn() -> T>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            _document: PhantomData,
        }
    }
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<Value>>> {
        self.documents.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl<T> DocumentCollection<T> for MemoryCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    fn insert_one(&self, document: &T) -> StoreResult<()> {
        let value = to_document(document)?;
        self.lock()?.push(value);
        Ok(())
    }

    fn insert_many(&self, documents: &[T]) -> StoreResult<usize> {
        let values = documents
            .iter()
            .map(to_document)
            .collect::<StoreResult<Vec<_>>>()?;
        let inserted = values.len();
        self.lock()?.extend(values);
        Ok(inserted)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<T>> {
        filter.validate()?;
        self.lock()?
            .iter()
            .filter(|value| filter.matches(value))
            .map(|value| T::deserialize(value).map_err(StoreError::from))
            .collect()
    }

    fn find_one(&self, filter: &Filter) -> StoreResult<Option<T>> {
        filter.validate()?;
        match self.lock()?.iter().find(|value| filter.matches(value)) {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    fn replace_one(&self, filter: &Filter, document: &T) -> StoreResult<usize> {
        filter.validate()?;
        let replacement = to_document(document)?;
        let mut documents = self.lock()?;
        match documents.iter_mut().find(|value| filter.matches(value)) {
            Some(slot) => {
                *slot = replacement;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_one(&self, filter: &Filter) -> StoreResult<usize> {
        filter.validate()?;
        let mut documents = self.lock()?;
        match documents.iter().position(|value| filter.matches(value)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        filter.validate()?;
        Ok(self
            .lock()?
            .iter()
            .filter(|value| filter.matches(value))
            .count())
    }
}
