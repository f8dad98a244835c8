//! InMemoryStore - HashMap-backed document engine for testing and development.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::trace;

use super::filter::{canonical_ids, matches};
use super::object_id::ObjectId;
use super::projection::{project, resolve};
use super::value::compare_by;
use crate::collection::{Collection, StorageError};
use crate::entity::{document_id, Document, Entity, ID_FIELD};
use crate::query::{Projection, Query};

/// Version key the engine stamps on every stored document.
pub const VERSION_FIELD: &str = "__v";

type Documents = Arc<RwLock<Vec<Document>>>;

/// In-memory document store holding one insertion-ordered list per collection.
///
/// Clone-friendly via Arc; clones and handles share storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<String, Documents>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collection for `T`, created on first use.
    pub fn collection<T: Entity>(&self) -> InMemoryCollection<T> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections
            .entry(T::COLLECTION.to_string())
            .or_default()
            .clone();

        InMemoryCollection {
            name: T::COLLECTION,
            documents,
            _marker: PhantomData,
        }
    }

    /// Names of every collection created so far.
    pub fn collection_names(&self) -> Vec<String> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Handle to one collection of an [`InMemoryStore`].
///
/// Identifiers are 24-character hex [`ObjectId`]s. Inserts fill in `_id`,
/// `__v` and the entity's schema defaults, then check the result still
/// deserializes as `T`.
pub struct InMemoryCollection<T> {
    name: &'static str,
    documents: Documents,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryCollection<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            documents: self.documents.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> InMemoryCollection<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>, StorageError> {
        self.documents
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Document>>, StorageError> {
        self.documents
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".into()))
    }

    fn validation(&self, reason: impl Into<String>) -> StorageError {
        StorageError::Validation {
            collection: self.name.to_string(),
            reason: reason.into(),
        }
    }

    /// Builds the stored form of an insert payload.
    fn prepare(&self, data: Document) -> Result<Document, StorageError> {
        let id = match data.get(ID_FIELD) {
            None | Some(Value::Null) => ObjectId::new().to_hex(),
            Some(Value::String(id)) if ObjectId::is_valid(id) => canonical_id(id),
            Some(other) => {
                return Err(self.validation(format!(
                    "{} must be a 24-character hex string, got {}",
                    ID_FIELD, other
                )));
            }
        };

        let mut doc = Document::new();
        doc.insert(ID_FIELD.to_string(), Value::String(id));
        for (key, value) in data {
            if key != ID_FIELD && key != VERSION_FIELD {
                doc.insert(key, value);
            }
        }
        for (key, value) in T::defaults() {
            doc.entry(key).or_insert(value);
        }
        doc.insert(VERSION_FIELD.to_string(), json!(0));

        serde_json::from_value::<T>(Value::Object(doc.clone()))
            .map_err(|e| self.validation(e.to_string()))?;

        Ok(doc)
    }

    fn duplicate(&self, id: &str) -> StorageError {
        StorageError::DuplicateKey {
            collection: self.name.to_string(),
            id: id.to_string(),
        }
    }
}

/// Lowercase hex form of a valid id; anything else is returned unchanged.
fn canonical_id(id: &str) -> String {
    ObjectId::parse_str(id)
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|_| id.to_string())
}

#[async_trait]
impl<T: Entity> Collection<T> for InMemoryCollection<T> {
    type Filter = Value;

    fn name(&self) -> &str {
        self.name
    }

    fn is_valid_id(&self, id: &str) -> bool {
        ObjectId::is_valid(id)
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &[VERSION_FIELD]
    }

    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, StorageError> {
        let shape = resolve(projection)?;
        let id = canonical_id(id);
        let documents = self.read()?;

        let found = documents
            .iter()
            .find(|doc| document_id(doc) == Some(id.as_str()))
            .map(|doc| project(doc, shape.as_ref()));
        trace!(collection = self.name, id = %id, found = found.is_some(), "find_by_id");
        Ok(found)
    }

    async fn find(&self, mut query: Query<Value>) -> Result<Vec<Document>, StorageError> {
        canonical_ids(&mut query.filter);
        let shape = resolve(query.projection.as_ref())?;
        let documents = self.read()?;

        let mut matched = Vec::new();
        for doc in documents.iter() {
            if matches(&query.filter, doc)? {
                matched.push(doc);
            }
        }
        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| compare_by(sort, a, b));
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = match query.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };
        trace!(
            collection = self.name,
            matched = matched.len(),
            skip,
            limit = query.limit,
            "find"
        );

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| project(doc, shape.as_ref()))
            .collect())
    }

    async fn insert_one(&self, data: Document) -> Result<Document, StorageError> {
        let doc = self.prepare(data)?;
        let id = document_id(&doc).unwrap_or_default().to_string();

        let mut documents = self.write()?;
        if documents.iter().any(|d| document_id(d) == Some(id.as_str())) {
            return Err(self.duplicate(&id));
        }
        documents.push(doc.clone());
        trace!(collection = self.name, id = %id, "insert_one");

        Ok(doc)
    }

    async fn insert_many(&self, data: Vec<Document>) -> Result<Vec<Document>, StorageError> {
        let prepared = data
            .into_iter()
            .map(|doc| self.prepare(doc))
            .collect::<Result<Vec<_>, _>>()?;

        let mut documents = self.write()?;
        let mut seen: HashSet<String> = documents
            .iter()
            .filter_map(|d| document_id(d).map(str::to_string))
            .collect();
        for doc in &prepared {
            let id = document_id(doc).unwrap_or_default();
            if !seen.insert(id.to_string()) {
                return Err(self.duplicate(id));
            }
        }

        documents.extend(prepared.iter().cloned());
        trace!(collection = self.name, inserted = prepared.len(), "insert_many");
        Ok(prepared)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        let id = canonical_id(id);
        let mut documents = self.write()?;
        let before = documents.len();
        documents.retain(|doc| document_id(doc) != Some(id.as_str()));
        trace!(collection = self.name, id = %id, deleted = before - documents.len(), "delete_by_id");
        Ok(())
    }

    async fn delete_many(&self, mut filter: Value) -> Result<u64, StorageError> {
        canonical_ids(&mut filter);
        let mut documents = self.write()?;
        let hits = documents
            .iter()
            .map(|doc| matches(&filter, doc))
            .collect::<Result<Vec<_>, _>>()?;

        let before = documents.len();
        let mut hits = hits.into_iter();
        documents.retain(|_| !hits.next().unwrap_or(false));
        let deleted = (before - documents.len()) as u64;
        trace!(collection = self.name, deleted, "delete_many");

        Ok(deleted)
    }

    async fn count(&self, mut filter: Value) -> Result<u64, StorageError> {
        canonical_ids(&mut filter);
        let documents = self.read()?;
        let mut count = 0;
        for doc in documents.iter() {
            if matches(&filter, doc)? {
                count += 1;
            }
        }
        Ok(count)
    }
}
