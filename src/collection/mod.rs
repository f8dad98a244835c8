//! Collection - The storage-collection handle a repository is bound to.
//!
//! A handle exposes the raw primitives of one collection in one storage engine:
//! point lookup, a filtered/sorted/paginated scan, inserts, point and bulk
//! deletes, and identifier-format validation. Repositories are generic over
//! any implementation, so a document store, a relational table or a KV store
//! with a secondary index can all sit underneath.

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::entity::{Document, Entity};
use crate::query::{Projection, Query};

/// Error type for storage engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Engine could not be reached or its state is unusable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A document with this identifier already exists.
    #[error("duplicate key {id} in collection {collection}")]
    DuplicateKey { collection: String, id: String },
    /// Document rejected by the collection's schema.
    #[error("document rejected by {collection}: {reason}")]
    Validation { collection: String, reason: String },
    /// Filter expression the engine cannot evaluate.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    /// Projection the engine cannot apply.
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    /// Serialization/deserialization error inside the engine.
    #[error("storage serialization error: {0}")]
    Serde(String),
}

/// Filter expressions a repository needs to build on its own.
///
/// Everything else about a filter is opaque and passed through unmodified.
pub trait FilterExpr: Sized {
    /// A filter matching every record in the collection.
    fn match_all() -> Self;

    /// A filter matching records whose identifier is in `ids`.
    fn id_in(ids: &[String]) -> Self;
}

/// Mongo-style JSON filters: `{}` matches all, `{"_id": {"$in": [...]}}` a set.
impl FilterExpr for Value {
    fn match_all() -> Self {
        Value::Object(Document::new())
    }

    fn id_in(ids: &[String]) -> Self {
        json!({ "_id": { "$in": ids } })
    }
}

/// Raw CRUD primitives for one collection of `T`.
#[async_trait]
pub trait Collection<T: Entity>: Send + Sync {
    /// Engine-specific filter expression.
    type Filter: FilterExpr + Send + Sync + 'static;

    /// Collection name, used for logging.
    fn name(&self) -> &str {
        T::COLLECTION
    }

    /// Whether `id` is in the engine's identifier format.
    fn is_valid_id(&self, id: &str) -> bool;

    /// Engine bookkeeping fields to strip before documents reach callers.
    fn internal_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Fetch one document by identifier. Returns None if not found.
    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, StorageError>;

    /// Execute a query in one request and materialize the results in order.
    async fn find(&self, query: Query<Self::Filter>) -> Result<Vec<Document>, StorageError>;

    /// Insert one document, returning it as stored (with engine-assigned fields).
    async fn insert_one(&self, data: Document) -> Result<Document, StorageError>;

    /// Insert several documents in one request.
    async fn insert_many(&self, data: Vec<Document>) -> Result<Vec<Document>, StorageError>;

    /// Delete one document by identifier. Missing documents are not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError>;

    /// Delete every document matching `filter`. Returns the number deleted.
    async fn delete_many(&self, filter: Self::Filter) -> Result<u64, StorageError>;

    /// Count documents matching `filter`.
    async fn count(&self, filter: Self::Filter) -> Result<u64, StorageError>;
}
