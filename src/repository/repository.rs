use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::RepositoryConfig;
use crate::collection::{Collection, FilterExpr};
use crate::entity::{Document, Entity, ID_FIELD};
use crate::error::{RepositoryError, Result};
use crate::query::{FindOptions, Projection};

/// Filter type of a repository's collection handle.
pub type FilterOf<R> = <<R as Repository>::Handle as Collection<<R as Repository>::Entity>>::Filter;

/// CRUD and query contract over one collection.
///
/// Every operation is provided on top of [`Repository::collection`] except
/// `create_many`, whose provided body only reports `NotImplemented`.
/// Repositories that support bulk creation override it.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Stored shape.
    type Entity: Entity;
    /// Plain-data shape returned to callers.
    type Record: DeserializeOwned + Send + 'static;
    /// Storage handle the repository is bound to.
    type Handle: Collection<Self::Entity>;

    fn collection(&self) -> &Self::Handle;

    fn config(&self) -> &RepositoryConfig;

    /// Rejects empty or malformed identifiers before they reach storage.
    fn validate_id(&self, id: &str) -> Result<()> {
        if id.is_empty() || !self.collection().is_valid_id(id) {
            return Err(RepositoryError::invalid_id(id));
        }
        Ok(())
    }

    /// Maps an engine document to a result record, dropping engine bookkeeping fields.
    fn to_record(&self, mut doc: Document) -> Result<Self::Record> {
        for field in self.collection().internal_fields() {
            doc.remove(*field);
        }
        serde_json::from_value(Value::Object(doc)).map_err(|e| RepositoryError::Decode {
            collection: self.collection().name().to_string(),
            message: e.to_string(),
        })
    }

    fn to_records(&self, docs: Vec<Document>) -> Result<Vec<Self::Record>> {
        docs.into_iter().map(|doc| self.to_record(doc)).collect()
    }

    /// Get one record by id. `Ok(None)` when nothing matches.
    /// An empty projection is treated as no projection.
    async fn get(&self, id: &str, projection: Option<&Projection>) -> Result<Option<Self::Record>> {
        self.validate_id(id)?;
        let projection = projection.filter(|p| !p.is_empty());
        debug!(collection = self.collection().name(), id, "get");

        let doc = self.collection().find_by_id(id, projection).await?;
        doc.map(|doc| self.to_record(doc)).transpose()
    }

    /// List records. Defaults to the first page of 20.
    async fn get_all(&self, options: FindOptions) -> Result<Vec<Self::Record>> {
        let config = self.config();
        let filter = <<Self::Handle as Collection<Self::Entity>>::Filter>::match_all();
        let query = options.into_query(filter, config.list_defaults(), config.max_limit);
        debug!(
            collection = self.collection().name(),
            skip = query.skip,
            limit = query.limit,
            "get_all"
        );

        let docs = self.collection().find(query).await?;
        self.to_records(docs)
    }

    /// Find records matching `filter`. Defaults to 10 records with no skip.
    async fn find(
        &self,
        filter: <Self::Handle as Collection<Self::Entity>>::Filter,
        options: FindOptions,
    ) -> Result<Vec<Self::Record>> {
        let config = self.config();
        let query = options.into_query(filter, config.find_defaults(), config.max_limit);
        debug!(
            collection = self.collection().name(),
            skip = query.skip,
            limit = query.limit,
            "find"
        );

        let docs = self.collection().find(query).await?;
        self.to_records(docs)
    }

    /// Insert one record and return it as stored.
    async fn create<D>(&self, data: &D) -> Result<Self::Record>
    where
        D: Serialize + Sync + ?Sized,
    {
        let doc = to_payload(data)?;
        debug!(collection = self.collection().name(), fields = doc.len(), "create");

        let stored = self.collection().insert_one(doc).await?;
        self.to_record(stored)
    }

    /// Insert several records in one request.
    ///
    /// Not provided by the base contract; always fails with `NotImplemented`
    /// unless overridden.
    async fn create_many<D>(&self, data: &[D]) -> Result<Vec<Self::Record>>
    where
        D: Serialize + Sync,
    {
        let _ = data;
        Err(RepositoryError::NotImplemented("create_many"))
    }

    /// Delete one record by id. Deleting a missing id is a no-op.
    async fn remove(&self, id: &str) -> Result<()> {
        self.validate_id(id)?;
        debug!(collection = self.collection().name(), id, "remove");

        self.collection().delete_by_id(id).await?;
        Ok(())
    }

    /// Delete records by id, then apply the configured [`RemoveManyPolicy`].
    ///
    /// Under `Guarded` an empty `ids` deletes the entire collection. Under
    /// `Unconditional` the entire collection is deleted on every call.
    ///
    /// [`RemoveManyPolicy`]: super::RemoveManyPolicy
    async fn remove_many<S>(&self, ids: &[S]) -> Result<()>
    where
        S: AsRef<str> + Sync,
    {
        let ids = ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                self.validate_id(id).map(|_| id.to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        let targeted = !ids.is_empty();
        if targeted {
            let filter = <<Self::Handle as Collection<Self::Entity>>::Filter>::id_in(&ids);
            let deleted = self.collection().delete_many(filter).await?;
            debug!(
                collection = self.collection().name(),
                requested = ids.len(),
                deleted,
                "remove_many"
            );
        }

        if self.config().remove_many.wipes(targeted) {
            let filter = <<Self::Handle as Collection<Self::Entity>>::Filter>::match_all();
            let deleted = self.collection().delete_many(filter).await?;
            warn!(
                collection = self.collection().name(),
                policy = ?self.config().remove_many,
                deleted,
                "remove_many wiped collection"
            );
        }

        Ok(())
    }

    /// Number of records matching `filter`.
    async fn count(
        &self,
        filter: <Self::Handle as Collection<Self::Entity>>::Filter,
    ) -> Result<u64> {
        Ok(self.collection().count(filter).await?)
    }

    /// Whether a record with `id` exists.
    async fn exists(&self, id: &str) -> Result<bool> {
        self.validate_id(id)?;
        let projection = Projection::new().include(ID_FIELD);
        let doc = self.collection().find_by_id(id, Some(&projection)).await?;
        Ok(doc.is_some())
    }
}

/// Converts a create payload into a document.
///
/// Null, non-object and field-less payloads are rejected.
pub fn to_payload<D>(data: &D) -> Result<Document>
where
    D: Serialize + ?Sized,
{
    let value = serde_json::to_value(data)
        .map_err(|e| RepositoryError::InvalidArgument(format!("unserializable payload: {}", e)))?;

    match value {
        Value::Object(doc) if !doc.is_empty() => Ok(doc),
        Value::Object(_) | Value::Null => Err(RepositoryError::InvalidArgument(
            "create payload is empty".into(),
        )),
        other => Err(RepositoryError::InvalidArgument(format!(
            "create payload must be a document, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
