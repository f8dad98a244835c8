//! Collection handle wrapper that records storage calls and can inject failures.

use std::sync::{Arc, Mutex};

use docrepo::{async_trait, Collection, Document, Entity, Projection, Query, Sort, StorageError};

/// What a `find` call asked the engine for, minus the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryShape {
    pub skip: u64,
    pub limit: u64,
    pub sort: Option<Sort>,
    pub projection: Option<Projection>,
}

#[derive(Default)]
struct Log {
    calls: Vec<&'static str>,
    queries: Vec<QueryShape>,
    fail_next: Option<StorageError>,
}

/// Wraps a handle, logging every storage operation it forwards.
#[derive(Clone)]
pub struct RecordingCollection<H> {
    inner: H,
    log: Arc<Mutex<Log>>,
}

impl<H> RecordingCollection<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            log: Arc::new(Mutex::new(Log::default())),
        }
    }

    /// Storage operations forwarded so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn queries(&self) -> Vec<QueryShape> {
        self.log.lock().unwrap().queries.clone()
    }

    pub fn clear(&self) {
        let mut log = self.log.lock().unwrap();
        log.calls.clear();
        log.queries.clear();
    }

    /// The next storage operation fails with `err` instead of reaching the engine.
    pub fn fail_next(&self, err: StorageError) {
        self.log.lock().unwrap().fail_next = Some(err);
    }

    fn record(&self, call: &'static str) -> Result<(), StorageError> {
        let mut log = self.log.lock().unwrap();
        log.calls.push(call);
        match log.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T, H> Collection<T> for RecordingCollection<H>
where
    T: Entity,
    H: Collection<T>,
{
    type Filter = H::Filter;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_valid_id(&self, id: &str) -> bool {
        self.inner.is_valid_id(id)
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        self.inner.internal_fields()
    }

    async fn find_by_id(
        &self,
        id: &str,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, StorageError> {
        self.record("find_by_id")?;
        self.inner.find_by_id(id, projection).await
    }

    async fn find(&self, query: Query<Self::Filter>) -> Result<Vec<Document>, StorageError> {
        self.log.lock().unwrap().queries.push(QueryShape {
            skip: query.skip,
            limit: query.limit,
            sort: query.sort.clone(),
            projection: query.projection.clone(),
        });
        self.record("find")?;
        self.inner.find(query).await
    }

    async fn insert_one(&self, data: Document) -> Result<Document, StorageError> {
        self.record("insert_one")?;
        self.inner.insert_one(data).await
    }

    async fn insert_many(&self, data: Vec<Document>) -> Result<Vec<Document>, StorageError> {
        self.record("insert_many")?;
        self.inner.insert_many(data).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StorageError> {
        self.record("delete_by_id")?;
        self.inner.delete_by_id(id).await
    }

    async fn delete_many(&self, filter: Self::Filter) -> Result<u64, StorageError> {
        self.record("delete_many")?;
        self.inner.delete_many(filter).await
    }

    async fn count(&self, filter: Self::Filter) -> Result<u64, StorageError> {
        self.record("count")?;
        self.inner.count(filter).await
    }
}
