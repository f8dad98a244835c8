use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::{Repository, RepositoryConfig};
use crate::collection::Collection;
use crate::entity::Entity;

/// Repository over any collection handle, storing `T` and returning `K`.
///
/// Holds nothing but the handle and its configuration, both fixed at
/// construction. Uses the provided `create_many`, which reports
/// `NotImplemented`.
pub struct GenericRepository<T, K, H> {
    collection: H,
    config: RepositoryConfig,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T, K, H> GenericRepository<T, K, H>
where
    T: Entity,
    K: DeserializeOwned + Send + 'static,
    H: Collection<T>,
{
    pub fn new(collection: H) -> Self {
        Self::with_config(collection, RepositoryConfig::default())
    }

    pub fn with_config(collection: H, config: RepositoryConfig) -> Self {
        Self {
            collection,
            config,
            _marker: PhantomData,
        }
    }
}

impl<T, K, H> Repository for GenericRepository<T, K, H>
where
    T: Entity,
    K: DeserializeOwned + Send + 'static,
    H: Collection<T>,
{
    type Entity = T;
    type Record = K;
    type Handle = H;

    fn collection(&self) -> &H {
        &self.collection
    }

    fn config(&self) -> &RepositoryConfig {
        &self.config
    }
}

impl<T, K, H: Clone> Clone for GenericRepository<T, K, H> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, K, H> fmt::Debug for GenericRepository<T, K, H>
where
    T: Entity,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRepository")
            .field("collection", &T::COLLECTION)
            .field("config", &self.config)
            .finish()
    }
}
