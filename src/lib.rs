mod collection;
mod entity;
mod error;
mod query;
mod repository;

#[cfg(feature = "memory")]
pub mod memory;

pub use collection::{Collection, FilterExpr, StorageError};
pub use entity::{document_id, Document, Entity, ID_FIELD};
pub use error::{RepositoryError, Result};
pub use query::{FindOptions, Pagination, Projection, Query, Sort, SortOrder};
pub use repository::{
    to_payload, FilterOf, GenericRepository, RemoveManyPolicy, Repository, RepositoryConfig,
};

#[cfg(feature = "memory")]
pub use memory::{InMemoryCollection, InMemoryStore, ObjectId};

// Re-export the derive macro alongside the trait it implements
#[cfg(feature = "derive")]
pub use docrepo_macros::Entity;

// Re-export async_trait so repositories overriding create_many need no extra dependency
pub use async_trait::async_trait;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
