//! Entity - The stored shape of a record.
//!
//! An entity describes what a storage engine persists for one collection.
//! Repositories never hold entities themselves; they hand plain documents to
//! the collection handle and map what comes back into result records.
//!
//! ## Example
//!
//! ```ignore
//! use docrepo::Entity;
//!
//! #[derive(Serialize, Deserialize, Entity)]
//! #[entity(collection = "users")]
//! struct User {
//!     #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//!     #[entity(default = "member")]
//!     #[serde(default)]
//!     pub role: String,
//! }
//! ```

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Engine-neutral document: an ordered JSON object.
pub type Document = Map<String, Value>;

/// Name of the identifier field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// Trait for types that can be persisted in a document collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection name for this entity type (e.g., "users", "orders").
    /// Maps to a collection in MongoDB, a table in SQL, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Schema defaults filled in by the engine for fields missing on insert.
    fn defaults() -> Document {
        Document::new()
    }
}

/// Returns the identifier of a stored document, if it has a string `_id`.
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}
