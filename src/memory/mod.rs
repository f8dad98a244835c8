//! In-memory document engine.
//!
//! Mirrors the semantics a MongoDB-backed collection handle would have:
//! hex object ids, a `__v` version key, schema defaults, Mongo-style JSON
//! filters, inclusion/exclusion projections and multi-key sorts. Useful for
//! tests and for running services without a database.

mod filter;
mod object_id;
mod projection;
mod store;
mod value;

pub use object_id::{InvalidObjectId, ObjectId};
pub use store::{InMemoryCollection, InMemoryStore, VERSION_FIELD};
