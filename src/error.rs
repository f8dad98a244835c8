use thiserror::Error;

use crate::collection::StorageError;

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors surfaced by repository operations.
///
/// Absence is never an error: a missing record on read is `Ok(None)` and a
/// missing record on delete is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Malformed or missing identifier, or an empty create payload.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation the base repository declares but does not provide.
    #[error("{0} is not implemented for this repository")]
    NotImplemented(&'static str),

    /// Failure reported by the storage engine, passed through untouched.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A stored document could not be mapped into the result record type.
    #[error("failed to decode {collection} document: {message}")]
    Decode { collection: String, message: String },
}

impl RepositoryError {
    pub(crate) fn invalid_id(id: &str) -> Self {
        if id.is_empty() {
            RepositoryError::InvalidArgument("id must not be empty".into())
        } else {
            RepositoryError::InvalidArgument(format!("malformed id: {:?}", id))
        }
    }
}
