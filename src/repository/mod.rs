mod config;
mod generic;
mod repository;

pub use config::{RemoveManyPolicy, RepositoryConfig};
pub use generic::GenericRepository;
pub use repository::{to_payload, FilterOf, Repository};
