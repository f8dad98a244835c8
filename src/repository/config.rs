use serde::{Deserialize, Serialize};

use crate::query::Pagination;

/// What `remove_many` does beyond deleting the listed ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveManyPolicy {
    /// Delete the listed ids. An empty list deletes every record in the collection.
    #[default]
    Guarded,
    /// Delete the listed ids, then delete every record in the collection,
    /// whatever the list contained.
    Unconditional,
}

impl RemoveManyPolicy {
    /// Whether the whole collection is wiped for a call with `targeted` ids.
    pub fn wipes(self, targeted: bool) -> bool {
        match self {
            RemoveManyPolicy::Guarded => !targeted,
            RemoveManyPolicy::Unconditional => true,
        }
    }
}

/// Repository tuning. Every field has a default, so partial configs deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Page size for `get_all` when the caller gives none.
    pub list_limit: u64,
    /// Page for `get_all` when the caller gives none.
    pub list_page: i64,
    /// Page size for `find` when the caller gives none.
    pub find_limit: u64,
    /// Page for `find` when the caller gives none.
    pub find_page: i64,
    /// Upper bound on any page size, including unbounded (`0`) requests.
    pub max_limit: Option<u64>,
    pub remove_many: RemoveManyPolicy,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            list_limit: 20,
            list_page: 1,
            find_limit: 10,
            find_page: 0,
            max_limit: None,
            remove_many: RemoveManyPolicy::Guarded,
        }
    }
}

impl RepositoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_defaults(mut self, limit: u64, page: i64) -> Self {
        self.list_limit = limit;
        self.list_page = page;
        self
    }

    pub fn with_find_defaults(mut self, limit: u64, page: i64) -> Self {
        self.find_limit = limit;
        self.find_page = page;
        self
    }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    pub fn with_remove_many(mut self, policy: RemoveManyPolicy) -> Self {
        self.remove_many = policy;
        self
    }

    pub fn list_defaults(&self) -> Pagination {
        Pagination::new(self.list_limit, self.list_page)
    }

    pub fn find_defaults(&self) -> Pagination {
        Pagination::new(self.find_limit, self.find_page)
    }
}
