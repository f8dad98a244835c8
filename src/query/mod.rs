//! Query - Filter, projection, sort and pagination composed into one request.
//!
//! Repositories translate caller-facing [`FindOptions`] into a [`Query`] that a
//! collection handle executes in a single round-trip.
//!
//! ## Example
//!
//! ```ignore
//! use docrepo::{FindOptions, Projection, Sort};
//!
//! let options = FindOptions::new()
//!     .limit(2)
//!     .page(3)
//!     .sort(Sort::new().asc("name"))
//!     .projection(Projection::new().include("name"));
//! let users = repo.find(json!({ "role": "admin" }), options).await?;
//! ```

mod projection;
mod sort;

pub use projection::Projection;
pub use sort::{Sort, SortOrder};

/// A single executable query against one collection.
///
/// `limit == 0` means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F> {
    pub filter: F,
    pub projection: Option<Projection>,
    pub sort: Option<Sort>,
    pub skip: u64,
    pub limit: u64,
}

impl<F> Query<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            projection: None,
            sort: None,
            skip: 0,
            limit: 0,
        }
    }

    pub fn project(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection.filter(|p| !p.is_empty());
        self
    }

    pub fn sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort.filter(|s| !s.is_empty());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Applies skip then limit for the given page.
    pub fn paginate(self, pagination: Pagination) -> Self {
        let skip = pagination.skip();
        self.skip(skip).limit(pagination.limit)
    }
}

/// A (limit, page) pair. Pages are 1-based; `page <= 0` disables skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub page: i64,
}

impl Pagination {
    pub fn new(limit: u64, page: i64) -> Self {
        Self { limit, page }
    }

    /// Number of records to skip: `limit * (page - 1)` for positive pages.
    pub fn skip(&self) -> u64 {
        if self.page > 0 {
            self.limit.saturating_mul(self.page as u64 - 1)
        } else {
            0
        }
    }
}

/// Caller-facing options for listing and finding.
///
/// Every field is independently optional; unset fields fall back to the
/// repository's configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub limit: Option<u64>,
    pub page: Option<i64>,
    pub sort: Option<Sort>,
    pub projection: Option<Projection>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Resolves pagination against defaults, clamping the limit to `max_limit`.
    pub fn pagination(&self, defaults: Pagination, max_limit: Option<u64>) -> Pagination {
        let mut limit = self.limit.unwrap_or(defaults.limit);
        if let Some(max) = max_limit {
            if limit == 0 || limit > max {
                limit = max;
            }
        }
        Pagination::new(limit, self.page.unwrap_or(defaults.page))
    }

    /// Builds the query for `filter`. Sort is applied before skip and limit.
    pub fn into_query<F>(self, filter: F, defaults: Pagination, max_limit: Option<u64>) -> Query<F> {
        let pagination = self.pagination(defaults, max_limit);
        Query::new(filter)
            .project(self.projection)
            .sort(self.sort)
            .paginate(pagination)
    }
}
