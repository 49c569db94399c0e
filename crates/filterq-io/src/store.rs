//! Collaborator traits for the two backends.
//!
//! Pagination is generic over these and returns `Self::Error` untouched.

use async_trait::async_trait;

use filterq_core::page::Row;
use filterq_core::sort::Direction;
use filterq_core::value::Value;
use filterq_operators::WhereBuilder;

/// Sort/skip/limit options of a document `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Applied left to right; later keys break ties of earlier ones.
    pub sort: Vec<(String, Direction)>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = n;
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
}

/// A document collection (`find` + `countDocuments`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Documents matching a compiled (`$`-prefixed) filter.
    async fn find(&self, filter: &Value, options: &FindOptions) -> Result<Vec<Row>, Self::Error>;

    async fn count_documents(&self, filter: &Value) -> Result<u64, Self::Error>;
}

/// A cloneable relational query builder.
///
/// Predicates come from `WhereBuilder`; this adds the windowing and the
/// two terminal round trips. `count` ignores order, limit and offset.
#[async_trait]
pub trait RelationalQuery: WhereBuilder + Clone + Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn order_by(&mut self, column: &str, direction: Direction) -> &mut Self;

    fn limit(&mut self, n: u64) -> &mut Self;

    fn offset(&mut self, n: u64) -> &mut Self;

    async fn fetch(&self) -> Result<Vec<Row>, Self::Error>;

    async fn count(&self) -> Result<u64, Self::Error>;
}
