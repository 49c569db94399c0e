//! In-memory document collection.
//!
//! Clones share the same documents, so a test can keep a handle, seed it,
//! and pass another to the paginator.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use filterq_core::page::Row;
use filterq_core::sort::Direction;
use filterq_core::value::Value;

use crate::error::{Result, StoreError};
use crate::matcher::{lookup, matches};
use crate::store::{DocumentStore, FindOptions};

/// Thread-safe document collection evaluating compiled `$`-filters.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    docs: Arc<RwLock<Vec<Row>>>,
    failure: Arc<RwLock<Option<StoreError>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: impl IntoIterator<Item = Row>) -> Self {
        let collection = Self::new();
        for doc in docs {
            collection.insert(doc);
        }
        collection
    }

    pub fn insert(&self, doc: Row) {
        let mut docs = self.docs.write().unwrap_or_else(PoisonError::into_inner);
        docs.push(doc);
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent call fail with `StoreError::Backend(msg)`.
    pub fn fail_with(&self, msg: impl Into<String>) {
        let mut failure = self.failure.write().unwrap_or_else(PoisonError::into_inner);
        *failure = Some(StoreError::Backend(msg.into()));
    }

    pub fn clear_failure(&self) {
        let mut failure = self.failure.write().unwrap_or_else(PoisonError::into_inner);
        *failure = None;
    }

    fn check_failure(&self) -> Result<()> {
        let failure = self.failure.read().unwrap_or_else(PoisonError::into_inner);
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn matching(&self, filter: &Value) -> Result<Vec<Row>> {
        self.check_failure()?;
        let docs = self.docs.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        for doc in docs.iter() {
            if matches(doc, filter)? {
                out.push(doc.clone());
            }
        }
        Ok(out)
    }
}

/// Compare two documents under a multi-key sort; missing fields sort as `null`.
pub(crate) fn compare_rows(a: &Row, b: &Row, sort: &[(String, Direction)]) -> Ordering {
    for (field, direction) in sort {
        let left = lookup(a, field).unwrap_or(&Value::Null);
        let right = lookup(b, field).unwrap_or(&Value::Null);
        let ord = match direction {
            Direction::Asc => left.compare(right),
            Direction::Desc => right.compare(left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl DocumentStore for MemoryCollection {
    type Error = StoreError;

    async fn find(&self, filter: &Value, options: &FindOptions) -> Result<Vec<Row>> {
        let mut rows = self.matching(filter)?;
        rows.sort_by(|a, b| compare_rows(a, b, &options.sort));

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let take = options
            .limit
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    async fn count_documents(&self, filter: &Value) -> Result<u64> {
        Ok(self.matching(filter)?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(j: serde_json::Value) -> Row {
        match Value::from(j) {
            Value::Map(m) => m,
            other => panic!("not a document: {other:?}"),
        }
    }

    fn seeded() -> MemoryCollection {
        MemoryCollection::with_documents((1..=6).map(|i| {
            let group = if i % 2 == 0 { "even" } else { "odd" };
            row(json!({"id": i, "group": group}))
        }))
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_windows() {
        let coll = seeded();
        let filter = Value::from(json!({"group": {"$eq": "even"}}));
        let opts = FindOptions::new().sort("id", Direction::Desc).skip(1).limit(1);
        let rows = coll.find(&filter, &opts).await.unwrap();
        assert_eq!(ids(&rows), vec![4]);
        assert_eq!(coll.count_documents(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_without_options_keeps_insertion_order() {
        let coll = seeded();
        let rows = coll.find(&Value::empty_map(), &FindOptions::new()).await.unwrap();
        assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let coll = seeded();
        let handle = coll.clone();
        handle.fail_with("connection reset");

        let err = coll.count_documents(&Value::empty_map()).await.unwrap_err();
        assert_eq!(err, StoreError::Backend("connection reset".into()));

        handle.clear_failure();
        assert_eq!(coll.count_documents(&Value::empty_map()).await.unwrap(), 6);
    }

    #[test]
    fn test_clones_share_documents() {
        let coll = MemoryCollection::new();
        let other = coll.clone();
        other.insert(row(json!({"id": 1})));
        assert_eq!(coll.len(), 1);
        assert!(!coll.is_empty());
    }
}
