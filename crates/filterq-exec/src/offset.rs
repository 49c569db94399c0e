//! Offset pagination: a `(page - 1) * limit` window plus an unwindowed count.

use filterq_core::page::{OffsetPage, OffsetRequest};
use filterq_io::{DocumentStore, FindOptions, RelationalQuery};
use filterq_operators::WhereBuilder;
use filterq_planner::RelationalContext;

use crate::filters::{document_filter, filtered_query};
use crate::paginator::Paginator;

impl Paginator {
    /// One page of a document collection.
    ///
    /// Out-of-range `page`/`limit` are clamped; a page past the end comes
    /// back with an empty list and `has_next == false`.
    pub async fn paginate_documents_by_offset<S: DocumentStore>(
        &self,
        store: &S,
        req: &OffsetRequest,
    ) -> Result<OffsetPage, S::Error> {
        let limit = self.cfg.resolve_limit(req.limit);
        let page = req.effective_page();
        let filter = document_filter(&self.cfg, &req.filter);
        let options = FindOptions::new()
            .sort(req.sort_field.clone(), req.direction)
            .skip(OffsetPage::skip_for(page, limit))
            .limit(limit);

        let (list, total) = tokio::try_join!(
            store.find(&filter, &options),
            store.count_documents(&filter)
        )?;

        let out = OffsetPage::assemble(list, total, page, limit);
        log_page("document", req, &out, limit);
        Ok(out)
    }

    /// One page of a relational query. `base` is cloned, never modified.
    pub async fn paginate_table_by_offset<Q: RelationalQuery>(
        &self,
        base: &Q,
        req: &OffsetRequest,
        ctx: &RelationalContext,
    ) -> Result<OffsetPage, Q::Error> {
        let limit = self.cfg.resolve_limit(req.limit);
        let page = req.effective_page();
        let filtered = filtered_query(base, &req.filter, ctx);
        let column = ctx.qualified_key(&req.sort_field, filtered.table_name());

        let mut windowed = filtered.clone();
        windowed
            .order_by(&column, req.direction)
            .limit(limit)
            .offset(OffsetPage::skip_for(page, limit));

        let (list, total) = tokio::try_join!(windowed.fetch(), filtered.count())?;

        let out = OffsetPage::assemble(list, total, page, limit);
        log_page("relational", req, &out, limit);
        Ok(out)
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_page(backend: &str, req: &OffsetRequest, page: &OffsetPage, limit: u64) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        strategy = "offset",
        backend,
        sort_field = %req.sort_field,
        limit,
        page = page.current_page,
        total = page.total_count,
        rows = page.list.len(),
        "page assembled"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use filterq_core::config::PaginationConfig;
    use filterq_core::page::Row;
    use filterq_core::sort::Direction;
    use filterq_core::value::Value;
    use filterq_io::{MemoryCollection, MemoryTable};
    use serde_json::json;

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .filter_map(|i| Value::from(json!({"id": i, "even": i % 2 == 0})).as_map().cloned())
            .collect()
    }

    fn ids(page: &OffsetPage) -> Vec<i64> {
        page.list.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[tokio::test]
    async fn test_document_offset_window_and_flags() {
        let coll = MemoryCollection::with_documents(rows(12));
        let p = Paginator::default();
        let req = OffsetRequest::new(Value::empty_map(), "id").page(2).limit(5);
        let page = p.paginate_documents_by_offset(&coll, &req).await.unwrap();
        assert_eq!(ids(&page), vec![6, 7, 8, 9, 10]);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next && page.has_previous);
    }

    #[tokio::test]
    async fn test_table_offset_descending_with_filter() {
        let table = MemoryTable::new("items").with_rows(rows(12));
        let p = Paginator::default();
        let req = OffsetRequest::new(Value::from(json!({"even": true})), "id")
            .direction(Direction::Desc)
            .limit(4);
        let page = p
            .paginate_table_by_offset(&table.query(), &req, &RelationalContext::new())
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![12, 10, 8, 6]);
        assert_eq!(page.total_count, 6);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_next);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn test_missing_limit_uses_configured_default() {
        let coll = MemoryCollection::with_documents(rows(12));
        let p = Paginator::new(PaginationConfig {
            default_limit: 10,
            ..PaginationConfig::default()
        });
        let req = OffsetRequest::new(Value::empty_map(), "id");
        let page = p.paginate_documents_by_offset(&coll, &req).await.unwrap();
        assert_eq!(page.list.len(), 10);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_zero_limit_and_page_are_clamped() {
        let coll = MemoryCollection::with_documents(rows(3));
        let req = OffsetRequest::new(Value::empty_map(), "id").page(0).limit(0);
        let page = Paginator::default()
            .paginate_documents_by_offset(&coll, &req)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![1]);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_store_error_surfaces_unchanged() {
        let table = MemoryTable::new("items").with_rows(rows(3));
        table.fail_with("timeout");
        let req = OffsetRequest::new(Value::empty_map(), "id");
        let err = Paginator::default()
            .paginate_table_by_offset(&table.query(), &req, &RelationalContext::new())
            .await
            .unwrap_err();
        assert_eq!(err, filterq_io::StoreError::Backend("timeout".into()));
    }
}
