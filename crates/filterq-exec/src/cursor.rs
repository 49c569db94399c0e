//! Cursor pagination.
//!
//! A cursor is the sort field's value on a boundary row, handed back
//! verbatim. The list query adds a strict bound on that value; two probes
//! against the caller's filter (without the bound) decide whether rows
//! exist before the first and after the last row of the page.
//!
//! `Towards::Previous` walks backwards: reversed bound, reversed sort, then
//! the fetched rows are flipped back into declared order.
//!
//! A date cursor echoed through JSON comes back as an ISO string. The
//! document paginator casts it back only when the collection stores that
//! field as dates; string sort keys get the cursor exactly as handed out.

use filterq_core::op::Op;
use filterq_core::page::{CursorPage, CursorRequest, Row, Towards};
use filterq_core::sort::{Direction, SortOrder};
use filterq_core::value::{Map, Value};
use filterq_io::{DocumentStore, FindOptions, RelationalQuery};
use filterq_operators::document::symbol;
use filterq_operators::WhereBuilder;
use filterq_planner::{cast_iso_strings_to_dates, RelationalContext};

use crate::bounds::{conjoin, document_bound, relational_bound, Side};
use crate::filters::{document_filter, filtered_query, sort_value};
use crate::paginator::Paginator;

impl Paginator {
    pub async fn paginate_documents_by_cursor<S: DocumentStore>(
        &self,
        store: &S,
        req: &CursorRequest,
    ) -> Result<CursorPage, S::Error> {
        let limit = self.cfg.resolve_limit(req.limit);
        let field = req.sort_field.as_str();
        let base = document_filter(&self.cfg, &req.filter);

        let list_filter = match &req.cursor {
            Some(cursor) => {
                let cursor = self.document_cursor(store, &base, field, cursor).await?;
                document_bound(&base, field, Side::for_cursor(req.direction, req.towards), cursor)
            }
            None => base.clone(),
        };
        let options = FindOptions::new()
            .sort(field, fetch_direction(req))
            .limit(limit);

        let (mut list, total) = tokio::try_join!(
            store.find(&list_filter, &options),
            store.count_documents(&base)
        )?;
        if req.towards == Towards::Previous {
            list.reverse();
        }

        let (first, last) = boundaries(&list, field);
        let (has_before, has_after) = tokio::try_join!(
            document_probe(store, &base, field, Side::before(req.direction), first.as_ref()),
            document_probe(store, &base, field, Side::after(req.direction), last.as_ref()),
        )?;

        let page = assemble(list, total, req, first.filter(|_| has_before), last.filter(|_| has_after));
        log_page("document", req, &page, limit);
        Ok(page)
    }

    /// Cursor page of a relational query. `base` is cloned, never modified.
    pub async fn paginate_table_by_cursor<Q: RelationalQuery>(
        &self,
        base: &Q,
        req: &CursorRequest,
        ctx: &RelationalContext,
    ) -> Result<CursorPage, Q::Error> {
        let limit = self.cfg.resolve_limit(req.limit);
        let filtered = filtered_query(base, &req.filter, ctx);
        let column = ctx.qualified_key(&req.sort_field, filtered.table_name());
        // rows come back keyed by stored column name
        let row_key = ctx.column_name(&req.sort_field);

        let mut windowed = filtered.clone();
        if let Some(cursor) = &req.cursor {
            relational_bound(
                &mut windowed,
                &column,
                Side::for_cursor(req.direction, req.towards),
                cursor.clone(),
            );
        }
        windowed.order_by(&column, fetch_direction(req)).limit(limit);

        let (mut list, total) = tokio::try_join!(windowed.fetch(), filtered.count())?;
        if req.towards == Towards::Previous {
            list.reverse();
        }

        let (first, last) = boundaries(&list, &row_key);
        let (has_before, has_after) = tokio::try_join!(
            relational_probe(&filtered, &column, Side::before(req.direction), first.as_ref()),
            relational_probe(&filtered, &column, Side::after(req.direction), last.as_ref()),
        )?;

        let page = assemble(list, total, req, first.filter(|_| has_before), last.filter(|_| has_after));
        log_page("relational", req, &page, limit);
        Ok(page)
    }

    /// The cursor as the list bound should compare it.
    async fn document_cursor<S: DocumentStore>(
        &self,
        store: &S,
        base: &Value,
        field: &str,
        cursor: &Value,
    ) -> Result<Value, S::Error> {
        if !self.cfg.cast_dates {
            return Ok(cursor.clone());
        }
        let cast = cast_iso_strings_to_dates(cursor);
        if cast == *cursor {
            return Ok(cast);
        }

        let mut exists = Map::new();
        exists.insert(
            symbol(Op::Exists).unwrap_or("$exists").to_string(),
            Value::Bool(true),
        );
        let mut clause = Map::new();
        clause.insert(field.to_string(), Value::Map(exists));
        let sample = store
            .find(&conjoin(base, clause), &FindOptions::new().limit(1))
            .await?;
        let stored_as_date = sample
            .first()
            .and_then(|row| sort_value(row, field))
            .is_some_and(|v| matches!(v, Value::Date(_)));

        #[cfg(feature = "tracing")]
        tracing::trace!(field, stored_as_date, "ISO string cursor");
        Ok(if stored_as_date { cast } else { cursor.clone() })
    }
}

fn fetch_direction(req: &CursorRequest) -> Direction {
    match req.towards {
        Towards::Next => req.direction,
        Towards::Previous => req.direction.reversed(),
    }
}

/// Sort values of the first and last row, in declared order.
fn boundaries(list: &[Row], key: &str) -> (Option<Value>, Option<Value>) {
    (
        list.first().and_then(|r| sort_value(r, key)),
        list.last().and_then(|r| sort_value(r, key)),
    )
}

fn assemble(
    list: Vec<Row>,
    total_count: u64,
    req: &CursorRequest,
    previous: Option<Value>,
    next: Option<Value>,
) -> CursorPage {
    let order = SortOrder::new(req.sort_field.clone(), req.direction);
    if list.is_empty() {
        return CursorPage::empty(total_count, order);
    }
    CursorPage {
        list,
        total_count,
        order,
        next,
        previous,
    }
}

/// Any row on `side` of `boundary`? No boundary (empty page) means no.
async fn document_probe<S: DocumentStore>(
    store: &S,
    base: &Value,
    field: &str,
    side: Side,
    boundary: Option<&Value>,
) -> Result<bool, S::Error> {
    let Some(value) = boundary else {
        return Ok(false);
    };
    let probe = document_bound(base, field, side, value.clone());
    let hit = !store
        .find(&probe, &FindOptions::new().limit(1))
        .await?
        .is_empty();

    #[cfg(feature = "tracing")]
    tracing::trace!(field, ?side, hit, "document edge probe");
    Ok(hit)
}

async fn relational_probe<Q: RelationalQuery>(
    filtered: &Q,
    column: &str,
    side: Side,
    boundary: Option<&Value>,
) -> Result<bool, Q::Error> {
    let Some(value) = boundary else {
        return Ok(false);
    };
    let mut probe = filtered.clone();
    relational_bound(&mut probe, column, side, value.clone());
    probe.limit(1);
    let hit = !probe.fetch().await?.is_empty();

    #[cfg(feature = "tracing")]
    tracing::trace!(column, ?side, hit, "relational edge probe");
    Ok(hit)
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_page(backend: &str, req: &CursorRequest, page: &CursorPage, limit: u64) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        strategy = "cursor",
        backend,
        sort_field = %req.sort_field,
        limit,
        towards = ?req.towards,
        has_cursor = req.cursor.is_some(),
        total = page.total_count,
        rows = page.list.len(),
        "page assembled"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use filterq_io::{MemoryCollection, MemoryTable, StoreError};
    use serde_json::json;

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .filter_map(|i| Value::from(json!({"seq": i * 10, "tag": "t"})).as_map().cloned())
            .collect()
    }

    fn seqs(page: &CursorPage) -> Vec<i64> {
        page.list.iter().filter_map(|r| r["seq"].as_i64()).collect()
    }

    #[tokio::test]
    async fn test_document_forward_walk() {
        let coll = MemoryCollection::with_documents(rows(5));
        let p = Paginator::default();

        let first = p
            .paginate_documents_by_cursor(&coll, &CursorRequest::new(Value::empty_map(), "seq").limit(2))
            .await
            .unwrap();
        assert_eq!(seqs(&first), vec![10, 20]);
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(Value::Int(20)));

        let req = CursorRequest::new(Value::empty_map(), "seq").limit(2).after(20);
        let second = p.paginate_documents_by_cursor(&coll, &req).await.unwrap();
        assert_eq!(seqs(&second), vec![30, 40]);
        assert_eq!(second.previous, Some(Value::Int(30)));
        assert_eq!(second.next, Some(Value::Int(40)));

        let req = CursorRequest::new(Value::empty_map(), "seq").limit(2).after(40);
        let third = p.paginate_documents_by_cursor(&coll, &req).await.unwrap();
        assert_eq!(seqs(&third), vec![50]);
        assert_eq!(third.next, None);
        assert_eq!(third.total_count, 5);
    }

    #[tokio::test]
    async fn test_document_walk_over_iso_string_keys() {
        let docs = (1..=6).filter_map(|i| {
            Value::from(json!({"id": i, "ts": format!("2024-01-01T00:0{i}:00Z")}))
                .as_map()
                .cloned()
        });
        let coll = MemoryCollection::with_documents(docs);
        let p = Paginator::default();
        let ids = |page: &CursorPage| -> Vec<i64> {
            page.list.iter().filter_map(|r| r["id"].as_i64()).collect()
        };

        let first = p
            .paginate_documents_by_cursor(&coll, &CursorRequest::new(Value::empty_map(), "ts").limit(3))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec![1, 2, 3]);
        let next = first.next.clone().unwrap();
        assert_eq!(next, Value::from("2024-01-01T00:03:00Z"));

        let req = CursorRequest::new(Value::empty_map(), "ts").limit(3).after(next);
        let second = p.paginate_documents_by_cursor(&coll, &req).await.unwrap();
        assert_eq!(ids(&second), vec![4, 5, 6]);
        assert_eq!(second.previous, Some(Value::from("2024-01-01T00:04:00Z")));
        assert_eq!(second.next, None);
        assert_eq!(second.total_count, 6);

        let back = CursorRequest::new(Value::empty_map(), "ts")
            .limit(3)
            .before(second.previous.clone().unwrap());
        let again = p.paginate_documents_by_cursor(&coll, &back).await.unwrap();
        assert_eq!(ids(&again), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_table_backward_step_restores_order() {
        let table = MemoryTable::new("events").with_rows(rows(6));
        let p = Paginator::default();
        let ctx = RelationalContext::new();

        let req = CursorRequest::new(Value::empty_map(), "seq").limit(2).before(50);
        let page = p.paginate_table_by_cursor(&table.query(), &req, &ctx).await.unwrap();
        assert_eq!(seqs(&page), vec![30, 40]);
        assert_eq!(page.previous, Some(Value::Int(30)));
        assert_eq!(page.next, Some(Value::Int(40)));
    }

    #[tokio::test]
    async fn test_descending_cursor_bound() {
        let table = MemoryTable::new("events").with_rows(rows(4));
        let req = CursorRequest::new(Value::empty_map(), "seq")
            .direction(Direction::Desc)
            .limit(2)
            .after(30);
        let page = Paginator::default()
            .paginate_table_by_cursor(&table.query(), &req, &RelationalContext::new())
            .await
            .unwrap();
        assert_eq!(seqs(&page), vec![20, 10]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(Value::Int(20)));
    }

    #[tokio::test]
    async fn test_empty_result_has_no_edges() {
        let coll = MemoryCollection::with_documents(rows(3));
        let req = CursorRequest::new(Value::from(json!({"tag": "none"})), "seq");
        let page = Paginator::default()
            .paginate_documents_by_cursor(&coll, &req)
            .await
            .unwrap();
        assert!(page.list.is_empty());
        assert!(page.is_single());
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn test_failure_fails_the_page() {
        let coll = MemoryCollection::with_documents(rows(3));
        coll.fail_with("socket closed");
        let err = Paginator::default()
            .paginate_documents_by_cursor(&coll, &CursorRequest::new(Value::empty_map(), "seq"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Backend("socket closed".into()));
    }
}
