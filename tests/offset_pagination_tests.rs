//! Offset pagination against both backends.

mod test_data_gen;

use filterq::{
    Direction, OffsetPage, OffsetRequest, PaginationConfig, Paginator, RelationalContext,
    StoreError, Value,
};
use serde_json::json;
use test_data_gen::{collection, ids, table, users};

async fn both(req: &OffsetRequest, rows: i64) -> (OffsetPage, OffsetPage) {
    let p = Paginator::default();
    let coll = collection(users(rows));
    let tbl = table("users", users(rows));
    let doc = p.paginate_documents_by_offset(&coll, req).await.unwrap();
    let rel = p
        .paginate_table_by_offset(&tbl.query(), req, &RelationalContext::new())
        .await
        .unwrap();
    (doc, rel)
}

#[tokio::test]
async fn test_fifteen_rows_limit_five() {
    for page in [1, 3, 5] {
        let req = OffsetRequest::new(Value::empty_map(), "id").page(page).limit(5);
        let (doc, rel) = both(&req, 15).await;
        assert_eq!(doc, rel, "backends disagree on page {page}");
        assert_eq!(doc.total_count, 15);
        assert_eq!(doc.total_pages, 3);
        assert_eq!(doc.current_page, page as u64);

        match page {
            1 => {
                assert_eq!(ids(&doc.list), vec![1, 2, 3, 4, 5]);
                assert!(!doc.has_previous);
                assert!(doc.has_next);
            }
            3 => {
                assert_eq!(ids(&doc.list), vec![11, 12, 13, 14, 15]);
                assert!(doc.has_previous);
                assert!(!doc.has_next);
            }
            _ => {
                assert!(doc.list.is_empty());
                assert!(doc.has_previous);
                assert!(!doc.has_next);
            }
        }
    }
}

#[tokio::test]
async fn test_total_count_is_stable_across_pages() {
    let filter = Value::from(json!({"role": {"in": ["admin", "editor"]}}));
    let mut seen = Vec::new();
    let mut totals = Vec::new();
    for page in 1..=4 {
        let req = OffsetRequest::new(filter.clone(), "age")
            .direction(Direction::Desc)
            .page(page)
            .limit(4);
        let (doc, rel) = both(&req, 24).await;
        assert_eq!(ids(&doc.list), ids(&rel.list));
        totals.push(doc.total_count);
        seen.extend(ids(&doc.list));
    }
    assert!(totals.iter().all(|t| *t == 12));
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn test_empty_collection() {
    let req = OffsetRequest::new(Value::empty_map(), "id");
    let (doc, rel) = both(&req, 0).await;
    for page in [doc, rel] {
        assert!(page.list.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }
}

#[tokio::test]
async fn test_query_string_shaped_filter() {
    // what a decoder produces for ?or[0][role]=admin&or[1][age][lte]=25
    let filter = Value::from(json!({"or": {"0": {"role": "admin"}, "1": {"age": {"lte": "25"}}}}));
    let req = OffsetRequest::new(filter, "id").limit(50);
    let (doc, rel) = both(&req, 20).await;
    assert_eq!(ids(&doc.list), ids(&rel.list));
    // "25" stays a string, so only the role arm can match
    assert_eq!(ids(&doc.list), vec![3, 7, 11, 15, 19]);
}

#[tokio::test]
async fn test_max_limit_caps_page_size() {
    let p = Paginator::new(PaginationConfig {
        max_limit: Some(3),
        default_limit: 3,
        ..PaginationConfig::default()
    });
    let req = OffsetRequest::new(Value::empty_map(), "id").limit(100);
    let page = p
        .paginate_documents_by_offset(&collection(users(10)), &req)
        .await
        .unwrap();
    assert_eq!(page.list.len(), 3);
    assert_eq!(page.total_pages, 4);
}

#[tokio::test]
async fn test_backend_failure_fails_page() {
    let coll = collection(users(5));
    coll.fail_with("primary stepped down");
    let err = Paginator::default()
        .paginate_documents_by_offset(&coll, &OffsetRequest::new(Value::empty_map(), "id"))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Backend("primary stepped down".into()));
}

#[test]
fn test_page_serializes_camel_case() {
    let page = OffsetPage::assemble(vec![], 15, 2, 5);
    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(
        json,
        json!({
            "list": [],
            "totalCount": 15,
            "totalPages": 3,
            "currentPage": 2,
            "hasNext": true,
            "hasPrevious": true
        })
    );
}
