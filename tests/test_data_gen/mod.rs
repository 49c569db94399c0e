//! Seeded datasets shared by the integration suites.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use filterq::{MemoryCollection, MemoryTable, Row, Value};

pub fn row(j: serde_json::Value) -> Row {
    match Value::from(j) {
        Value::Map(m) => m,
        other => panic!("not a row: {other:?}"),
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `createdAt` of event `i` (1-based): one minute apart.
pub fn event_time(i: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(i)
}

/// `n` events with native `createdAt` dates, inserted newest first so
/// insertion order never happens to match sort order.
pub fn events(n: i64) -> Vec<Row> {
    (1..=n)
        .rev()
        .map(|i| {
            let status = if i % 3 == 0 { "archived" } else { "active" };
            let mut r = row(serde_json::json!({"id": i, "status": status}));
            r.insert("createdAt".into(), Value::Date(event_time(i)));
            r
        })
        .collect()
}

const ROLES: [&str; 4] = ["guest", "user", "editor", "admin"];
const STATUSES: [&str; 3] = ["banned", "active", "pending"];

/// `n` users without nulls, so document and SQL semantics agree.
pub fn users(n: i64) -> Vec<Row> {
    (1..=n)
        .map(|i| {
            row(serde_json::json!({
                "id": i,
                "age": 18 + (i * 7) % 40,
                "role": ROLES[(i % 4) as usize],
                "status": STATUSES[(i % 3) as usize],
                "score": (i * 3) % 10,
            }))
        })
        .collect()
}

pub fn collection(rows: Vec<Row>) -> MemoryCollection {
    MemoryCollection::with_documents(rows)
}

pub fn table(name: &str, rows: Vec<Row>) -> MemoryTable {
    MemoryTable::new(name).with_rows(rows)
}

pub fn ids(list: &[Row]) -> Vec<i64> {
    list.iter().filter_map(|r| r.get("id").and_then(Value::as_i64)).collect()
}
