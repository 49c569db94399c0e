//! Pagination requests and page shapes.
//!
//! Both page types serialize with camelCase keys; `next`/`previous` are
//! always present (as `null` when there is nothing in that direction).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sort::{Direction, SortOrder};
use crate::value::{Map, Value};

/// A fetched row/document.
pub type Row = Map;

/// Which side of the cursor a cursor request walks towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Towards {
    /// Rows after the cursor in declared order (a previous page's `next`).
    #[default]
    Next,
    /// Rows before the cursor in declared order (a previous page's `previous`).
    Previous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetRequest {
    /// Raw or canonical filter tree.
    pub filter: Value,
    pub sort_field: String,
    #[serde(default)]
    pub direction: Direction,
    /// 1-based; values below 1 are clamped.
    #[serde(default = "first_page")]
    pub page: i64,
    /// `None` takes the configured default; values below 1 are clamped.
    #[serde(default)]
    pub limit: Option<i64>,
}

fn first_page() -> i64 {
    1
}

impl OffsetRequest {
    pub fn new(filter: impl Into<Value>, sort_field: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            sort_field: sort_field.into(),
            direction: Direction::Asc,
            page: 1,
            limit: None,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Decode a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Effective 1-based page number.
    pub fn effective_page(&self) -> u64 {
        self.page.max(1) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorRequest {
    /// Raw or canonical filter tree.
    pub filter: Value,
    pub sort_field: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub limit: Option<i64>,
    /// A `next`/`previous` value echoed from an earlier page.
    #[serde(default)]
    pub cursor: Option<Value>,
    #[serde(default)]
    pub towards: Towards,
}

impl CursorRequest {
    pub fn new(filter: impl Into<Value>, sort_field: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            sort_field: sort_field.into(),
            direction: Direction::Asc,
            limit: None,
            cursor: None,
            towards: Towards::Next,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Decode a JSON request body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Continue after `cursor` (pass a page's `next`).
    pub fn after(mut self, cursor: impl Into<Value>) -> Self {
        self.cursor = Some(cursor.into());
        self.towards = Towards::Next;
        self
    }

    /// Step back before `cursor` (pass a page's `previous`).
    pub fn before(mut self, cursor: impl Into<Value>) -> Self {
        self.cursor = Some(cursor.into());
        self.towards = Towards::Previous;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage {
    pub list: Vec<Row>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl OffsetPage {
    /// Assemble a page from the list window and the unwindowed count.
    pub fn assemble(list: Vec<Row>, total_count: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total_count.div_ceil(limit);
        Self {
            list,
            total_count,
            total_pages,
            current_page: page,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Rows skipped before this page's window.
    pub fn skip_for(page: u64, limit: u64) -> u64 {
        page.max(1).saturating_sub(1).saturating_mul(limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPage {
    pub list: Vec<Row>,
    pub total_count: u64,
    pub order: SortOrder,
    /// Cursor for the following page; `null` on the last page.
    pub next: Option<Value>,
    /// Cursor for the preceding page; `null` on the first page.
    pub previous: Option<Value>,
}

impl CursorPage {
    pub fn empty(total_count: u64, order: SortOrder) -> Self {
        Self {
            list: Vec::new(),
            total_count,
            order,
            next: None,
            previous: None,
        }
    }

    /// A page with neither neighbour.
    pub fn is_single(&self) -> bool {
        self.next.is_none() && self.previous.is_none()
    }
}
