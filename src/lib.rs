#![forbid(unsafe_code)]
//! filterq: filter-DSL normalization, document/relational compilation, and
//! offset/cursor pagination.
//!
//! Workspace members:
//! - `filterq-core`: `Value` trees, operator vocabulary, page shapes, config
//! - `filterq-operators`: per-backend operator tables, `WhereBuilder`
//! - `filterq-planner`: `normalize`, document compiler, date cast, relational compiler
//! - `filterq-io`: store traits and in-memory backends
//! - `filterq-exec`: `Paginator`
//!
//! This crate re-exports the caller-facing surface of all of them.
//!
//! ```text
//! raw filter ──normalize──▶ canonical tree ──┬─▶ compile_to_document_filter ─▶ DocumentStore
//!                                            └─▶ apply_relational_filter ─────▶ RelationalQuery
//! ```

pub use filterq_core::config::PaginationConfig;
pub use filterq_core::op::{Logical, Op};
pub use filterq_core::page::{CursorPage, CursorRequest, OffsetPage, OffsetRequest, Row, Towards};
pub use filterq_core::sort::{Direction, SortOrder};
pub use filterq_core::value::{Map, Value};
pub use filterq_core::{Error, Result};

pub use filterq_operators::{Comparison, Connective, WhereBuilder};

pub use filterq_planner::case;
pub use filterq_planner::{
    apply_relational_filter, cast_iso_strings_to_dates, compile_to_document_filter, normalize,
    RelationalContext,
};

pub use filterq_io::{
    DocumentStore, FindOptions, MemoryCollection, MemoryTable, RelationalQuery, StoreError,
    TableQuery,
};

pub use filterq_exec::Paginator;

pub use filterq_core::prelude;
